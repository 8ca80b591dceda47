//! Domain types for the todo service.
//!
//! # Design
//! `Todo` is what the datastore hands back; `TodoFields` is the mutable part
//! carried by insert and update. The bulk-delete pair (`DeletionRequest`,
//! `DeletionResult`) mirrors the wire format of `POST /bulk-delete` exactly,
//! including the camel-cased `deletedIds` key.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ServiceError;

/// Server-assigned primary key of a todo row.
pub type TodoId = i64;

/// A single todo row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub description: String,
    pub completed: bool,
}

/// Mutable columns of a todo, written by insert and update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFields {
    pub description: String,
    pub completed: bool,
}

impl TodoFields {
    pub fn new(description: impl Into<String>, completed: bool) -> Self {
        Self {
            description: description.into(),
            completed,
        }
    }

    pub(crate) fn into_todo(self, id: TodoId) -> Todo {
        Todo {
            id,
            description: self.description,
            completed: self.completed,
        }
    }
}

/// Body of a bulk-delete call.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DeletionRequest {
    /// A missing key and an explicit `null` both mean no ids.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub ids: Vec<TodoId>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<TodoId>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<TodoId>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl DeletionRequest {
    /// Decode the first JSON value of a request body; bytes after it are
    /// ignored. Any decoding failure is a client-input error; nothing has
    /// touched the datastore at this point.
    pub fn from_json(body: &[u8]) -> Result<Self, ServiceError> {
        match serde_json::Deserializer::from_slice(body)
            .into_iter::<Self>()
            .next()
        {
            Some(Ok(request)) => Ok(request),
            Some(Err(e)) => Err(parse_error(e)),
            None => Err(parse_error("EOF")),
        }
    }
}

fn parse_error(cause: impl std::fmt::Display) -> ServiceError {
    ServiceError::client_input(format!("failed to parse request body: {cause}"))
}

/// Outcome of a committed bulk delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeletionResult {
    pub success: bool,
    pub message: String,
    pub deleted_ids: Vec<TodoId>,
}

impl DeletionResult {
    pub const SUCCESS_MESSAGE: &'static str = "Todos deleted successfully.";

    pub fn succeeded(deleted_ids: Vec<TodoId>) -> Self {
        Self {
            success: true,
            message: Self::SUCCESS_MESSAGE.to_string(),
            deleted_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn todo_serializes_to_json() {
        let todo = Todo {
            id: 7,
            description: "Water plants".to_string(),
            completed: false,
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["description"], "Water plants");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn deletion_request_decodes_ids_in_order() {
        let req = DeletionRequest::from_json(br#"{"ids":[3,1,2,1]}"#).unwrap();
        assert_eq!(req.ids, vec![3, 1, 2, 1]);
    }

    #[test]
    fn deletion_request_missing_ids_is_empty() {
        let req = DeletionRequest::from_json(b"{}").unwrap();
        assert!(req.ids.is_empty());
    }

    #[test]
    fn deletion_request_null_ids_is_empty() {
        let req = DeletionRequest::from_json(br#"{"ids":null}"#).unwrap();
        assert!(req.ids.is_empty());
    }

    #[test]
    fn deletion_request_ignores_bytes_after_the_first_value() {
        let req = DeletionRequest::from_json(b"{\"ids\":[2]}\n{\"ids\":[9]} trailing")
            .unwrap();
        assert_eq!(req.ids, vec![2]);
    }

    #[test]
    fn deletion_request_rejects_empty_body() {
        let err = DeletionRequest::from_json(b"").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientInput);
        assert_eq!(err.message(), "failed to parse request body: EOF");
    }

    #[test]
    fn deletion_request_rejects_non_list_ids() {
        let err = DeletionRequest::from_json(br#"{"ids":"not-a-list"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientInput);
        assert!(err.message().starts_with("failed to parse request body:"));
    }

    #[test]
    fn deletion_request_rejects_non_integer_ids() {
        let err = DeletionRequest::from_json(br#"{"ids":[1,"two"]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientInput);
    }

    #[test]
    fn deletion_request_rejects_garbage() {
        let err = DeletionRequest::from_json(b"not json").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ClientInput);
    }

    #[test]
    fn deletion_result_uses_camel_case_keys() {
        let result = DeletionResult::succeeded(vec![4, 5]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Todos deleted successfully.");
        assert_eq!(json["deletedIds"], serde_json::json!([4, 5]));
        assert!(json.get("deleted_ids").is_none());
    }

    #[test]
    fn empty_deletion_result_serializes_empty_array() {
        let json = serde_json::to_value(DeletionResult::succeeded(Vec::new())).unwrap();
        assert_eq!(json["deletedIds"], serde_json::json!([]));
    }
}
