//! Form field extraction for the single-row handlers.
//!
//! Browsers post either `application/x-www-form-urlencoded` or
//! `multipart/form-data` (anything built from a `FormData`). Both are folded
//! into one name to value map together with the URL query string. Body
//! values come before query values, the first occurrence of a name wins and
//! file parts are skipped. A request without a `Content-Type` has no form
//! body, so only its query string is read; that is how `DELETE` carries its
//! fields.

use std::collections::HashMap;

use axum::extract::{FromRequest, Multipart, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Form;

use crate::error::ApiError;

#[derive(Debug, Default)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    /// Value of `name`, or the empty string when absent.
    pub fn value(&self, name: &str) -> &str {
        self.0.get(name).map(String::as_str).unwrap_or_default()
    }

    fn insert_first(&mut self, name: String, value: String) {
        self.0.entry(name).or_insert(value);
    }

    fn extend_first(&mut self, pairs: Vec<(String, String)>) {
        for (name, value) in pairs {
            self.insert_first(name, value);
        }
    }
}

impl<S> FromRequest<S> for FormFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
            .map_err(|e| form_error(e.body_text()))?;
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .map(|value| value.to_str().unwrap_or_default().to_owned());

        let mut fields = FormFields::default();
        match content_type {
            None => {}
            Some(ct) if ct.starts_with("multipart/form-data") => {
                let mut multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(|e| form_error(e.body_text()))?;
                while let Some(field) = multipart
                    .next_field()
                    .await
                    .map_err(|e| form_error(e.body_text()))?
                {
                    if field.file_name().is_some() {
                        continue;
                    }
                    let Some(name) = field.name().map(str::to_owned) else {
                        continue;
                    };
                    let value = field.text().await.map_err(|e| form_error(e.body_text()))?;
                    fields.insert_first(name, value);
                }
            }
            Some(_) => {
                let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                    .await
                    .map_err(|e| form_error(e.body_text()))?;
                fields.extend_first(pairs);
            }
        }
        fields.extend_first(query);
        Ok(fields)
    }
}

fn form_error(cause: String) -> ApiError {
    ApiError::bad_request(format!("failed to parse form: {cause}"))
}

/// Boolean grammar accepted for the `completed` field of an update.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
