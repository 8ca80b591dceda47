//! Full lifecycle over a real socket.
//!
//! Starts the server on a random port with an in-memory store, then drives
//! every route with ureq the way a browser client would.

use std::sync::Arc;

use todo_core::{DeletionResult, MemoryStore, Todo};

struct Reply {
    status: u16,
    body: String,
}

fn agent() -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent()
}

fn read(mut response: ureq::http::Response<ureq::Body>) -> Reply {
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    Reply { status, body }
}

fn start(store: MemoryStore) -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, Arc::new(store)).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn crud_lifecycle() {
    let store = MemoryStore::new();
    let base = start(store.clone());
    let agent = agent();

    // Step 1: liveness.
    let reply = read(agent.get(&base).call().expect("transport"));
    assert_eq!(reply.status, 200);
    assert_eq!(reply.body, "Hello, World!");

    // Step 2: setup.
    let reply = read(agent.get(&format!("{base}/setup")).call().expect("transport"));
    assert_eq!(reply.status, 200);

    // Step 3: insert three todos.
    for (description, completed) in [("one", "true"), ("two", "false"), ("three", "false")] {
        let reply = read(
            agent
                .post(&format!("{base}/insert"))
                .send_form([("description", description), ("completed", completed)])
                .expect("transport"),
        );
        assert_eq!(reply.status, 200);
        assert!(reply.body.starts_with("Inserted record with ID: "));
    }

    // Step 4: list.
    let reply = read(agent.get(&format!("{base}/select-all")).call().expect("transport"));
    let todos: Vec<Todo> = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(todos.len(), 3);
    assert!(todos[0].completed);

    // Step 5: update the second one.
    let reply = read(
        agent
            .put(&format!("{base}/update/2"))
            .send_form([("description", "two, edited"), ("completed", "true")])
            .expect("transport"),
    );
    assert_eq!(reply.status, 200);
    assert_eq!(store.get(2).unwrap().description, "two, edited");

    // Step 6: bulk delete with one injected failure, nothing goes away.
    store.fail_delete_of(3);
    let reply = read(
        agent
            .post(&format!("{base}/bulk-delete"))
            .content_type("application/json")
            .send(r#"{"ids":[1,3]}"#.as_bytes())
            .expect("transport"),
    );
    assert_eq!(reply.status, 500);
    assert_eq!(store.len(), 3);

    // Step 7: bulk delete that succeeds.
    let reply = read(
        agent
            .post(&format!("{base}/bulk-delete"))
            .content_type("application/json")
            .send(r#"{"ids":[1,2]}"#.as_bytes())
            .expect("transport"),
    );
    assert_eq!(reply.status, 200);
    let result: DeletionResult = serde_json::from_str(&reply.body).unwrap();
    assert_eq!(result.deleted_ids, vec![1, 2]);

    // Step 8: single delete of the last one.
    let reply = read(
        agent
            .post(&format!("{base}/delete"))
            .send_form([("id", "3")])
            .expect("transport"),
    );
    assert_eq!(reply.status, 200);

    // Step 9: list is empty again.
    let reply = read(agent.get(&format!("{base}/select-all")).call().expect("transport"));
    assert_eq!(reply.body, "[]");
}
