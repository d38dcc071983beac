//! REST executor tests against an in-process axum server.
//!
//! The mock server mirrors the backend's routes and failure shapes: plain
//! text bodies for validation errors and a JSON error envelope for service
//! failures.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};
use user_admin::{
    AdminRuntime, Command, Effect, EmailId, Event, Notice, Notifier, RestClient, RestEffect, UserId,
};

#[derive(Default)]
struct Store {
    users: Vec<(i64, String)>,
    emails: Vec<(i64, i64, String)>,
    next_id: i64,
    /// Query strings seen, for asserting on `debug`.
    queries: Vec<HashMap<String, String>>,
}

type Shared = Arc<Mutex<Store>>;

async fn list_users(State(store): State<Shared>, Query(q): Query<HashMap<String, String>>) -> Json<Value> {
    let mut store = store.lock().unwrap();
    store.queries.push(q);
    let users: Vec<_> = store
        .users
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name, "created": "2020-01-01T00:00:00Z"}))
        .collect();
    Json(json!({ "users": users }))
}

async fn add_user(State(store): State<Shared>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return (StatusCode::BAD_REQUEST, "empty name").into_response();
    }
    let mut store = store.lock().unwrap();
    store.next_id += 1;
    let id = store.next_id;
    store.users.push((id, name));
    Json(json!({ "user_id": id })).into_response()
}

async fn delete_user(State(store): State<Shared>, Path(id): Path<i64>) -> Json<Value> {
    store.lock().unwrap().users.retain(|(uid, _)| *uid != id);
    Json(Value::Null)
}

async fn list_emails(State(store): State<Shared>, Query(q): Query<HashMap<String, String>>) -> Response {
    let Some(user_id) = q.get("user_id").and_then(|raw| raw.parse::<i64>().ok()) else {
        return (StatusCode::BAD_REQUEST, "missing URL query user_id").into_response();
    };
    let mut store = store.lock().unwrap();
    store.queries.push(q);
    let emails: Vec<_> = store
        .emails
        .iter()
        .filter(|(_, uid, _)| *uid == user_id)
        .map(|(id, uid, address)| json!({"id": id, "user_id": uid, "address": address}))
        .collect();
    // The backend sends `null` rather than an empty list.
    if emails.is_empty() {
        return Json(json!({ "emails": null })).into_response();
    }
    Json(json!({ "emails": emails })).into_response()
}

async fn add_email(State(store): State<Shared>, Json(body): Json<Value>) -> Response {
    let user_id = body["user_id"].as_i64().unwrap_or_default();
    let address = body["address"].as_str().unwrap_or_default().to_string();
    if !address.contains('@') {
        return (StatusCode::BAD_REQUEST, "invalid email address").into_response();
    }
    let mut store = store.lock().unwrap();
    store.next_id += 1;
    let id = store.next_id;
    store.emails.push((id, user_id, address));
    Json(json!({ "email_id": id })).into_response()
}

async fn delete_email(State(store): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut store = store.lock().unwrap();
    let before = store.emails.len();
    store.emails.retain(|(eid, _, _)| *eid != id);
    if store.emails.len() == before {
        let body = json!({"error": {"codes": ["internal_server_error"], "msg": "could not delete email"}});
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
    }
    Json(Value::Null).into_response()
}

async fn spawn_server(store: Shared) -> String {
    let app = Router::new()
        .route("/rest/users", get(list_users).post(add_user))
        .route("/rest/users/:id", delete(delete_user))
        .route("/rest/emails", get(list_emails).post(add_email))
        .route("/rest/emails/:id", delete(delete_email))
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn seeded() -> Shared {
    let store = Store {
        users: vec![(1, "Ann".to_string())],
        emails: vec![(10, 1, "ann@example.com".to_string())],
        next_id: 100,
        ..Store::default()
    };
    Arc::new(Mutex::new(store))
}

#[derive(Clone, Default)]
struct CollectingNotifier(Arc<Mutex<Vec<Notice>>>);

impl Notifier for CollectingNotifier {
    fn notify(&self, notice: &Notice) {
        self.0.lock().unwrap().push(notice.clone());
    }
}

#[tokio::test]
async fn test_fetch_users_over_http() {
    let base = spawn_server(seeded()).await;
    let effect = RestEffect::new(RestClient::new(&base).unwrap());

    let handle = AdminRuntime::spawn(effect);
    handle.dispatch(Event::FetchUsers).unwrap();
    let snapshot = handle.settled().await.unwrap();

    assert_eq!(snapshot.state.users.len(), 1);
    assert_eq!(snapshot.state.users[0].name, "Ann");
    assert_eq!(snapshot.state.lock, 0);
    assert_eq!(snapshot.state.loading, None);
}

#[tokio::test]
async fn test_add_user_then_list_includes_bob() {
    let store = seeded();
    let base = spawn_server(store.clone()).await;
    let handle = AdminRuntime::spawn(RestEffect::new(RestClient::new(&base).unwrap()));

    handle.dispatch(Event::EditUserName("Bob".into())).unwrap();
    handle.dispatch(Event::AddUser).unwrap();
    let snapshot = handle.settled().await.unwrap();

    let names: Vec<_> = snapshot.state.users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Bob"]);
    assert_eq!(snapshot.state.new_user, "");
    assert_eq!(store.lock().unwrap().users.len(), 2);
}

#[tokio::test]
async fn test_validation_error_text_reaches_notice() {
    let base = spawn_server(seeded()).await;
    let notifier = CollectingNotifier::default();
    let (runtime, handle) = AdminRuntime::builder(RestEffect::new(RestClient::new(&base).unwrap()))
        .notifier(notifier.clone())
        .build();
    tokio::spawn(runtime.run());

    handle.dispatch(Event::EditUserName("   ".into())).unwrap();
    handle.dispatch(Event::AddUser).unwrap();
    let snapshot = handle.settled().await.unwrap();

    assert_eq!(snapshot.state.lock, 0);
    let notices = notifier.0.lock().unwrap().clone();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "could not add user");
    assert_eq!(notices[0].detail.as_deref(), Some("400 Bad Request: empty name"));
}

#[tokio::test]
async fn test_email_flow_over_http() {
    let store = seeded();
    let base = spawn_server(store.clone()).await;
    let handle = AdminRuntime::spawn(RestEffect::new(RestClient::new(&base).unwrap()));

    handle.dispatch(Event::FetchUsers).unwrap();
    handle.dispatch(Event::FetchEmails { user_id: UserId::new(1) }).unwrap();
    let snapshot = handle.settled().await.unwrap();
    assert_eq!(snapshot.state.emails.len(), 1);

    handle
        .dispatch(Event::EditEmailAddress("ann.doe@example.com".into()))
        .unwrap();
    handle.dispatch(Event::AddEmail).unwrap();
    let snapshot = handle.settled().await.unwrap();
    let addresses: Vec<_> = snapshot
        .state
        .emails_of(UserId::new(1))
        .map(|e| e.address.as_str())
        .collect();
    assert_eq!(addresses, vec!["ann@example.com", "ann.doe@example.com"]);

    handle.dispatch(Event::DeleteEmail { email_id: EmailId::new(10) }).unwrap();
    let snapshot = handle.settled().await.unwrap();
    assert_eq!(snapshot.state.emails.len(), 1);
    assert_eq!(store.lock().unwrap().emails.len(), 1);
}

#[tokio::test]
async fn test_empty_email_list_arrives_as_null() {
    let base = spawn_server(seeded()).await;
    let effect = RestEffect::new(RestClient::new(&base).unwrap());

    let event = effect
        .execute(Command::FetchEmails {
            user_id: UserId::new(42),
        })
        .await;
    assert_eq!(
        event,
        Event::EmailsFetched {
            user_id: UserId::new(42),
            result: Ok(vec![]),
        }
    );
}

#[tokio::test]
async fn test_json_error_envelope_is_unwrapped() {
    let base = spawn_server(seeded()).await;
    let effect = RestEffect::new(RestClient::new(&base).unwrap());

    let event = effect
        .execute(Command::DeleteEmail {
            email_id: EmailId::new(999),
        })
        .await;
    match event {
        Event::EmailDeleted { email_id, result: Err(err) } => {
            assert_eq!(email_id, EmailId::new(999));
            assert_eq!(err.status, Some(500));
            assert_eq!(err.message, "500 Internal Server Error: could not delete email");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_debug_flag_is_sent() {
    let store = seeded();
    let base = spawn_server(store.clone()).await;
    let client = RestClient::new(&base).unwrap().with_debug(true);

    client.send(&Command::FetchUsers.request()).await.unwrap();
    client
        .send(&Command::FetchEmails { user_id: UserId::new(1) }.request())
        .await
        .unwrap();

    let store = store.lock().unwrap();
    assert_eq!(store.queries.len(), 2);
    assert!(store.queries[0].contains_key("debug"));
    assert!(store.queries[1].contains_key("debug"));
    assert_eq!(store.queries[1].get("user_id").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_timeout_is_a_failed_request() {
    async fn slow() -> Json<Value> {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Json(json!({"users": []}))
    }
    let app = Router::new().route("/rest/users", get(slow));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = RestClient::with_timeout(format!("http://{}", addr), Duration::from_millis(100)).unwrap();
    let event = RestEffect::new(client).execute(Command::FetchUsers).await;
    match event {
        Event::UsersFetched(Err(err)) => {
            assert_eq!(err.status, None);
            assert!(err.message.contains("timed out"), "{}", err.message);
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_server_unlocks() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RestClient::new(format!("http://{}", addr)).unwrap();
    let handle = AdminRuntime::spawn(RestEffect::new(client));
    handle.dispatch(Event::FetchUsers).unwrap();
    let snapshot = handle.settled().await.unwrap();

    assert_eq!(snapshot.state.lock, 0);
    assert_eq!(snapshot.state.loading, None);
    assert!(snapshot.state.users.is_empty());
}
