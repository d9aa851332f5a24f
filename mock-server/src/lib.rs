use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
}

#[derive(Deserialize)]
pub struct CreateNote {
    pub title: String,
}

/// Request body shape: `{"param": ...}`.
#[derive(Deserialize)]
pub struct ParamBody<T> {
    pub param: T,
}

#[derive(Deserialize)]
pub struct ParamQuery {
    pub param: Option<String>,
}

/// Success envelope: `{"value": ...}`.
#[derive(Serialize)]
pub struct Value<T> {
    pub value: T,
}

/// Failure envelope `{"error": ...}` paired with its status.
#[derive(Debug)]
pub struct Failure(pub StatusCode, pub &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

pub type Db = Arc<RwLock<HashMap<Uuid, Note>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/notes", get(list_notes).post(create_note))
        .route("/notes/{id}", get(get_note).delete(delete_note))
        .route("/echo", get(echo))
        .route("/whoami", get(whoami))
        .route("/broken", get(broken))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_notes(State(db): State<Db>) -> Json<Value<Vec<Note>>> {
    let notes = db.read().await;
    let mut value: Vec<Note> = notes.values().cloned().collect();
    value.sort_by(|a, b| a.title.cmp(&b.title));
    Json(Value { value })
}

async fn create_note(
    State(db): State<Db>,
    Json(body): Json<ParamBody<CreateNote>>,
) -> Json<Value<Note>> {
    let note = Note {
        id: Uuid::new_v4(),
        title: body.param.title,
    };
    tracing::debug!(id = %note.id, "created note");
    db.write().await.insert(note.id, note.clone());
    Json(Value { value: note })
}

async fn get_note(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value<Note>>, Failure> {
    let id = parse_id(&id)?;
    let notes = db.read().await;
    notes
        .get(&id)
        .cloned()
        .map(|value| Json(Value { value }))
        .ok_or(Failure(StatusCode::NOT_FOUND, "not found"))
}

async fn delete_note(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value<()>>, Failure> {
    let id = parse_id(&id)?;
    let mut notes = db.write().await;
    notes
        .remove(&id)
        .map(|_| Json(Value { value: () }))
        .ok_or(Failure(StatusCode::NOT_FOUND, "not found"))
}

async fn echo(Query(query): Query<ParamQuery>) -> Result<Json<Value<String>>, Failure> {
    query
        .param
        .map(|value| Json(Value { value }))
        .ok_or(Failure(StatusCode::BAD_REQUEST, "missing param"))
}

async fn whoami(headers: HeaderMap) -> Result<Json<Value<String>>, Failure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(Failure(StatusCode::UNAUTHORIZED, "unauthorized"))?;
    Ok(Json(Value {
        value: token.to_string(),
    }))
}

async fn broken() -> (StatusCode, &'static str) {
    tracing::warn!("serving deliberately malformed response");
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

fn parse_id(raw: &str) -> Result<Uuid, Failure> {
    raw.parse()
        .map_err(|_| Failure(StatusCode::BAD_REQUEST, "invalid id"))
}
