use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// A live room being watched by the recorder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub url: String,
    pub listening: bool,
}

/// One entry of the `POST /api/lives` payload.
#[derive(Deserialize)]
pub struct AddLive {
    pub url: String,
    #[serde(default)]
    pub listen: bool,
}

/// Envelope used for acknowledgements and errors.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommonResp {
    pub err_no: i32,
    pub err_msg: String,
    pub data: Value,
}

impl CommonResp {
    pub fn ok() -> Self {
        Self {
            err_no: 0,
            err_msg: String::new(),
            data: json!("OK"),
        }
    }

    pub fn error(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            err_no: i32::from(status.as_u16()),
            err_msg: message.into(),
            data: Value::Null,
        }
    }
}

type Rooms = Arc<RwLock<HashMap<Uuid, Room>>>;

#[derive(Clone)]
pub struct AppState {
    rooms: Rooms,
    config: Arc<RwLock<Value>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            config: Arc::new(RwLock::new(json!({
                "rpc": { "enable": true, "bind": "127.0.0.1:8080" },
                "interval": 30,
                "out_put_path": "./",
            }))),
        }
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/api/lives", get(list_lives).post(add_lives))
        .route("/api/lives/{id}", get(get_live).delete(remove_live))
        .route("/api/config", put(put_config).get(get_config))
        .route("/api/echo", any(echo))
        .route("/api/broken", get(broken))
        .route("/api/plain", get(plain))
        .with_state(AppState::default())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<CommonResp>)>;

fn not_found(id: &str) -> (StatusCode, Json<CommonResp>) {
    (
        StatusCode::NOT_FOUND,
        Json(CommonResp::error(
            StatusCode::NOT_FOUND,
            format!("live id: {id} not found"),
        )),
    )
}

async fn list_lives(State(state): State<AppState>) -> Json<Vec<Room>> {
    let rooms = state.rooms.read().await;
    let mut list: Vec<Room> = rooms.values().cloned().collect();
    list.sort_by(|a, b| a.url.cmp(&b.url));
    Json(list)
}

async fn add_lives(
    State(state): State<AppState>,
    Json(input): Json<Vec<AddLive>>,
) -> Json<Vec<Room>> {
    let mut rooms = state.rooms.write().await;
    let mut added = Vec::with_capacity(input.len());
    for entry in input {
        let room = Room {
            id: Uuid::new_v4(),
            url: entry.url.trim().to_string(),
            listening: entry.listen,
        };
        info!(id = %room.id, url = %room.url, "room added");
        rooms.insert(room.id, room.clone());
        added.push(room);
    }
    Json(added)
}

async fn get_live(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Room> {
    let rooms = state.rooms.read().await;
    id.parse::<Uuid>()
        .ok()
        .and_then(|key| rooms.get(&key).cloned())
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

async fn remove_live(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CommonResp> {
    let mut rooms = state.rooms.write().await;
    let removed = id.parse::<Uuid>().ok().and_then(|key| rooms.remove(&key));
    match removed {
        Some(room) => {
            info!(id = %room.id, "room removed");
            Ok(Json(CommonResp::ok()))
        }
        None => Err(not_found(&id)),
    }
}

async fn get_config(State(state): State<AppState>) -> Json<Value> {
    Json(state.config.read().await.clone())
}

async fn put_config(
    State(state): State<AppState>,
    Json(input): Json<Value>,
) -> ApiResult<CommonResp> {
    if !input.is_object() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(CommonResp::error(
                StatusCode::BAD_REQUEST,
                "config must be a JSON object",
            )),
        ));
    }
    *state.config.write().await = input;
    Ok(Json(CommonResp::ok()))
}

/// Describe the request as received, so callers can check what went over the wire.
async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let body = (!body.is_empty()).then_some(body);
    Json(json!({
        "method": method.as_str(),
        "content_type": content_type,
        "body": body,
    }))
}

/// Failure whose envelope carries an empty message.
async fn broken() -> (StatusCode, Json<CommonResp>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(CommonResp::error(StatusCode::INTERNAL_SERVER_ERROR, "")),
    )
}

/// Failure with a body that is not JSON.
async fn plain() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "upstream unavailable")
}
