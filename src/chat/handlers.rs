use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::{
    chat::{
        dto::{ContactsQuery, HistoryQuery, SendMessageRequest},
        repo_types::{ChatMessage, Contact},
    },
    error::{AppError, AppResult},
    params::present,
    state::AppState,
};

pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/get", get(chat_history))
        .route("/chat/list", get(contacts))
        .route("/chat/send", post(send_message))
}

/// Stores the message exactly as sent; the body is not inspected.
#[instrument(skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> AppResult<Json<ChatMessage>> {
    let Json(req) = payload?;
    let timestamp = req.timestamp.unwrap_or_else(OffsetDateTime::now_utc);

    let msg = ChatMessage::create(
        &state.db,
        &req.sender_id,
        &req.receiver_id,
        &req.message,
        timestamp,
    )
    .await?;
    debug!(id = msg.id, from = %msg.sender_id, to = %msg.receiver_id, "chat message stored");
    Ok(Json(msg))
}

#[instrument(skip(state))]
pub async fn chat_history(
    State(state): State<AppState>,
    q: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<Vec<ChatMessage>>> {
    let Query(q) = q?;
    let (Some(sender), Some(receiver)) = (present(&q.sender_id), present(&q.receiver_id)) else {
        return Err(AppError::bad_request("SenderID and ReceiverID are required"));
    };
    Ok(Json(ChatMessage::history(&state.db, sender, receiver).await?))
}

#[instrument(skip(state))]
pub async fn contacts(
    State(state): State<AppState>,
    q: Result<Query<ContactsQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Contact>>> {
    let Query(q) = q?;
    let user = present(&q.user_id).ok_or_else(|| AppError::bad_request("User ID is required"))?;
    Ok(Json(Contact::list_for(&state.db, user).await?))
}
