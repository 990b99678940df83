use serde::Deserialize;
use time::OffsetDateTime;

/// Missing fields decode as empty strings; nothing is validated.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(rename = "SenderID", alias = "senderId", default)]
    pub sender_id: String,
    #[serde(rename = "ReceiverID", alias = "receiverId", default)]
    pub receiver_id: String,
    #[serde(rename = "Message", alias = "message", default)]
    pub message: String,
    /// Client clock; the server clock is used when absent.
    #[serde(
        rename = "Timestamp",
        alias = "timestamp",
        default,
        with = "time::serde::rfc3339::option"
    )]
    pub timestamp: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "senderId")]
    pub sender_id: Option<String>,
    #[serde(rename = "receiverId")]
    pub receiver_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ContactsQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}
