use serde::Serialize;
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;

/// Lifecycle label of a purchase. New rows start as `Pending`; nothing moves
/// them further yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown transaction status {0:?}")]
pub struct UnknownStatus(String);

impl TryFrom<String> for TransactionStatus {
    type Error = UnknownStatus;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(UnknownStatus(s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Transaction {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "BuyerID")]
    pub buyer_id: i64,
    #[serde(rename = "SellerID")]
    pub seller_id: i64,
    #[serde(rename = "BookID")]
    pub book_id: i64,
    pub amount: f64,
    pub quantity: i32,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub buyer_id: i64,
    pub seller_id: i64,
    pub book_id: i64,
    pub amount: f64,
    pub quantity: i32,
}
