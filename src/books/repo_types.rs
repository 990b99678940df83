use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Book listing record. `price` is stored as `NUMERIC(10,2)` and read back as
/// `FLOAT8`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Book {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "ISBN")]
    pub isbn: String,
    pub title: String,
    pub price: f64,
    pub summary: String,
    pub category: String,
    pub subcategory: String,
    pub author: String,
    #[serde(with = "time::serde::rfc3339")]
    pub publication_date: OffsetDateTime,
    #[serde(rename = "ImageURL")]
    pub image_url: String,
    #[serde(rename = "UserID")]
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone)]
pub struct NewBook {
    pub isbn: String,
    pub title: String,
    pub price: f64,
    pub summary: String,
    pub category: String,
    pub subcategory: String,
    pub author: String,
    pub publication_date: OffsetDateTime,
    pub image_url: String,
    pub user_id: i64,
}
