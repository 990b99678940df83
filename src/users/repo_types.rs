use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// User record in the database.
///
/// `password` holds the Argon2 hash. It is serialized because registration
/// echoes the stored row; every other response goes through `PublicUser`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(rename = "ID")]
    pub id: i64,
    pub username: String,
    pub password: String,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub address: String,
    pub gender: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deleted_at: Option<OffsetDateTime>,
}

/// Fields needed to insert a user; `password` is already hashed.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub name: &'a str,
    pub address: &'a str,
    pub gender: &'a str,
}
