use serde::{Deserialize, Serialize};

use crate::users::repo_types::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "Username")]
    pub username: String,
    #[serde(alias = "Password")]
    pub password: String,
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(default, alias = "Phone")]
    pub phone: String,
    #[serde(default, alias = "Name")]
    pub name: String,
    #[serde(default, alias = "Address")]
    pub address: String,
    #[serde(default, alias = "Gender")]
    pub gender: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "Email")]
    pub email: String,
    #[serde(alias = "Password")]
    pub password: String,
}

/// User projection without credentials.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct PublicUser {
    #[serde(rename = "ID")]
    pub id: i64,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub address: String,
    pub gender: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            phone: u.phone,
            name: u.name,
            address: u.address,
            gender: u.gender,
        }
    }
}
