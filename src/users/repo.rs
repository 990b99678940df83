use crate::users::repo_types::{NewUser, User};
use sqlx::PgPool;

const USER_COLUMNS: &str = "id, username, password, email, phone, name, address, gender, \
     created_at, updated_at, deleted_at";

impl User {
    /// Find a live user by email.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    /// Insert a user; username and email uniqueness is enforced by the schema.
    pub async fn create(db: &PgPool, new: &NewUser<'_>) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, password, email, phone, name, address, gender)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.username)
        .bind(new.password)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.name)
        .bind(new.address)
        .bind(new.gender)
        .fetch_one(db)
        .await
    }
}
