use std::collections::HashMap;

use sqlx::PgPool;

use crate::books::repo_types::{Book, NewBook};
use crate::users::dto::PublicUser;

const BOOK_COLUMNS: &str = "id, isbn, title, price::FLOAT8 AS price, summary, category, subcategory, \
     author, publication_date, image_url, user_id, created_at, updated_at, deleted_at";

impl Book {
    pub async fn create(db: &PgPool, new: &NewBook) -> sqlx::Result<Book> {
        sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (isbn, title, price, summary, category, subcategory, author,
                               publication_date, image_url, user_id)
            VALUES ($1, $2, $3::NUMERIC(10,2), $4, $5, $6, $7, $8, $9, $10)
            RETURNING {BOOK_COLUMNS}
            "#
        ))
        .bind(&new.isbn)
        .bind(&new.title)
        .bind(new.price)
        .bind(&new.summary)
        .bind(&new.category)
        .bind(&new.subcategory)
        .bind(&new.author)
        .bind(new.publication_date)
        .bind(&new.image_url)
        .bind(new.user_id)
        .fetch_one(db)
        .await
    }

    pub async fn list_by_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<Book>> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE user_id = $1 AND deleted_at IS NULL ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<Book>> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE deleted_at IS NULL ORDER BY id"
        ))
        .fetch_all(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<Book>> {
        sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Loads books by id regardless of soft deletion, so carts and purchase
    /// history can still describe listings that were taken down.
    pub async fn find_many(db: &PgPool, ids: &[i64]) -> sqlx::Result<HashMap<i64, Book>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, Book>(&format!(
            "SELECT {BOOK_COLUMNS} FROM books WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(|b| (b.id, b)).collect())
    }

    /// Exact match on category; an empty subcategory means "any".
    pub async fn search(
        db: &PgPool,
        category: &str,
        subcategory: Option<&str>,
    ) -> sqlx::Result<Vec<Book>> {
        sqlx::query_as::<_, Book>(&format!(
            r#"
            SELECT {BOOK_COLUMNS}
            FROM books
            WHERE category = $1
              AND ($2::TEXT IS NULL OR subcategory = $2)
              AND deleted_at IS NULL
            ORDER BY id
            "#
        ))
        .bind(category)
        .bind(subcategory)
        .fetch_all(db)
        .await
    }

    pub async fn owner(&self, db: &PgPool) -> sqlx::Result<Option<PublicUser>> {
        sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, username, email, phone, name, address, gender
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(self.user_id)
        .fetch_optional(db)
        .await
    }
}
