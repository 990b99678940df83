use sqlx::PgPool;

use crate::cart::repo_types::CartItem;

const CART_COLUMNS: &str = "id, user_id, book_id, quantity, created_at, updated_at";

impl CartItem {
    /// Inserts the (user, book) pair or adds `quantity` to the existing row in
    /// one statement, so concurrent adds never lose an increment.
    pub async fn add_or_increment(
        db: &PgPool,
        user_id: i64,
        book_id: i64,
        quantity: i32,
    ) -> sqlx::Result<CartItem> {
        sqlx::query_as::<_, CartItem>(&format!(
            r#"
            INSERT INTO cart_items (user_id, book_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT uq_cart_items_user_book
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = now()
            RETURNING {CART_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(book_id)
        .bind(quantity)
        .fetch_one(db)
        .await
    }

    pub async fn list_by_user(db: &PgPool, user_id: i64) -> sqlx::Result<Vec<CartItem>> {
        sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_COLUMNS} FROM cart_items WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// Hard delete scoped to the owner; returns whether a row was removed.
    pub async fn delete_owned(db: &PgPool, id: i64, user_id: i64) -> sqlx::Result<bool> {
        let res = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn set_quantity(
        db: &PgPool,
        id: i64,
        user_id: i64,
        quantity: i32,
    ) -> sqlx::Result<Option<CartItem>> {
        sqlx::query_as::<_, CartItem>(&format!(
            r#"
            UPDATE cart_items
               SET quantity = $3, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {CART_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(db)
        .await
    }
}
