use sqlx::PgPool;

use crate::transactions::repo_types::{NewTransaction, Transaction, TransactionStatus};

const TX_COLUMNS: &str = "id, buyer_id, seller_id, book_id, amount::FLOAT8 AS amount, quantity, \
     status, created_at, updated_at, deleted_at";

impl Transaction {
    /// Records a purchase in the `pending` state.
    pub async fn create(db: &PgPool, new: &NewTransaction) -> sqlx::Result<Transaction> {
        sqlx::query_as::<_, Transaction>(&format!(
            r#"
            INSERT INTO transactions (buyer_id, seller_id, book_id, amount, quantity, status)
            VALUES ($1, $2, $3, $4::NUMERIC(10,2), $5, $6)
            RETURNING {TX_COLUMNS}
            "#
        ))
        .bind(new.buyer_id)
        .bind(new.seller_id)
        .bind(new.book_id)
        .bind(new.amount)
        .bind(new.quantity)
        .bind(TransactionStatus::Pending.as_str())
        .fetch_one(db)
        .await
    }

    /// Purchases made by `buyer_id`, newest first.
    pub async fn list_by_buyer(db: &PgPool, buyer_id: i64) -> sqlx::Result<Vec<Transaction>> {
        sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TX_COLUMNS}
            FROM transactions
            WHERE buyer_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(buyer_id)
        .fetch_all(db)
        .await
    }
}
