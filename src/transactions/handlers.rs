use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    books::repo_types::Book,
    error::{AppError, AppResult},
    params::require_id,
    state::AppState,
    transactions::{
        dto::{CreateTransactionRequest, HistoryQuery, PurchaseRecord},
        repo_types::{NewTransaction, Transaction},
    },
};

pub fn transaction_routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route("/purchaseHistory", get(purchase_history))
}

// NUMERIC(10,2) upper bound.
const MAX_AMOUNT: f64 = 99_999_999.99;

/// Price × quantity, rounded to cents.
fn total(price: f64, quantity: i32) -> f64 {
    (price * quantity as f64 * 100.0).round() / 100.0
}

#[instrument(skip(state, payload))]
pub async fn create_transaction(
    State(state): State<AppState>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let Json(req) = payload?;
    if req.quantity < 1 {
        return Err(AppError::bad_request("Quantity must be at least 1"));
    }

    let book = Book::find_by_id(&state.db, req.book_id)
        .await?
        .ok_or_else(|| AppError::not_found("Book not found"))?;
    if book.user_id == req.buyer_id {
        warn!(book_id = book.id, buyer_id = req.buyer_id, "seller tried to buy own book");
        return Err(AppError::bad_request("Cannot buy your own book"));
    }

    let amount = total(book.price, req.quantity);
    if amount > MAX_AMOUNT {
        return Err(AppError::bad_request("Order total is too large"));
    }

    let tx = Transaction::create(
        &state.db,
        &NewTransaction {
            buyer_id: req.buyer_id,
            seller_id: book.user_id,
            book_id: book.id,
            amount,
            quantity: req.quantity,
        },
    )
    .await?;

    info!(
        transaction_id = tx.id,
        buyer_id = tx.buyer_id,
        seller_id = tx.seller_id,
        amount = tx.amount,
        "transaction recorded"
    );
    Ok((StatusCode::CREATED, Json(tx)))
}

#[instrument(skip(state))]
pub async fn purchase_history(
    State(state): State<AppState>,
    q: Result<Query<HistoryQuery>, QueryRejection>,
) -> AppResult<Json<Vec<PurchaseRecord>>> {
    let Query(q) = q?;
    let buyer_id = require_id(
        &q.user_id,
        "userID",
        AppError::bad_request("User ID is required"),
    )?;
    let txs = Transaction::list_by_buyer(&state.db, buyer_id).await?;
    let book_ids: Vec<i64> = txs.iter().map(|t| t.book_id).collect();
    let books = Book::find_many(&state.db, &book_ids).await?;

    let records = txs
        .into_iter()
        .filter_map(|transaction| {
            let book = books.get(&transaction.book_id)?.clone();
            Some(PurchaseRecord { transaction, book })
        })
        .collect();
    Ok(Json(records))
}
