use serde::{Deserialize, Serialize};

use crate::books::repo_types::Book;
use crate::transactions::repo_types::Transaction;

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    #[serde(rename = "buyerID", alias = "BuyerID", alias = "userID")]
    pub buyer_id: i64,
    #[serde(rename = "bookID", alias = "BookID")]
    pub book_id: i64,
    #[serde(default = "default_quantity", alias = "Quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PurchaseRecord {
    #[serde(flatten)]
    pub transaction: Transaction,
    #[serde(rename = "Book")]
    pub book: Book,
}
