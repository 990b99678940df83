use serde::{Deserialize, Serialize};

use crate::books::repo_types::Book;
use crate::cart::repo_types::CartItem;

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    #[serde(rename = "userID", alias = "UserID")]
    pub user_id: i64,
    #[serde(rename = "bookID", alias = "BookID")]
    pub book_id: i64,
    #[serde(default = "default_quantity", alias = "Quantity")]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    #[serde(alias = "Quantity")]
    pub quantity: i32,
}

/// `?userID=` scoping for every cart route.
#[derive(Debug, Deserialize)]
pub struct CartOwnerQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

/// Cart row with the listing it points at.
#[derive(Debug, Serialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub item: CartItem,
    #[serde(rename = "Book")]
    pub book: Book,
}
