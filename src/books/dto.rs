use serde::{Deserialize, Serialize};

use crate::books::repo_types::Book;
use crate::users::dto::PublicUser;

#[derive(Debug, Deserialize)]
pub struct UserBooksQuery {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookDetailsQuery {
    #[serde(rename = "bookID")]
    pub book_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuickSearchQuery {
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

/// A book together with the account that listed it.
#[derive(Debug, Serialize)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    #[serde(rename = "User")]
    pub user: PublicUser,
}

/// Text fields of the listing form, collected before validation.
#[derive(Debug, Default)]
pub struct BookForm {
    pub isbn: String,
    pub title: String,
    pub price: String,
    pub summary: String,
    pub category: String,
    pub subcategory: String,
    pub author: String,
    pub user_id: String,
}

impl BookForm {
    /// Stores a text field by its form name; unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "isbn" => &mut self.isbn,
            "title" => &mut self.title,
            "price" => &mut self.price,
            "summary" => &mut self.summary,
            "category" => &mut self.category,
            "subcategory" => &mut self.subcategory,
            "author" => &mut self.author,
            "userID" => &mut self.user_id,
            _ => return,
        };
        *slot = value.trim().to_string();
    }
}
