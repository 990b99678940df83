use std::collections::BTreeMap;

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, DefaultBodyLimit, Multipart,
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use time::{macros::offset, OffsetDateTime};
use tracing::{error, info, instrument};

use crate::{
    books::{
        categories::taxonomy,
        dto::{BookDetails, BookDetailsQuery, BookForm, QuickSearchQuery, UserBooksQuery},
        repo_types::{Book, NewBook},
    },
    error::{AppError, AppResult},
    images::services::{discard_image, is_image, upload_book_image, UploadItem},
    params::{parse_id, present, require_id},
    state::AppState,
};

const MAX_FORM_BYTES: usize = 10 * 1024 * 1024;
// NUMERIC(10,2) upper bound.
const MAX_PRICE: f64 = 99_999_999.99;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/booklist", get(list_user_books))
        .route("/allbooks", get(list_all_books))
        .route("/booksDetails", get(book_details))
        .route("/categories", get(categories))
        .route("/Quicksearch", get(quick_search))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/books", post(create_book))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES))
}

/// POST /books (multipart): listing fields plus an `image` file.
#[instrument(skip(state, mp))]
pub async fn create_book(
    State(state): State<AppState>,
    mp: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<Book>> {
    let mut mp = mp?;
    let mut form = BookForm::default();
    let mut image: Option<(bytes::Bytes, String)> = None;

    while let Some(field) = mp.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            image = Some((field.bytes().await?, content_type));
        } else {
            form.set(&name, field.text().await?);
        }
    }

    let mut new = validate_form(form)?;
    let (body, content_type) = match image {
        Some((body, ct)) if !body.is_empty() => (body, ct),
        _ => return Err(AppError::bad_request("Failed to get image file")),
    };
    if !is_image(&content_type) {
        return Err(AppError::bad_request("Image must be an image/* upload"));
    }

    let stored = upload_book_image(
        state.storage.as_ref(),
        new.user_id,
        UploadItem {
            body,
            content_type: &content_type,
        },
    )
    .await?;
    new.image_url = stored.url.clone();

    let book = match Book::create(&state.db, &new).await {
        Ok(b) => b,
        Err(e) => {
            error!(error = %e, key = %stored.key, "insert book failed; removing uploaded image");
            discard_image(state.storage.as_ref(), &stored.key).await;
            return Err(e.into());
        }
    };

    info!(book_id = book.id, user_id = book.user_id, "book listed");
    Ok(Json(book))
}

fn validate_form(form: BookForm) -> AppResult<NewBook> {
    let user_id = parse_id(&form.user_id, "userID")?;
    let price: f64 = form
        .price
        .parse()
        .ok()
        .filter(|p: &f64| p.is_finite() && (0.0..=MAX_PRICE).contains(p))
        .ok_or_else(|| AppError::bad_request("Invalid price format"))?;

    for (field, value) in [
        ("isbn", &form.isbn),
        ("title", &form.title),
        ("category", &form.category),
        ("subcategory", &form.subcategory),
        ("author", &form.author),
    ] {
        if value.is_empty() {
            return Err(AppError::bad_request(format!("{} is required", field)));
        }
    }

    Ok(NewBook {
        isbn: form.isbn,
        title: form.title,
        price,
        summary: form.summary,
        category: form.category,
        subcategory: form.subcategory,
        author: form.author,
        publication_date: OffsetDateTime::now_utc().to_offset(offset!(+8)),
        image_url: String::new(),
        user_id,
    })
}

#[instrument(skip(state))]
pub async fn list_user_books(
    State(state): State<AppState>,
    q: Result<Query<UserBooksQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Book>>> {
    let Query(q) = q?;
    let user_id = require_id(
        &q.user_id,
        "userID",
        AppError::bad_request("User ID is required"),
    )?;
    Ok(Json(Book::list_by_user(&state.db, user_id).await?))
}

#[instrument(skip(state))]
pub async fn list_all_books(State(state): State<AppState>) -> AppResult<Json<Vec<Book>>> {
    Ok(Json(Book::list_all(&state.db).await?))
}

#[instrument(skip(state))]
pub async fn book_details(
    State(state): State<AppState>,
    q: Result<Query<BookDetailsQuery>, QueryRejection>,
) -> AppResult<Json<BookDetails>> {
    let Query(q) = q?;
    let book_id = require_id(
        &q.book_id,
        "bookID",
        AppError::bad_request("Book ID is required"),
    )?;
    let book = Book::find_by_id(&state.db, book_id)
        .await?
        .ok_or_else(|| AppError::not_found("Book not found"))?;
    let user = book
        .owner(&state.db)
        .await?
        .ok_or_else(|| AppError::not_found("Book owner not found"))?;
    Ok(Json(BookDetails { book, user }))
}

pub async fn categories() -> Json<BTreeMap<&'static str, &'static [&'static str]>> {
    Json(taxonomy())
}

/// Unknown or missing categories yield an empty list rather than an error.
#[instrument(skip(state))]
pub async fn quick_search(
    State(state): State<AppState>,
    q: Result<Query<QuickSearchQuery>, QueryRejection>,
) -> AppResult<Json<Vec<Book>>> {
    let Query(q) = q?;
    let Some(category) = present(&q.category) else {
        return Ok(Json(Vec::new()));
    };
    let books = Book::search(&state.db, category, present(&q.subcategory)).await?;
    Ok(Json(books))
}


#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::app::build_app;
    use crate::state::test_support::FakeStorage;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use sqlx::PgPool;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn seed(pool: &PgPool) -> i64 {
        let owner: (i64,) = sqlx::query_as(
            "INSERT INTO users (username, password, email) VALUES ('seller', 'x', 'seller@example.com') RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();
        for (title, cat, sub) in [
            ("微積分", "科學類", "數學"),
            ("線性代數", "科學類", "數學"),
            ("普通物理", "科學類", "物理學"),
            ("論語", "哲學類", "中國哲學"),
        ] {
            sqlx::query(
                "INSERT INTO books (isbn, title, price, category, subcategory, author, user_id) \
                 VALUES ('0', $1, 100, $2, $3, 'a', $4)",
            )
            .bind(title)
            .bind(cat)
            .bind(sub)
            .bind(owner.0)
            .execute(pool)
            .await
            .unwrap();
        }
        owner.0
    }

    // Request URIs must be ASCII.
    fn enc(s: &str) -> String {
        s.bytes()
            .map(|b| {
                if b.is_ascii_alphanumeric() {
                    (b as char).to_string()
                } else {
                    format!("%{:02X}", b)
                }
            })
            .collect()
    }

    async fn get(pool: &PgPool, uri: &str) -> (StatusCode, serde_json::Value) {
        let app = build_app(AppState::from_parts(
            pool.clone(),
            Arc::new(FakeStorage::default()),
        ));
        let res = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap_or_default())
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn quick_search_filters_by_category_and_subcategory(pool: PgPool) {
        seed(&pool).await;

        let (_, all_science) = get(&pool, &format!("/api/Quicksearch?category={}", enc("科學類"))).await;
        let all_science = all_science.as_array().unwrap();
        assert_eq!(all_science.len(), 3);
        assert!(all_science.iter().all(|b| b["Category"] == "科學類"));

        let (_, math) = get(
            &pool,
            &format!(
                "/api/Quicksearch?category={}&subcategory={}",
                enc("科學類"),
                enc("數學")
            ),
        )
        .await;
        assert_eq!(math.as_array().unwrap().len(), 2);

        let (status, none) = get(&pool, &format!("/api/Quicksearch?category={}", enc("不存在"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(none, serde_json::json!([]));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn details_include_owner_without_password(pool: PgPool) {
        let owner = seed(&pool).await;
        let (_, books) = get(&pool, &format!("/api/booklist?userID={owner}")).await;
        let id = books[0]["ID"].as_i64().unwrap();

        let (status, details) = get(&pool, &format!("/api/booksDetails?bookID={id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(details["User"]["Username"], "seller");
        assert!(details["User"].get("Password").is_none());
        assert_eq!(details["Price"], 100.0);

        let (status, _) = get(&pool, "/api/booksDetails?bookID=999999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    fn listing_request(user_id: i64) -> Request<Body> {
        let boundary = "XBOUNDARY";
        let uid = user_id.to_string();
        let mut body = Vec::new();
        for (k, v) in [
            ("isbn", "9780000000001"),
            ("title", "小王子"),
            ("price", "120"),
            ("summary", "九成新"),
            ("category", "文學類"),
            ("subcategory", "小說"),
            ("author", "聖修伯里"),
            ("userID", uid.as_str()),
        ] {
            body.extend_from_slice(
                format!("--{boundary}\r\nContent-Disposition: form-data; name=\"{k}\"\r\n\r\n{v}\r\n")
                    .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"cover.png\"\r\n\
                 Content-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&[0x89, b'P', b'N', b'G']);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        Request::post("/api/books")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn create_book_stores_row_with_image_url(pool: PgPool) {
        let owner = seed(&pool).await;
        let storage = Arc::new(FakeStorage::default());
        let res = build_app(AppState::from_parts(pool.clone(), storage.clone()))
            .oneshot(listing_request(owner))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
        let book: serde_json::Value = serde_json::from_slice(&body).unwrap();

        let keys = storage.objects.lock().unwrap().clone();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with(&format!("books/{owner}/")));
        assert!(keys[0].ends_with(".png"));
        assert_eq!(book["ImageURL"], format!("https://fake.local/{}", keys[0]));
        assert_eq!(book["Title"], "小王子");

        let stored = Book::find_by_id(&pool, book["ID"].as_i64().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.image_url, book["ImageURL"]);
        assert_eq!(stored.price, 120.0);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn failed_insert_removes_uploaded_image(pool: PgPool) {
        seed(&pool).await;
        let storage = Arc::new(FakeStorage::default());
        let res = build_app(AppState::from_parts(pool.clone(), storage.clone()))
            .oneshot(listing_request(987_654))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(storage.objects.lock().unwrap().is_empty());
        assert_eq!(Book::list_all(&pool).await.unwrap().len(), 4);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn allbooks_skips_soft_deleted(pool: PgPool) {
        seed(&pool).await;
        sqlx::query("UPDATE books SET deleted_at = now() WHERE title = '論語'")
            .execute(&pool)
            .await
            .unwrap();

        let (status, books) = get(&pool, "/api/allbooks").await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<_> = books
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["Title"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(titles, ["微積分", "線性代數", "普通物理"]);
    }
}
