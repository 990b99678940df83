use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    books::repo_types::Book,
    cart::{
        dto::{AddToCartRequest, CartEntry, CartOwnerQuery, UpdateQuantityRequest},
        repo_types::CartItem,
    },
    error::{AppError, AppResult},
    params::require_id,
    state::AppState,
};

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(list_cart))
        .route("/cart/add", post(add_to_cart))
        .route("/cart/delete/:item_id", delete(delete_cart_item))
        .route("/cart/update/:item_id", put(update_cart_item))
}

fn owner_id(q: &CartOwnerQuery) -> AppResult<i64> {
    require_id(
        &q.user_id,
        "userID",
        AppError::unauthorized("User ID is required"),
    )
}

fn check_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 1 {
        return Err(AppError::bad_request("Quantity must be at least 1"));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    payload: Result<Json<AddToCartRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<CartItem>)> {
    let Json(req) = payload?;
    check_quantity(req.quantity)?;

    let item = CartItem::add_or_increment(&state.db, req.user_id, req.book_id, req.quantity).await?;
    info!(
        item_id = item.id,
        user_id = item.user_id,
        book_id = item.book_id,
        quantity = item.quantity,
        "cart item added"
    );
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state))]
pub async fn list_cart(
    State(state): State<AppState>,
    q: Result<Query<CartOwnerQuery>, QueryRejection>,
) -> AppResult<Json<Vec<CartEntry>>> {
    let Query(q) = q?;
    let user_id = owner_id(&q)?;
    let items = CartItem::list_by_user(&state.db, user_id).await?;
    let book_ids: Vec<i64> = items.iter().map(|i| i.book_id).collect();
    let mut books = Book::find_many(&state.db, &book_ids).await?;

    let entries = items
        .into_iter()
        .filter_map(|item| match books.remove(&item.book_id) {
            Some(book) => Some(CartEntry { item, book }),
            None => {
                warn!(item_id = item.id, book_id = item.book_id, "cart item without book");
                None
            }
        })
        .collect();
    Ok(Json(entries))
}

#[instrument(skip(state))]
pub async fn delete_cart_item(
    State(state): State<AppState>,
    item_id: Result<Path<i64>, PathRejection>,
    q: Result<Query<CartOwnerQuery>, QueryRejection>,
) -> AppResult<StatusCode> {
    let Path(item_id) = item_id.map_err(|_| AppError::bad_request("Invalid item ID"))?;
    let Query(q) = q?;
    let user_id = owner_id(&q)?;

    if !CartItem::delete_owned(&state.db, item_id, user_id).await? {
        warn!(item_id, user_id, "cart item not found for user");
        return Err(AppError::not_found("Cart item not found"));
    }
    info!(item_id, user_id, "cart item deleted");
    Ok(StatusCode::OK)
}

#[instrument(skip(state, payload))]
pub async fn update_cart_item(
    State(state): State<AppState>,
    item_id: Result<Path<i64>, PathRejection>,
    q: Result<Query<CartOwnerQuery>, QueryRejection>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> AppResult<Json<CartItem>> {
    let Path(item_id) = item_id.map_err(|_| AppError::bad_request("Invalid item ID"))?;
    let Query(q) = q?;
    let user_id = owner_id(&q)?;
    let Json(req) = payload?;
    check_quantity(req.quantity)?;

    let item = CartItem::set_quantity(&state.db, item_id, user_id, req.quantity)
        .await?
        .ok_or_else(|| AppError::not_found("Cart item not found"))?;
    Ok(Json(item))
}


#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::app::build_app;
    use crate::state::test_support::FakeStorage;
    use axum::{body::Body, http::Request};
    use sqlx::PgPool;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn seed(pool: &PgPool) -> (i64, i64, i64) {
        let mut users = Vec::new();
        for name in ["buyer", "other"] {
            let (id,): (i64,) = sqlx::query_as(
                "INSERT INTO users (username, password, email) VALUES ($1, 'x', $1 || '@example.com') RETURNING id",
            )
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap();
            users.push(id);
        }
        let (book,): (i64,) = sqlx::query_as(
            "INSERT INTO books (isbn, title, price, category, subcategory, author, user_id) \
             VALUES ('0', 'b', 10, '外文', '英文', 'a', $1) RETURNING id",
        )
        .bind(users[1])
        .fetch_one(pool)
        .await
        .unwrap();
        (users[0], users[1], book)
    }

    async fn status_of(pool: &PgPool, req: Request<Body>) -> StatusCode {
        build_app(AppState::from_parts(
            pool.clone(),
            Arc::new(FakeStorage::default()),
        ))
        .oneshot(req)
        .await
        .unwrap()
        .status()
    }

    fn add(user: i64, book: i64, qty: i32) -> Request<Body> {
        Request::post("/api/cart/add")
            .header("content-type", "application/json")
            .body(Body::from(format!(
                r#"{{"userID":{user},"bookID":{book},"quantity":{qty}}}"#
            )))
            .unwrap()
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn repeated_adds_merge_into_one_row(pool: PgPool) {
        let (buyer, _, book) = seed(&pool).await;
        assert_eq!(status_of(&pool, add(buyer, book, 2)).await, StatusCode::CREATED);
        assert_eq!(status_of(&pool, add(buyer, book, 3)).await, StatusCode::CREATED);

        let items = CartItem::list_by_user(&pool, buyer).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn concurrent_adds_do_not_lose_updates(pool: PgPool) {
        let (buyer, _, book) = seed(&pool).await;
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let pool = pool.clone();
                tokio::spawn(async move { CartItem::add_or_increment(&pool, buyer, book, 1).await })
            })
            .collect();
        for t in tasks {
            t.await.unwrap().unwrap();
        }
        let items = CartItem::list_by_user(&pool, buyer).await.unwrap();
        assert_eq!(items[0].quantity, 8);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn delete_by_other_user_leaves_row(pool: PgPool) {
        let (buyer, other, book) = seed(&pool).await;
        let item = CartItem::add_or_increment(&pool, buyer, book, 1).await.unwrap();

        let status = status_of(
            &pool,
            Request::delete(format!("/api/cart/delete/{}?userID={}", item.id, other))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(CartItem::list_by_user(&pool, buyer).await.unwrap().len(), 1);

        let status = status_of(
            &pool,
            Request::delete(format!("/api/cart/delete/{}?userID={}", item.id, buyer))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(CartItem::list_by_user(&pool, buyer).await.unwrap().is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn add_unknown_book_is_bad_request(pool: PgPool) {
        let (buyer, _, _) = seed(&pool).await;
        assert_eq!(
            status_of(&pool, add(buyer, 987654, 1)).await,
            StatusCode::BAD_REQUEST
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn update_sets_quantity_only_for_owner(pool: PgPool) {
        let (buyer, other, book) = seed(&pool).await;
        let item = CartItem::add_or_increment(&pool, buyer, book, 1).await.unwrap();
        let update = |user: i64| {
            Request::put(format!("/api/cart/update/{}?userID={}", item.id, user))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"quantity":4}"#))
                .unwrap()
        };

        assert_eq!(status_of(&pool, update(other)).await, StatusCode::NOT_FOUND);
        assert_eq!(status_of(&pool, update(buyer)).await, StatusCode::OK);
        assert_eq!(CartItem::list_by_user(&pool, buyer).await.unwrap()[0].quantity, 4);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn quantity_overflow_is_bad_request(pool: PgPool) {
        let (buyer, _, book) = seed(&pool).await;
        assert_eq!(
            status_of(&pool, add(buyer, book, 2_000_000_000)).await,
            StatusCode::CREATED
        );
        assert_eq!(
            status_of(&pool, add(buyer, book, 2_000_000_000)).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CartItem::list_by_user(&pool, buyer).await.unwrap()[0].quantity,
            2_000_000_000
        );
    }
}
