pub mod anime;
pub mod convert;
pub mod error;
pub mod extract;
pub mod reviews;
pub mod state;
pub mod users;

use axum::{
    Json, Router,
    routing::{get, patch, post, put},
};
use serde_json::{Value, json};

use crate::state::AppState;

/// Route table for the review site. Middleware layers are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Profiles
        .route("/user/login", post(users::login))
        .route("/profiles", get(users::list_profiles))
        // Anime
        .route("/addAnime", post(anime::create_anime))
        .route("/anime", get(anime::list_anime))
        .route("/anime/{id}", get(anime::get_anime))
        .route("/anime/{id}/image", patch(anime::patch_image))
        .route("/anime/{id}/description", patch(anime::patch_description))
        // Reviews
        .route("/addReview", post(reviews::create_review))
        .route("/reviews", get(reviews::list_reviews))
        .route("/{id}/reviews", get(reviews::reviews_for_anime))
        .route(
            "/review/single/{id}",
            get(reviews::get_review).put(reviews::update_review_text),
        )
        .route(
            "/review/{id}",
            put(reviews::update_review).delete(reviews::delete_review),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
