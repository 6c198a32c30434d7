use std::collections::{BTreeSet, HashMap};

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::{debug, info};
use uuid::Uuid;

use anireview_db::models::{AnimeRow, ReviewChanges, ReviewRow, UserRow};
use anireview_types::api::{CreateReviewRequest, UpdateReviewRequest, UpdateReviewTextRequest};
use anireview_types::models::{Anime, Review, ReviewDetail, User};

use crate::convert::{anime_from_row, convert_all, review_from_row, user_from_row};
use crate::error::{ApiError, required};
use crate::extract::{IdPath, JsonBody};
use crate::state::{AppState, run_db};

/// POST /addReview
///
/// The author is resolved from the email and stored by id. The user lookup,
/// anime check and insert are separate store calls, not one transaction.
pub async fn create_review(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateReviewRequest>,
) -> Result<StatusCode, ApiError> {
    let CreateReviewRequest {
        email,
        anime_id,
        date,
        rating,
        text,
        image,
        name,
    } = req;

    let email = required(email, "email")?;
    let anime_id = anime_id.ok_or(ApiError::MissingField("animeId"))?;
    let date = required(date, "date")?;
    let rating = required(rating, "rating")?;
    let text = required(text, "text")?;

    let user = run_db(&state, move |db| db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::NotFound("user"))?;

    let anime = run_db(&state, move |db| db.get_anime_by_id(&anime_id.to_string()))
        .await?
        .ok_or(ApiError::NotFound("anime"))?;

    let row = ReviewRow {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        anime_id: anime.id,
        date,
        rating,
        text,
        image,
        name,
    };

    let review_id = run_db(&state, move |db| {
        db.insert_review(&row)?;
        Ok(row.id)
    })
    .await?;

    info!(
        "Review {} added for anime '{}' by {}",
        review_id, anime.name, user.user_email
    );
    Ok(StatusCode::OK)
}

/// GET /reviews: every review with its anime and author embedded.
pub async fn list_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewDetail>>, ApiError> {
    let (rows, anime_rows, user_rows) = run_db(&state, |db| {
        let rows = db.list_reviews()?;

        let anime_ids = distinct(rows.iter().map(|r| r.anime_id.as_str()));
        let user_ids = distinct(rows.iter().map(|r| r.user_id.as_str()));

        let anime_rows = db.get_anime_by_ids(&anime_ids)?;
        let user_rows = db.get_users_by_ids(&user_ids)?;

        Ok((rows, anime_rows, user_rows))
    })
    .await?;

    Ok(Json(join_references(rows, anime_rows, user_rows)))
}

/// GET /{id}/reviews: reviews of one anime, references left as ids.
pub async fn reviews_for_anime(
    State(state): State<AppState>,
    IdPath(anime_id): IdPath<Uuid>,
) -> Result<Json<Vec<Review>>, ApiError> {
    debug!("Listing reviews for anime {}", anime_id);
    let rows = run_db(&state, move |db| db.get_reviews_by_anime(&anime_id.to_string())).await?;
    Ok(Json(convert_all(rows, review_from_row)))
}

/// GET /review/single/{id}
pub async fn get_review(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<Review>, ApiError> {
    let row = run_db(&state, move |db| db.get_review_by_id(&id.to_string()))
        .await?
        .ok_or(ApiError::NotFound("review"))?;

    Ok(Json(review_from_row(row)?))
}

/// PUT /review/single/{id}: replace the text and nothing else.
///
/// A body that does not parse is reported the same way as a missing text.
pub async fn update_review_text(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    body: Result<Json<UpdateReviewTextRequest>, JsonRejection>,
) -> Result<Json<Review>, ApiError> {
    let text = body
        .ok()
        .and_then(|Json(req)| req.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::BadRequest("review text is required"))?;

    let row = run_db(&state, move |db| db.update_review_text(&id.to_string(), &text))
        .await?
        .ok_or(ApiError::NotFound("review"))?;

    info!("Updated text of review {}", row.id);
    Ok(Json(review_from_row(row)?))
}

/// PUT /review/{id}: update whichever of anime, date, rating and text are given.
pub async fn update_review(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    JsonBody(req): JsonBody<UpdateReviewRequest>,
) -> Result<Json<Review>, ApiError> {
    let changes = ReviewChanges {
        anime_id: req.anime_id.map(|a| a.to_string()),
        date: req.date,
        rating: req.rating,
        text: req.text,
    };

    let row = run_db(&state, move |db| db.update_review(&id.to_string(), &changes))
        .await?
        .ok_or(ApiError::NotFound("review"))?;

    info!("Updated review {}", row.id);
    Ok(Json(review_from_row(row)?))
}

/// DELETE /review/{id}: succeeds whether or not the review existed.
pub async fn delete_review(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let removed = run_db(&state, move |db| db.delete_review(&id.to_string())).await?;

    if removed {
        info!("Deleted review {}", id);
    } else {
        debug!("Delete of unknown review {}", id);
    }
    Ok(StatusCode::OK)
}

fn distinct<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<String> {
    ids.collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Populate step: swap each review's anime and user references for the
/// fetched records. References with no matching record come back as `None`.
fn join_references(
    rows: Vec<ReviewRow>,
    anime_rows: Vec<AnimeRow>,
    user_rows: Vec<UserRow>,
) -> Vec<ReviewDetail> {
    let anime: HashMap<Uuid, Anime> = convert_all(anime_rows, anime_from_row)
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let users: HashMap<Uuid, User> = convert_all(user_rows, user_from_row)
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    convert_all(rows, review_from_row)
        .into_iter()
        .map(|review| ReviewDetail {
            anime: anime.get(&review.anime_id).cloned(),
            author: users.get(&review.user).cloned(),
            review,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review_row(id: &Uuid, user_id: &Uuid, anime_id: &Uuid) -> ReviewRow {
        ReviewRow {
            id: id.to_string(),
            user_id: user_id.to_string(),
            anime_id: anime_id.to_string(),
            date: "2024-03-01".into(),
            rating: "7".into(),
            text: "solid".into(),
            image: None,
            name: None,
        }
    }

    #[test]
    fn join_embeds_matching_records() {
        let (user_id, anime_id) = (Uuid::new_v4(), Uuid::new_v4());
        let rows = vec![
            review_row(&Uuid::new_v4(), &user_id, &anime_id),
            review_row(&Uuid::new_v4(), &user_id, &anime_id),
        ];
        let anime_rows = vec![AnimeRow {
            id: anime_id.to_string(),
            name: "Frieren".into(),
            image_url: "f.png".into(),
            description: None,
        }];
        let user_rows = vec![UserRow {
            id: user_id.to_string(),
            user_email: "a@example.com".into(),
            last_login: "2024-01-01T00:00:00+00:00".into(),
            name: None,
            img: None,
        }];

        let joined = join_references(rows, anime_rows, user_rows);

        assert_eq!(joined.len(), 2);
        for detail in &joined {
            assert_eq!(detail.anime.as_ref().map(|a| a.name.as_str()), Some("Frieren"));
            assert_eq!(detail.author.as_ref().map(|u| u.id), Some(user_id));
            assert_eq!(detail.review.anime_id, anime_id);
        }
    }

    #[test]
    fn join_leaves_dangling_references_empty() {
        let rows = vec![review_row(&Uuid::new_v4(), &Uuid::new_v4(), &Uuid::new_v4())];

        let joined = join_references(rows, vec![], vec![]);

        assert!(joined[0].anime.is_none());
        assert!(joined[0].author.is_none());
    }

    #[test]
    fn join_skips_reviews_with_corrupt_ids() {
        let mut corrupt = review_row(&Uuid::new_v4(), &Uuid::new_v4(), &Uuid::new_v4());
        corrupt.id = "not-a-uuid".into();
        let good_id = Uuid::new_v4();
        let rows = vec![corrupt, review_row(&good_id, &Uuid::new_v4(), &Uuid::new_v4())];

        let joined = join_references(rows, vec![], vec![]);

        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].review.id, good_id);
    }

    #[test]
    fn distinct_dedupes_ids() {
        let ids = distinct(["b", "a", "b"].into_iter());
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
