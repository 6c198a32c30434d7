use axum::{Json, extract::State};
use tracing::{info, warn};
use uuid::Uuid;

use anireview_db::models::AnimeRow;
use anireview_types::api::{
    AnimeEnvelope, CreateAnimeRequest, PatchDescriptionRequest, PatchImageRequest,
};
use anireview_types::models::Anime;

use crate::convert::{anime_from_row, convert_all};
use crate::error::{ApiError, required};
use crate::extract::{IdPath, JsonBody};
use crate::state::{AppState, run_db};

/// POST /addAnime
pub async fn create_anime(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateAnimeRequest>,
) -> Result<Json<Anime>, ApiError> {
    let row = AnimeRow {
        id: Uuid::new_v4().to_string(),
        name: required(req.name, "name")?,
        image_url: required(req.image_url, "imageURL")?,
        description: req.description,
    };

    let row = run_db(&state, move |db| {
        db.insert_anime(&row)?;
        Ok(row)
    })
    .await?;

    info!("Added anime: {}", row.name);
    Ok(Json(anime_from_row(row)?))
}

/// GET /anime
pub async fn list_anime(State(state): State<AppState>) -> Result<Json<Vec<Anime>>, ApiError> {
    let rows = run_db(&state, |db| db.list_anime()).await?;
    Ok(Json(convert_all(rows, anime_from_row)))
}

/// GET /anime/{id}
pub async fn get_anime(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
) -> Result<Json<AnimeEnvelope>, ApiError> {
    let row = run_db(&state, move |db| db.get_anime_by_id(&id.to_string()))
        .await?
        .ok_or(ApiError::NotFound("anime"))?;

    Ok(Json(AnimeEnvelope {
        anime: anime_from_row(row)?,
    }))
}

/// PATCH /anime/{id}/image
pub async fn patch_image(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    JsonBody(req): JsonBody<PatchImageRequest>,
) -> Result<Json<Anime>, ApiError> {
    let image_url = required(req.image_url, "imageURL")?;

    let Some(row) = run_db(&state, move |db| db.set_anime_image(&id.to_string(), &image_url)).await?
    else {
        warn!("Anime not found: {}", id);
        return Err(ApiError::NotFound("anime"));
    };

    info!("Added imageURL to anime: {}", row.name);
    Ok(Json(anime_from_row(row)?))
}

/// PATCH /anime/{id}/description
pub async fn patch_description(
    State(state): State<AppState>,
    IdPath(id): IdPath<Uuid>,
    JsonBody(req): JsonBody<PatchDescriptionRequest>,
) -> Result<Json<Anime>, ApiError> {
    let description = required(req.description, "description")?;

    let Some(row) = run_db(&state, move |db| {
        db.set_anime_description(&id.to_string(), &description)
    })
    .await?
    else {
        warn!("Anime not found: {}", id);
        return Err(ApiError::NotFound("anime"));
    };

    info!("Added description to anime: {}", row.name);
    Ok(Json(anime_from_row(row)?))
}
