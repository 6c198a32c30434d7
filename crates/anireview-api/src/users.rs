use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use anireview_types::api::LoginRequest;
use anireview_types::models::User;

use crate::convert::{convert_all, user_from_row};
use crate::error::{ApiError, required};
use crate::extract::JsonBody;
use crate::state::{AppState, run_db};

/// POST /user/login: find-or-create the profile for an email and stamp the login time.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<StatusCode, ApiError> {
    let LoginRequest { email, name, img } = req;
    let email = required(email, "email")?;

    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let (row, created) = run_db(&state, move |db| {
        db.upsert_login(&id, &email, &now, name.as_deref(), img.as_deref())
    })
    .await?;

    if created {
        info!("Created profile {} for {}", row.id, row.user_email);
    } else {
        debug!("Updated last login for {}", row.user_email);
    }

    Ok(StatusCode::OK)
}

/// GET /profiles
pub async fn list_profiles(State(state): State<AppState>) -> Result<Json<Vec<User>>, ApiError> {
    let rows = run_db(&state, |db| db.list_users()).await?;
    Ok(Json(convert_all(rows, user_from_row)))
}
