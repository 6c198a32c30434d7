//! Row -> wire model conversion.
//!
//! Stored ids and timestamps are text. A corrupt id is an error: single-record
//! reads fail with a store error and listings skip the row. A corrupt timestamp
//! is logged and replaced with the epoch.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use anireview_db::models::{AnimeRow, ReviewRow, UserRow};
use anireview_types::models::{Anime, Review, User};

use crate::error::ApiError;

fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    raw.parse()
        .map_err(|e| ApiError::Store(anyhow!("corrupt {} '{}': {}", what, raw, e)))
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // Rows written by hand through the sqlite shell use datetime('now').
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

pub fn user_from_row(row: UserRow) -> Result<User, ApiError> {
    Ok(User {
        id: parse_id(&row.id, "user id")?,
        last_login: parse_timestamp(&row.last_login),
        user_email: row.user_email,
        name: row.name,
        img: row.img,
    })
}

pub fn anime_from_row(row: AnimeRow) -> Result<Anime, ApiError> {
    Ok(Anime {
        id: parse_id(&row.id, "anime id")?,
        name: row.name,
        image_url: row.image_url,
        description: row.description,
    })
}

pub fn review_from_row(row: ReviewRow) -> Result<Review, ApiError> {
    Ok(Review {
        id: parse_id(&row.id, "review id")?,
        user: parse_id(&row.user_id, "review user_id")?,
        anime_id: parse_id(&row.anime_id, "review anime_id")?,
        date: row.date,
        rating: row.rating,
        text: row.text,
        image: row.image,
        name: row.name,
    })
}

/// Convert a listing, dropping (and logging) rows that fail to convert.
pub fn convert_all<R, T>(rows: Vec<R>, convert: fn(R) -> Result<T, ApiError>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match convert(row) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Skipping row: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anime_row(id: &str) -> AnimeRow {
        AnimeRow {
            id: id.to_string(),
            name: "Mushishi".into(),
            image_url: "m.png".into(),
            description: None,
        }
    }

    #[test]
    fn parses_rfc3339_and_sqlite_timestamps() {
        let a = parse_timestamp("2024-05-01T10:00:00+00:00");
        let b = parse_timestamp("2024-05-01 10:00:00");
        assert_eq!(a, b);
    }

    #[test]
    fn corrupt_timestamp_falls_back_to_epoch() {
        assert_eq!(parse_timestamp("yesterday"), DateTime::<Utc>::default());
    }

    #[test]
    fn corrupt_id_is_a_store_error() {
        let err = anime_from_row(anime_row("not-a-uuid")).unwrap_err();
        assert!(matches!(err, ApiError::Store(_)));
    }

    #[test]
    fn listing_skips_rows_with_corrupt_ids() {
        let good = Uuid::new_v4();
        let rows = vec![anime_row("not-a-uuid"), anime_row(&good.to_string())];

        let anime = convert_all(rows, anime_from_row);

        assert_eq!(anime.len(), 1);
        assert_eq!(anime[0].id, good);
    }
}
