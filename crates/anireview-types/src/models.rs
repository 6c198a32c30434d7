use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reviewer profile. `user_email` is the natural key: one profile per email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub user_email: String,
    pub last_login: DateTime<Utc>,
    pub name: Option<String>,
    pub img: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    pub description: Option<String>,
}

/// A review as stored: `user` and `anime_id` are plain references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub user: Uuid,
    pub anime_id: Uuid,
    pub date: String,
    pub rating: String,
    pub text: String,
    pub image: Option<String>,
    pub name: Option<String>,
}

/// A review with its references resolved for display.
/// A reference that no longer resolves is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewDetail {
    #[serde(flatten)]
    pub review: Review,
    pub anime: Option<Anime>,
    pub author: Option<User>,
}
