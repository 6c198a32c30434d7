use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;
use uuid::Uuid;

use crate::models::Anime;

// Request fields are all optional; handlers enforce which ones are required.
// Unknown fields are ignored.

/// Accept a string, number or bool for a text field, keeping its JSON spelling.
/// The site posts ratings both as `"9"` and `9`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a scalar, got {}", other))),
    }
}

// -- Users --

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub img: Option<String>,
}

// -- Anime --

#[derive(Debug, Deserialize)]
pub struct CreateAnimeRequest {
    pub name: Option<String>,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatchImageRequest {
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PatchDescriptionRequest {
    pub description: Option<String>,
}

/// GET /anime/{id} wraps the record under an `anime` key.
#[derive(Debug, Serialize, Deserialize)]
pub struct AnimeEnvelope {
    pub anime: Anime,
}

// -- Reviews --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub email: Option<String>,
    pub anime_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
    pub image: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewTextRequest {
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub anime_id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub text: Option<String>,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
