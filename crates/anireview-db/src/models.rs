/// Database row types: these map directly to SQLite rows.
/// Distinct from anireview-types API models to keep the DB layer independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub user_email: String,
    pub last_login: String,
    pub name: Option<String>,
    pub img: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnimeRow {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReviewRow {
    pub id: String,
    pub user_id: String,
    pub anime_id: String,
    pub date: String,
    pub rating: String,
    pub text: String,
    pub image: Option<String>,
    pub name: Option<String>,
}

/// Fields of a full review update. `None` leaves the stored value alone.
#[derive(Debug, Default)]
pub struct ReviewChanges {
    pub anime_id: Option<String>,
    pub date: Option<String>,
    pub rating: Option<String>,
    pub text: Option<String>,
}
