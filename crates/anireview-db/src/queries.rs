use crate::models::{AnimeRow, ReviewChanges, ReviewRow, UserRow};
use crate::Database;
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row};

const USER_COLUMNS: &str = "id, user_email, last_login, name, img";
const ANIME_COLUMNS: &str = "id, name, image_url, description";
const REVIEW_COLUMNS: &str = "id, user_id, anime_id, date, rating, text, image, name";

impl Database {
    // -- Users --

    /// Find-or-create the profile for `email` and stamp `last_login`.
    ///
    /// One statement keyed on the unique email, so two concurrent first logins
    /// cannot both insert. `name`/`img` only overwrite stored values when given.
    /// Returns the stored row and whether it was newly created.
    pub fn upsert_login(
        &self,
        id: &str,
        email: &str,
        last_login: &str,
        name: Option<&str>,
        img: Option<&str>,
    ) -> Result<(UserRow, bool)> {
        self.with_conn(|conn| {
            let sql = format!(
                "INSERT INTO users (id, user_email, last_login, name, img) VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_email) DO UPDATE SET
                     last_login = excluded.last_login,
                     name = COALESCE(excluded.name, users.name),
                     img = COALESCE(excluded.img, users.img)
                 RETURNING {USER_COLUMNS}"
            );
            let row = conn.query_row(
                &sql,
                rusqlite::params![id, email, last_login, name, img],
                user_from_row,
            )?;
            let created = row.id == id;
            Ok((row, created))
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {USER_COLUMNS} FROM users WHERE user_email = ?1"),
                    [email],
                    user_from_row,
                )
                .optional()?)
        })
    }

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY rowid"))?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch users for a set of ids. Unknown ids are skipped.
    pub fn get_users_by_ids(&self, ids: &[String]) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| query_by_ids(conn, "users", USER_COLUMNS, ids, user_from_row))
    }

    // -- Anime --

    pub fn insert_anime(&self, anime: &AnimeRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO anime (id, name, image_url, description) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![anime.id, anime.name, anime.image_url, anime.description],
            )?;
            Ok(())
        })
    }

    pub fn list_anime(&self) -> Result<Vec<AnimeRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {ANIME_COLUMNS} FROM anime ORDER BY rowid"))?;
            let rows = stmt
                .query_map([], anime_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_anime_by_id(&self, id: &str) -> Result<Option<AnimeRow>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {ANIME_COLUMNS} FROM anime WHERE id = ?1"),
                    [id],
                    anime_from_row,
                )
                .optional()?)
        })
    }

    /// Batch-fetch anime for a set of ids. Unknown ids are skipped.
    pub fn get_anime_by_ids(&self, ids: &[String]) -> Result<Vec<AnimeRow>> {
        self.with_conn(|conn| query_by_ids(conn, "anime", ANIME_COLUMNS, ids, anime_from_row))
    }

    /// Returns the updated row, or `None` when no anime has this id.
    pub fn set_anime_image(&self, id: &str, image_url: &str) -> Result<Option<AnimeRow>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("UPDATE anime SET image_url = ?2 WHERE id = ?1 RETURNING {ANIME_COLUMNS}"),
                    [id, image_url],
                    anime_from_row,
                )
                .optional()?)
        })
    }

    /// Returns the updated row, or `None` when no anime has this id.
    pub fn set_anime_description(&self, id: &str, description: &str) -> Result<Option<AnimeRow>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("UPDATE anime SET description = ?2 WHERE id = ?1 RETURNING {ANIME_COLUMNS}"),
                    [id, description],
                    anime_from_row,
                )
                .optional()?)
        })
    }

    // -- Reviews --

    pub fn insert_review(&self, review: &ReviewRow) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reviews (id, user_id, anime_id, date, rating, text, image, name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    review.id,
                    review.user_id,
                    review.anime_id,
                    review.date,
                    review.rating,
                    review.text,
                    review.image,
                    review.name,
                ],
            )?;
            Ok(())
        })
    }

    pub fn list_reviews(&self) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {REVIEW_COLUMNS} FROM reviews ORDER BY rowid"))?;
            let rows = stmt
                .query_map([], review_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_reviews_by_anime(&self, anime_id: &str) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {REVIEW_COLUMNS} FROM reviews WHERE anime_id = ?1 ORDER BY rowid"
            ))?;
            let rows = stmt
                .query_map([anime_id], review_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_review_by_id(&self, id: &str) -> Result<Option<ReviewRow>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = ?1"),
                    [id],
                    review_from_row,
                )
                .optional()?)
        })
    }

    /// Replace only the review text. `None` when no review has this id.
    pub fn update_review_text(&self, id: &str, text: &str) -> Result<Option<ReviewRow>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!("UPDATE reviews SET text = ?2 WHERE id = ?1 RETURNING {REVIEW_COLUMNS}"),
                    [id, text],
                    review_from_row,
                )
                .optional()?)
        })
    }

    /// Apply the given changes. `None` when no review has this id.
    pub fn update_review(&self, id: &str, changes: &ReviewChanges) -> Result<Option<ReviewRow>> {
        self.with_conn(|conn| {
            Ok(conn
                .query_row(
                    &format!(
                        "UPDATE reviews SET
                             anime_id = COALESCE(?2, anime_id),
                             date = COALESCE(?3, date),
                             rating = COALESCE(?4, rating),
                             text = COALESCE(?5, text)
                         WHERE id = ?1
                         RETURNING {REVIEW_COLUMNS}"
                    ),
                    rusqlite::params![id, changes.anime_id, changes.date, changes.rating, changes.text],
                    review_from_row,
                )
                .optional()?)
        })
    }

    /// Returns whether a row was removed. Deleting an unknown id is not an error.
    pub fn delete_review(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM reviews WHERE id = ?1", [id])?;
            Ok(removed > 0)
        })
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        user_email: row.get(1)?,
        last_login: row.get(2)?,
        name: row.get(3)?,
        img: row.get(4)?,
    })
}

fn anime_from_row(row: &Row<'_>) -> rusqlite::Result<AnimeRow> {
    Ok(AnimeRow {
        id: row.get(0)?,
        name: row.get(1)?,
        image_url: row.get(2)?,
        description: row.get(3)?,
    })
}

fn review_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        anime_id: row.get(2)?,
        date: row.get(3)?,
        rating: row.get(4)?,
        text: row.get(5)?,
        image: row.get(6)?,
        name: row.get(7)?,
    })
}

fn query_by_ids<T>(
    conn: &Connection,
    table: &str,
    columns: &str,
    ids: &[String],
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "SELECT {} FROM {} WHERE id IN ({})",
        columns,
        table,
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::types::ToSql> = ids
        .iter()
        .map(|id| id as &dyn rusqlite::types::ToSql)
        .collect();

    let rows = stmt
        .query_map(params.as_slice(), map)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
