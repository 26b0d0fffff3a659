/*
 * Responsibility
 * - Notes の request/response DTO
 * - NoteRow → NoteResponse の変換 (内部 PK "noteId" を外に出さない)
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::note_repo::NoteRow;
use crate::services::pagination::{IntoPublic, PaginationOptions, lenient_int};

pub const TITLE_REQUIRED: &str = "Title should not be empty";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteRole {
    Admin,
    #[default]
    User,
}

impl NoteRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub role: NoteRole,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
}

impl CreateNoteRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err(TITLE_REQUIRED);
        }
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err("tags cannot contain empty values");
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub role: Option<NoteRole>,
    pub tags: Option<Vec<String>>,
    // Tri-state:
    // - None: field missing (do not update)
    // - Some(None): null (set NULL)
    // - Some(Some(v)): set value
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category: Option<Option<String>>,
}

impl UpdateNoteRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err(TITLE_REQUIRED);
        }
        if let Some(tags) = &self.tags
            && tags.iter().any(|t| t.trim().is_empty())
        {
            return Err("tags cannot contain empty values");
        }
        Ok(())
    }
}

// Distinguish an explicit `null` from a missing field.
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// `GET /notes/tags?tags=a,b&page=&limit=`
#[derive(Debug, Default, Deserialize)]
pub struct TagsQuery {
    pub tags: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub limit: Option<i64>,
}

impl TagsQuery {
    pub fn tags(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }

    pub fn options(&self) -> PaginationOptions {
        PaginationOptions::new(self.page, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: Uuid,
    pub role: String,
    pub title: String,
    pub content: String,
    pub user: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IntoPublic for NoteRow {
    type Public = NoteResponse;

    fn into_public(self) -> NoteResponse {
        NoteResponse {
            id: self.public_id,
            role: self.role,
            title: self.title,
            content: self.content,
            user: self.user_email,
            tags: self.tags,
            category: self.category,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
