use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The editable fields of a post form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Content,
    Slug,
    Image,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Content => "content",
            Field::Slug => "slug",
            Field::Image => "image",
        }
    }
}

/// Current values of the post form. `slug` is derived from `title` while the
/// title is the field being edited; `image` is a local file selected for
/// upload, absent when the user keeps the existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub image: Option<PathBuf>,
}

/// A post as persisted by the remote record store. Passed in as an immutable
/// snapshot when editing; returned with authoritative ids and timestamps
/// after every successful create or update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub featured_image_id: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a post. The featured image must already be uploaded.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub featured_image_id: String,
    pub author_id: String,
}

/// Payload for updating a post. `featured_image_id` of `None` means
/// "unchanged" and is omitted from the wire payload entirely.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    pub title: String,
    pub content: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image_id: Option<String>,
}

/// Handle to a file held by the remote file store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredFile {
    pub id: String,
}
