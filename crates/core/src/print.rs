//! Print view-models: the gallery card and the insert payload produced by
//! the upload form.

use serde::{Deserialize, Serialize};

use crate::format::ModelFormat;
use crate::navigation::print_path;
use crate::types::{DbId, PrintId, Timestamp, UserId};

/// Image shown when a print has no preview.
pub const PLACEHOLDER_IMAGE_URL: &str = "/placeholder-model.png";

/// Status written for prints created through the upload form.
pub const STATUS_PUBLISHED: &str = "published";

/// A print joined with its category and author, as rendered in the gallery
/// grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintCard {
    pub id: PrintId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub preview_image_url: Option<String>,
    pub upvote_count: u64,
    pub view_count: u64,
    pub comment_count: u64,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub category_slug: Option<String>,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub created_at: Timestamp,
}

impl PrintCard {
    /// Preview image, or the placeholder when none was uploaded.
    pub fn image_url(&self) -> &str {
        match self.preview_image_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => PLACEHOLDER_IMAGE_URL,
        }
    }

    /// Name shown in the "by ..." footer.
    pub fn author_label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    /// Avatar fallback letter.
    pub fn avatar_initial(&self) -> Option<char> {
        self.display_name
            .as_deref()
            .and_then(|name| name.chars().next())
            .or_else(|| self.username.chars().next())
    }

    pub fn detail_path(&self) -> String {
        print_path(&self.id)
    }
}

/// Insert payload for the `prints` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPrint {
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub category_id: DbId,
    pub model_file_url: String,
    pub preview_image_url: String,
    pub file_format: ModelFormat,
    pub file_size_bytes: u64,
    pub material: Option<String>,
    pub print_time_hours: Option<f64>,
    pub layer_height_mm: Option<f64>,
    pub infill_percentage: Option<i32>,
    pub supports_required: bool,
    pub status: &'static str,
    pub published_at: Timestamp,
}

/// The part of an inserted `prints` row echoed back by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedPrint {
    pub id: PrintId,
}

/// Upload form category option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub slug: String,
}
