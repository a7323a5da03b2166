use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of tags an article may carry.
pub const MAX_TAGS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Assigned by the store on creation; empty until then.
    #[serde(default)]
    pub uid: String,
    pub title: String,
    pub sub_title: String,
    pub content: String,
    pub thumbnail_image_path: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    #[serde(default)]
    pub good_count: i64,
    #[serde(default)]
    pub is_add_slide_show: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("at most {MAX_TAGS} tags are allowed, got {0}")]
    TooManyTags(usize),
}

impl Article {
    /// Checks the fields an author must fill in before the article can be saved.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required = [
            ("title", &self.title),
            ("subtitle", &self.sub_title),
            ("content", &self.content),
            ("thumbnail image", &self.thumbnail_image_path),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        if self.tag_ids.len() > MAX_TAGS {
            return Err(ValidationError::TooManyTags(self.tag_ids.len()));
        }
        Ok(())
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tag_ids.iter().any(|t| t == tag_id)
    }
}

#[cfg(test)]
pub(crate) fn sample_article(title: &str, date: DateTime<Utc>) -> Article {
    Article {
        uid: String::new(),
        title: title.to_string(),
        sub_title: format!("{title} subtitle"),
        content: format!("# {title}\n\nBody of {title}."),
        thumbnail_image_path: format!("images/{}.png", title.to_lowercase()),
        date,
        tag_ids: Vec::new(),
        good_count: 0,
        is_add_slide_show: false,
    }
}
