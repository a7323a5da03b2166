mod article;
mod flash;
mod tag;

pub use article::{Article, ValidationError, MAX_TAGS};
pub use flash::{FlashKind, FlashMessage};
pub use tag::{join_tags, normalize_tags, Tag};

#[cfg(test)]
pub(crate) use article::sample_article;
