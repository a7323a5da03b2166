mod drafts;
mod repository;
mod schema;

pub use drafts::{DraftKey, DraftStore};
pub use repository::Repository;
