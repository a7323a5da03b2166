use std::path::Path;

use anyhow::Context;
use futures::stream::{self, StreamExt};

use crate::db::Repository;
use crate::error::Result;
use crate::models::Article;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListOrder {
    Latest,
    Popular,
    Slideshow,
}

/// Creates every article in a JSON array file. Returns how many were stored.
///
/// Each article gets a fresh uid; failures are logged and skipped.
pub async fn import_articles(repo: &Repository, path: &Path) -> Result<usize> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let articles: Vec<Article> = serde_json::from_str(&content)?;
    let total = articles.len();

    let created = stream::iter(articles)
        .map(|article| async move {
            let title = article.title.clone();
            match repo.create_article(article).await {
                Ok(uid) => Some(uid),
                Err(e) => {
                    tracing::warn!("Failed to import {:?}: {}", title, e);
                    None
                }
            }
        })
        .buffer_unordered(5) // Max 5 concurrent inserts
        .filter_map(|r| async { r })
        .count()
        .await;

    tracing::info!(created, total, "import finished");
    Ok(created)
}

/// Writes every article, newest first, as pretty JSON. Returns how many were written.
pub async fn export_articles(repo: &Repository, path: &Path) -> Result<usize> {
    let articles = repo.get_articles().await?;
    let json = serde_json::to_string_pretty(&articles)?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(articles.len())
}

/// Articles in the requested order, optionally narrowed to one tag.
pub async fn list_articles(
    repo: &Repository,
    order: ListOrder,
    tag: Option<&str>,
) -> Result<Vec<Article>> {
    let Some(tag) = tag else {
        return Ok(match order {
            ListOrder::Latest => repo.get_articles().await?,
            ListOrder::Popular => repo.get_articles_by_good_count().await?,
            ListOrder::Slideshow => repo.get_slide_show_articles().await?,
        });
    };

    // tag results come back newest first
    let mut articles = repo.get_articles_by_tag(tag).await?;
    match order {
        ListOrder::Latest => {}
        ListOrder::Popular => articles.sort_by(|a, b| b.good_count.cmp(&a.good_count)),
        ListOrder::Slideshow => articles.retain(|a| a.is_add_slide_show),
    }
    Ok(articles)
}

pub fn format_article_line(article: &Article) -> String {
    let tags = if article.tag_ids.is_empty() {
        String::new()
    } else {
        format!("  #{}", article.tag_ids.join(" #"))
    };
    format!(
        "{}  {}  {:>4} likes  {}{}",
        article.date.format("%Y-%m-%d"),
        article.uid,
        article.good_count,
        article.title,
        tags
    )
}
