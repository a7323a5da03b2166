//! Facade calls modelled as start / success / failure actions.
//!
//! The event loop dispatches an [`ArticleRequest`], the reducer sees
//! `ArticleAction::Start`, and [`perform`] later yields the matching success
//! or failure action from a background task.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::db::Repository;
use crate::error::Result;
use crate::models::{Article, FlashKind, FlashMessage};

#[derive(Debug, Clone, PartialEq)]
pub enum ArticleRequest {
    Create(Article),
    Update(Article),
    Delete(String),
    ChangeGoodCount { uid: String, is_done: bool },
    FetchAll,
    FetchLatest {
        before: Option<DateTime<Utc>>,
        limit: u32,
    },
    FetchPopular,
    FetchSlideShow,
    FetchByTag(String),
    /// An article together with its older and newer neighbours.
    FetchDetail(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Create,
    Update,
    Delete,
    Like,
    List,
    Detail,
}

impl RequestKind {
    pub fn is_read(self) -> bool {
        matches!(self, RequestKind::List | RequestKind::Detail)
    }

    pub fn label(self) -> &'static str {
        match self {
            RequestKind::Create => "Creating the article",
            RequestKind::Update => "Updating the article",
            RequestKind::Delete => "Deleting the article",
            RequestKind::Like => "Updating the like",
            RequestKind::List => "Loading articles",
            RequestKind::Detail => "Loading the article",
        }
    }
}

impl ArticleRequest {
    pub fn kind(&self) -> RequestKind {
        match self {
            ArticleRequest::Create(_) => RequestKind::Create,
            ArticleRequest::Update(_) => RequestKind::Update,
            ArticleRequest::Delete(_) => RequestKind::Delete,
            ArticleRequest::ChangeGoodCount { .. } => RequestKind::Like,
            ArticleRequest::FetchAll
            | ArticleRequest::FetchLatest { .. }
            | ArticleRequest::FetchPopular
            | ArticleRequest::FetchSlideShow
            | ArticleRequest::FetchByTag(_) => RequestKind::List,
            ArticleRequest::FetchDetail(_) => RequestKind::Detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArticleResponse {
    Created(String),
    Updated(String),
    Deleted(String),
    GoodCount {
        uid: String,
        count: i64,
        /// Whether the reader likes the article after this change.
        liked: bool,
    },
    List(Vec<Article>),
    Page {
        articles: Vec<Article>,
        append: bool,
        page_size: u32,
    },
    Detail {
        article: Option<Article>,
        prev: Option<Article>,
        next: Option<Article>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArticleAction {
    Start(RequestKind),
    Success(ArticleResponse),
    Failure { kind: RequestKind, error: String },
}

/// Runs `request` against the repository. Errors come back as a failure action.
pub async fn perform(repo: &Repository, request: ArticleRequest) -> ArticleAction {
    let kind = request.kind();
    match execute(repo, request).await {
        Ok(response) => ArticleAction::Success(response),
        Err(e) => {
            tracing::warn!(?kind, error = %e, "article request failed");
            ArticleAction::Failure {
                kind,
                error: e.to_string(),
            }
        }
    }
}

async fn execute(repo: &Repository, request: ArticleRequest) -> Result<ArticleResponse> {
    let response = match request {
        ArticleRequest::Create(article) => ArticleResponse::Created(repo.create_article(article).await?),
        ArticleRequest::Update(article) => {
            let uid = article.uid.clone();
            repo.update_article(article).await?;
            ArticleResponse::Updated(uid)
        }
        ArticleRequest::Delete(uid) => {
            repo.delete_article(&uid).await?;
            ArticleResponse::Deleted(uid)
        }
        ArticleRequest::ChangeGoodCount { uid, is_done } => {
            let count = repo.change_good_count(&uid, is_done).await?;
            ArticleResponse::GoodCount {
                uid,
                count,
                liked: !is_done,
            }
        }
        ArticleRequest::FetchAll => ArticleResponse::List(repo.get_articles().await?),
        ArticleRequest::FetchLatest { before, limit } => ArticleResponse::Page {
            articles: repo.get_latest_articles(before, limit).await?,
            append: before.is_some(),
            page_size: limit,
        },
        ArticleRequest::FetchPopular => ArticleResponse::List(repo.get_articles_by_good_count().await?),
        ArticleRequest::FetchSlideShow => ArticleResponse::List(repo.get_slide_show_articles().await?),
        ArticleRequest::FetchByTag(tag_id) => ArticleResponse::List(repo.get_articles_by_tag(&tag_id).await?),
        ArticleRequest::FetchDetail(uid) => match repo.get_article(&uid).await? {
            Some(article) => ArticleResponse::Detail {
                prev: repo.get_prev_article(article.date).await?,
                next: repo.get_next_article(article.date).await?,
                article: Some(article),
            },
            None => ArticleResponse::Detail {
                article: None,
                prev: None,
                next: None,
            },
        },
    };
    Ok(response)
}

/// The flash message a completed action should raise, if any.
pub fn flash_for(action: &ArticleAction, ttl: Duration) -> Option<FlashMessage> {
    match action {
        ArticleAction::Success(ArticleResponse::Created(_)) => {
            Some(FlashMessage::new(FlashKind::Success, "Article created", ttl))
        }
        ArticleAction::Success(ArticleResponse::Updated(_)) => {
            Some(FlashMessage::new(FlashKind::Success, "Article updated", ttl))
        }
        ArticleAction::Success(ArticleResponse::Deleted(_)) => {
            Some(FlashMessage::new(FlashKind::Success, "Article deleted", ttl))
        }
        ArticleAction::Success(ArticleResponse::Detail { article: None, .. }) => {
            Some(FlashMessage::new(FlashKind::Info, "That article no longer exists", ttl))
        }
        ArticleAction::Failure { kind, error } => Some(FlashMessage::new(
            FlashKind::Error,
            format!("{} failed: {error}", kind.label()),
            ttl,
        )),
        _ => None,
    }
}
