use chrono::{DateTime, Utc};

use crate::actions::{ArticleAction, ArticleResponse};
use crate::models::Article;

use super::Reducer;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArticleState {
    pub articles: Vec<Article>,
    pub current: Option<Article>,
    pub prev: Option<Article>,
    pub next: Option<Article>,
    pub is_loading: bool,
    /// Whether the latest view can load another page.
    pub has_more: bool,
    pub error: Option<String>,
}

impl ArticleState {
    /// Date of the oldest article held, used to request the next page.
    pub fn cursor(&self) -> Option<DateTime<Utc>> {
        self.articles.last().map(|a| a.date)
    }
}

pub struct ArticleReducer;

impl Reducer for ArticleReducer {
    type State = ArticleState;
    type Action = ArticleAction;

    fn reduce(state: ArticleState, action: ArticleAction) -> ArticleState {
        match action {
            ArticleAction::Start(_) => ArticleState {
                is_loading: true,
                error: None,
                ..state
            },
            ArticleAction::Failure { error, .. } => ArticleState {
                is_loading: false,
                error: Some(error),
                ..state
            },
            ArticleAction::Success(response) => {
                let state = ArticleState {
                    is_loading: false,
                    error: None,
                    ..state
                };
                apply_response(state, response)
            }
        }
    }
}

fn apply_response(mut state: ArticleState, response: ArticleResponse) -> ArticleState {
    match response {
        ArticleResponse::List(articles) => {
            state.articles = articles;
            state.has_more = false;
        }
        ArticleResponse::Page {
            articles,
            append,
            page_size,
        } => {
            state.has_more = articles.len() >= page_size as usize;
            if append {
                state.articles.extend(articles);
            } else {
                state.articles = articles;
            }
        }
        ArticleResponse::Detail {
            article,
            prev,
            next,
        } => {
            state.current = article;
            state.prev = prev;
            state.next = next;
        }
        ArticleResponse::Deleted(uid) => {
            state.articles.retain(|a| a.uid != uid);
            for slot in [&mut state.current, &mut state.prev, &mut state.next] {
                if matches!(slot, Some(a) if a.uid == uid) {
                    *slot = None;
                }
            }
        }
        ArticleResponse::GoodCount { uid, count, .. } => {
            let held = state
                .articles
                .iter_mut()
                .chain(state.current.iter_mut())
                .chain(state.prev.iter_mut())
                .chain(state.next.iter_mut());
            for article in held.filter(|a| a.uid == uid) {
                article.good_count = count;
            }
        }
        // The caller reloads the view after a write.
        ArticleResponse::Created(_) | ArticleResponse::Updated(_) => {}
    }
    state
}
