use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::actions::{self, ArticleAction, ArticleRequest, ArticleResponse, RequestKind};
use crate::config::Config;
use crate::db::Repository;
use crate::editor::{Editor, EnterOutcome};
use crate::error::Result;
use crate::models::{Article, FlashKind, FlashMessage};
use crate::store::{ArticleReducer, ArticleState, FlashAction, FlashReducer, FlashState, Reducer};
use crate::tui::{AppAction, InputMode};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Latest,
    Popular,
    SlideShow,
    Tag(String),
    /// Admin listing of every article.
    All,
}

impl View {
    pub fn label(&self) -> String {
        match self {
            View::Latest => "Latest".to_string(),
            View::Popular => "Popular".to_string(),
            View::SlideShow => "Slideshow".to_string(),
            View::Tag(tag) => format!("Tag: {tag}"),
            View::All => "All articles".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail,
    Editor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
    TagFilter(String),
    ConfirmDelete(String),
}

// Message for a finished background request
struct Completed {
    seq: u64,
    kind: RequestKind,
    action: ArticleAction,
}

pub struct App {
    // State
    pub articles: ArticleState,
    pub flash: FlashState,

    // UI State
    pub view: View,
    pub screen: Screen,
    pub popup: Popup,
    pub selected_index: usize,
    pub editor: Option<Editor>,
    pub is_admin: bool,
    liked: HashSet<String>,
    /// Like requests still in flight, by sequence number.
    pending_likes: HashMap<u64, String>,
    spinner_frame: usize,

    // Settings
    page_size: u32,
    flash_ttl: Duration,

    // Async state
    next_seq: u64,
    in_flight: usize,
    latest_read: HashMap<RequestKind, u64>,
    result_rx: mpsc::Receiver<Completed>,
    result_tx: mpsc::Sender<Completed>,

    // Services
    pub repository: Repository,
}

impl App {
    pub async fn new(config: &Config, is_admin: bool) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let mut app = Self::with_repository(repository, config, is_admin);
        app.reload();
        Ok(app)
    }

    fn with_repository(repository: Repository, config: &Config, is_admin: bool) -> Self {
        let (result_tx, result_rx) = mpsc::channel(32);
        Self {
            articles: ArticleState::default(),
            flash: FlashState::default(),
            view: View::Latest,
            screen: Screen::List,
            popup: Popup::None,
            selected_index: 0,
            editor: None,
            is_admin,
            liked: HashSet::new(),
            pending_likes: HashMap::new(),
            spinner_frame: 0,
            page_size: config.page_size,
            flash_ttl: Duration::from_secs(config.flash_ttl_seconds),
            next_seq: 0,
            in_flight: 0,
            latest_read: HashMap::new(),
            result_rx,
            result_tx,
            repository,
        }
    }

    pub fn input_mode(&self) -> InputMode {
        match (&self.popup, self.screen) {
            (Popup::Help, _) => InputMode::Help,
            (Popup::TagFilter(_), _) => InputMode::Prompt,
            (Popup::ConfirmDelete(_), _) => InputMode::Confirm,
            (Popup::None, Screen::Editor) => InputMode::Editor,
            (Popup::None, Screen::Detail) => InputMode::Detail,
            (Popup::None, Screen::List) => InputMode::List,
        }
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.articles.articles.get(self.selected_index)
    }

    /// The article the user is looking at: the open one in detail, else the selection.
    fn focused_article(&self) -> Option<&Article> {
        match self.screen {
            Screen::Detail => self.articles.current.as_ref(),
            _ => self.selected_article(),
        }
    }

    pub fn is_liked(&self, uid: &str) -> bool {
        self.liked.contains(uid)
    }

    /// Whether any request is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    /// Advance spinner animation and drop expired flash messages.
    pub fn tick(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        self.reduce_flash(FlashAction::Expire(Instant::now()));
    }

    fn reduce_articles(&mut self, action: ArticleAction) {
        let state = std::mem::take(&mut self.articles);
        self.articles = ArticleReducer::reduce(state, action);
    }

    fn reduce_flash(&mut self, action: FlashAction) {
        let state = std::mem::take(&mut self.flash);
        self.flash = FlashReducer::reduce(state, action);
    }

    fn flash_message(&mut self, kind: FlashKind, message: impl Into<String>) {
        let message = FlashMessage::new(kind, message, self.flash_ttl);
        self.reduce_flash(FlashAction::Add(message));
    }

    /// Draft failures never abort the session; the form keeps its content.
    fn report_draft_error(&mut self, result: Result<()>) {
        if let Err(e) = result {
            tracing::warn!(error = %e, "draft store failed");
            self.flash_message(FlashKind::Error, format!("Draft not saved: {e}"));
        }
    }

    /// Starts `request` on a background task; the result arrives through `poll_results`.
    pub fn dispatch(&mut self, request: ArticleRequest) {
        let kind = request.kind();
        self.next_seq += 1;
        self.in_flight += 1;
        let seq = self.next_seq;
        if kind.is_read() {
            self.latest_read.insert(kind, seq);
        }
        if let ArticleRequest::ChangeGoodCount { uid, .. } = &request {
            self.pending_likes.insert(seq, uid.clone());
        }
        self.reduce_articles(ArticleAction::Start(kind));

        let repository = self.repository.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let action = actions::perform(&repository, request).await;
            let _ = tx.send(Completed { seq, kind, action }).await;
        });
    }

    /// Poll for completed requests (non-blocking)
    pub async fn poll_results(&mut self) {
        while let Ok(completed) = self.result_rx.try_recv() {
            self.apply_completed(completed).await;
        }
    }

    async fn apply_completed(&mut self, completed: Completed) {
        let Completed { seq, kind, action } = completed;
        self.in_flight = self.in_flight.saturating_sub(1);
        self.pending_likes.remove(&seq);

        // Only the newest read of each kind may land; older ones were superseded
        if kind.is_read() && self.latest_read.get(&kind) != Some(&seq) {
            tracing::debug!(?kind, seq, "dropping superseded result");
            return;
        }

        if let Some(message) = actions::flash_for(&action, self.flash_ttl) {
            self.reduce_flash(FlashAction::Add(message));
        }

        let mut reload = false;
        if let ArticleAction::Success(response) = &action {
            match response {
                ArticleResponse::Created(uid) => {
                    tracing::info!(%uid, "article created");
                    if let Some(editor) = self.editor.as_mut().filter(|e| e.is_create()) {
                        let cleared = editor.reset().await;
                        self.report_draft_error(cleared);
                    }
                    reload = true;
                }
                ArticleResponse::Updated(uid) => {
                    tracing::info!(%uid, "article updated");
                    if let Some(editor) = self.editor.take() {
                        let cleared = editor.discard_draft().await;
                        self.report_draft_error(cleared);
                    }
                    self.screen = Screen::List;
                    self.view = View::All;
                    reload = true;
                }
                ArticleResponse::Deleted(uid) => {
                    tracing::info!(%uid, "article deleted");
                    self.editor = None;
                    self.screen = Screen::List;
                }
                ArticleResponse::GoodCount { uid, liked, .. } => {
                    if *liked {
                        self.liked.insert(uid.clone());
                    } else {
                        self.liked.remove(uid);
                    }
                }
                ArticleResponse::Detail { article: None, .. } => {
                    self.screen = Screen::List;
                }
                _ => {}
            }
        }

        self.reduce_articles(action);
        self.clamp_selection();
        if reload {
            self.reload();
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.articles.articles.len();
        if len == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= len {
            self.selected_index = len - 1;
        }
    }

    /// Re-runs the query behind the current view.
    pub fn reload(&mut self) {
        let request = match &self.view {
            View::Latest => ArticleRequest::FetchLatest {
                before: None,
                limit: self.page_size,
            },
            View::Popular => ArticleRequest::FetchPopular,
            View::SlideShow => ArticleRequest::FetchSlideShow,
            View::Tag(tag) => ArticleRequest::FetchByTag(tag.clone()),
            View::All => ArticleRequest::FetchAll,
        };
        self.dispatch(request);
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.screen = Screen::List;
        self.selected_index = 0;
        self.reload();
    }

    fn require_admin(&mut self) -> bool {
        if !self.is_admin {
            self.flash_message(FlashKind::Error, "Admin mode required (start with --admin)");
        }
        self.is_admin
    }

    pub async fn handle_action(&mut self, action: AppAction) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                let len = self.articles.articles.len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            AppAction::MoveToTop => self.selected_index = 0,

            AppAction::MoveToBottom => {
                self.selected_index = self.articles.articles.len().saturating_sub(1);
            }

            AppAction::OpenArticle => {
                if let Some(uid) = self.selected_article().map(|a| a.uid.clone()) {
                    self.screen = Screen::Detail;
                    self.dispatch(ArticleRequest::FetchDetail(uid));
                }
            }

            AppAction::Back => self.screen = Screen::List,

            AppAction::ShowLatest => self.switch_view(View::Latest),
            AppAction::ShowPopular => self.switch_view(View::Popular),
            AppAction::ShowSlideShow => self.switch_view(View::SlideShow),
            AppAction::ShowAll => {
                if self.require_admin() {
                    self.switch_view(View::All);
                }
            }

            AppAction::LoadMore => {
                if self.view == View::Latest && self.articles.has_more && !self.articles.is_loading {
                    self.dispatch(ArticleRequest::FetchLatest {
                        before: self.articles.cursor(),
                        limit: self.page_size,
                    });
                }
            }

            AppAction::Reload => self.reload(),

            AppAction::ToggleLike => {
                if let Some(uid) = self.focused_article().map(|a| a.uid.clone()) {
                    // the liked set only settles once the pending request lands
                    if self.pending_likes.values().any(|pending| *pending == uid) {
                        return Ok(false);
                    }
                    let is_done = self.is_liked(&uid);
                    self.dispatch(ArticleRequest::ChangeGoodCount { uid, is_done });
                }
            }

            AppAction::OpenThumbnail => {
                if let Some(path) = self.focused_article().map(|a| a.thumbnail_image_path.clone()) {
                    if let Err(e) = open::that(&path) {
                        tracing::warn!("Failed to open {}: {}", path, e);
                        self.flash_message(FlashKind::Error, format!("Could not open {path}"));
                    }
                }
            }

            AppAction::PrevArticle => {
                if let Some(uid) = self.articles.prev.as_ref().map(|a| a.uid.clone()) {
                    self.dispatch(ArticleRequest::FetchDetail(uid));
                }
            }

            AppAction::NextArticle => {
                if let Some(uid) = self.articles.next.as_ref().map(|a| a.uid.clone()) {
                    self.dispatch(ArticleRequest::FetchDetail(uid));
                }
            }

            AppAction::NewArticle => {
                if self.require_admin() {
                    let editor = Editor::create(self.repository.drafts());
                    self.open_editor(editor).await;
                }
            }

            AppAction::EditArticle => {
                if self.require_admin() {
                    if let Some(article) = self.focused_article().cloned() {
                        let editor = Editor::edit(article, self.repository.drafts());
                        self.open_editor(editor).await;
                    }
                }
            }

            AppAction::DeleteArticle => {
                if self.require_admin() {
                    if let Some(uid) = self.focused_article().map(|a| a.uid.clone()) {
                        self.popup = Popup::ConfirmDelete(uid);
                    }
                }
            }

            AppAction::ShowHelp => self.popup = Popup::Help,
            AppAction::HideHelp => self.popup = Popup::None,

            AppAction::FilterByTagStart => {
                let prefill = match self.screen {
                    Screen::Detail => self
                        .articles
                        .current
                        .as_ref()
                        .and_then(|a| a.tag_ids.first().cloned())
                        .unwrap_or_default(),
                    _ => String::new(),
                };
                self.popup = Popup::TagFilter(prefill);
            }

            AppAction::PromptChar(c) => {
                if let Popup::TagFilter(input) = &mut self.popup {
                    input.push(c);
                }
            }

            AppAction::PromptBackspace => {
                if let Popup::TagFilter(input) = &mut self.popup {
                    input.pop();
                }
            }

            AppAction::PromptConfirm => {
                if let Popup::TagFilter(input) = std::mem::replace(&mut self.popup, Popup::None) {
                    let tag = input.trim().to_string();
                    if tag.is_empty() {
                        self.switch_view(View::Latest);
                    } else {
                        self.switch_view(View::Tag(tag));
                    }
                }
            }

            AppAction::PromptCancel => self.popup = Popup::None,

            AppAction::ConfirmYes => {
                if let Popup::ConfirmDelete(uid) = std::mem::replace(&mut self.popup, Popup::None) {
                    self.dispatch(ArticleRequest::Delete(uid));
                }
            }

            AppAction::ConfirmNo => self.popup = Popup::None,

            AppAction::FieldNext => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.focus_next();
                }
            }

            AppAction::FieldPrev => {
                if let Some(editor) = self.editor.as_mut() {
                    editor.focus_prev();
                }
            }

            AppAction::EditorChar(c) => {
                if let Some(editor) = self.editor.as_mut() {
                    let saved = editor.input_char(c).await;
                    self.report_draft_error(saved);
                }
            }

            AppAction::EditorBackspace => {
                if let Some(editor) = self.editor.as_mut() {
                    let saved = editor.backspace().await;
                    self.report_draft_error(saved);
                }
            }

            AppAction::EditorEnter => {
                let outcome = match self.editor.as_mut() {
                    Some(editor) => editor.enter().await,
                    None => Ok(EnterOutcome::Handled),
                };
                let outcome = outcome.unwrap_or_else(|e| {
                    self.report_draft_error(Err(e));
                    EnterOutcome::Handled
                });
                match outcome {
                    EnterOutcome::Handled => {}
                    EnterOutcome::Submit => self.submit_editor(),
                    EnterOutcome::Delete(uid) => self.popup = Popup::ConfirmDelete(uid),
                }
            }

            AppAction::EditorSubmit => self.submit_editor(),

            AppAction::EditorCancel => {
                self.editor = None;
                self.screen = Screen::List;
            }
        }

        Ok(false)
    }

    async fn open_editor(&mut self, mut editor: Editor) {
        let restored = editor.restore_draft().await;
        self.report_draft_error(restored);
        self.editor = Some(editor);
        self.screen = Screen::Editor;
    }

    fn submit_editor(&mut self) {
        let request = match self.editor.as_ref() {
            Some(editor) => editor.submit_request(),
            None => return,
        };
        match request {
            Some(request) => self.dispatch(request),
            None => self.flash_message(FlashKind::Info, "Fill in every required field first"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DraftKey;
    use crate::editor::Field;
    use crate::models::sample_article;
    use chrono::{TimeZone, Utc};

    fn config() -> Config {
        Config {
            db_path: ":memory:".to_string(),
            page_size: 2,
            flash_ttl_seconds: 5,
            log_file: None,
        }
    }

    async fn app_with(days: &[u32], is_admin: bool) -> (App, Vec<String>) {
        let repo = Repository::open_in_memory().await.unwrap();
        let mut uids = Vec::new();
        for &d in days {
            let date = Utc.with_ymd_and_hms(2024, 4, d, 8, 0, 0).unwrap();
            uids.push(repo.create_article(sample_article(&format!("Day {d}"), date)).await.unwrap());
        }
        (App::with_repository(repo, &config(), is_admin), uids)
    }

    /// Waits for every outstanding request to come back and applies it.
    async fn settle(app: &mut App) {
        while app.is_busy() {
            let completed = tokio::time::timeout(Duration::from_secs(5), app.result_rx.recv())
                .await
                .expect("request finished")
                .expect("channel open");
            app.apply_completed(completed).await;
        }
    }

    #[tokio::test]
    async fn latest_view_pages_through_articles() {
        let (mut app, _) = app_with(&[1, 2, 3], false).await;
        app.reload();
        settle(&mut app).await;
        assert_eq!(app.articles.articles.len(), 2);
        assert!(app.articles.has_more);

        app.handle_action(AppAction::LoadMore).await.unwrap();
        settle(&mut app).await;
        assert_eq!(app.articles.articles.len(), 3);
        assert!(!app.articles.has_more);
        assert!(!app.articles.is_loading);
    }

    #[tokio::test]
    async fn like_toggles_per_session() {
        let (mut app, uids) = app_with(&[1], false).await;
        app.reload();
        settle(&mut app).await;

        app.handle_action(AppAction::ToggleLike).await.unwrap();
        settle(&mut app).await;
        assert!(app.is_liked(&uids[0]));
        assert_eq!(app.articles.articles[0].good_count, 1);

        app.handle_action(AppAction::ToggleLike).await.unwrap();
        settle(&mut app).await;
        assert!(!app.is_liked(&uids[0]));
        assert_eq!(app.articles.articles[0].good_count, 0);
    }

    #[tokio::test]
    async fn readers_cannot_open_the_editor() {
        let (mut app, _) = app_with(&[1], false).await;
        app.handle_action(AppAction::NewArticle).await.unwrap();

        assert!(app.editor.is_none());
        assert_eq!(app.screen, Screen::List);
        assert_eq!(app.flash.messages.len(), 1);
        assert_eq!(app.flash.messages[0].kind, FlashKind::Error);
    }

    #[tokio::test]
    async fn delete_asks_for_confirmation_first() {
        let (mut app, uids) = app_with(&[1, 2], true).await;
        app.reload();
        settle(&mut app).await;

        app.handle_action(AppAction::DeleteArticle).await.unwrap();
        assert_eq!(app.input_mode(), InputMode::Confirm);
        app.handle_action(AppAction::ConfirmNo).await.unwrap();
        assert_eq!(app.articles.articles.len(), 2);

        app.handle_action(AppAction::DeleteArticle).await.unwrap();
        app.handle_action(AppAction::ConfirmYes).await.unwrap();
        settle(&mut app).await;
        assert_eq!(app.articles.articles.len(), 1);
        assert!(app.repository.get_article(&uids[1]).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn detail_walks_to_neighbours() {
        let (mut app, uids) = app_with(&[1, 2, 3], false).await;
        app.reload();
        settle(&mut app).await;

        // newest first, so index 1 is day 2
        app.selected_index = 1;
        app.handle_action(AppAction::OpenArticle).await.unwrap();
        settle(&mut app).await;
        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(app.articles.current.as_ref().unwrap().uid, uids[1]);

        app.handle_action(AppAction::PrevArticle).await.unwrap();
        settle(&mut app).await;
        assert_eq!(app.articles.current.as_ref().unwrap().uid, uids[0]);
        assert!(app.articles.prev.is_none());

        app.handle_action(AppAction::NextArticle).await.unwrap();
        settle(&mut app).await;
        assert_eq!(app.articles.current.as_ref().unwrap().uid, uids[1]);
    }

    #[tokio::test]
    async fn superseded_reads_are_dropped() {
        let (mut app, _) = app_with(&[1, 2, 3], false).await;
        app.switch_view(View::Popular);
        app.switch_view(View::SlideShow);
        settle(&mut app).await;

        // only the slideshow result lands, and nothing is flagged for it
        assert_eq!(app.view, View::SlideShow);
        assert!(app.articles.articles.is_empty());
    }

    #[tokio::test]
    async fn tag_prompt_switches_view() {
        let (mut app, _) = app_with(&[1], false).await;
        app.handle_action(AppAction::FilterByTagStart).await.unwrap();
        for c in "rust".chars() {
            app.handle_action(AppAction::PromptChar(c)).await.unwrap();
        }
        app.handle_action(AppAction::PromptConfirm).await.unwrap();
        settle(&mut app).await;

        assert_eq!(app.view, View::Tag("rust".into()));
        assert_eq!(app.popup, Popup::None);
        assert!(app.articles.articles.is_empty());
    }

    #[tokio::test]
    async fn incomplete_form_is_not_submitted() {
        let (mut app, _) = app_with(&[], true).await;
        app.handle_action(AppAction::NewArticle).await.unwrap();
        app.handle_action(AppAction::EditorSubmit).await.unwrap();

        assert_eq!(app.next_seq, 0);
        assert_eq!(app.flash.messages[0].kind, FlashKind::Info);
    }

    fn fill_editor(app: &mut App, title: &str, day: &str) {
        let editor = app.editor.as_mut().expect("editor open");
        editor.title = title.into();
        editor.sub_title = format!("{title} subtitle");
        editor.thumbnail_image_path = "p.png".into();
        editor.date_input = day.into();
        if editor.content.is_empty() {
            editor.content = "Body".into();
        }
    }

    async fn type_into_content(app: &mut App, text: &str) {
        app.editor.as_mut().expect("editor open").focus = Field::Content;
        for c in text.chars() {
            app.handle_action(AppAction::EditorChar(c)).await.unwrap();
        }
    }

    #[tokio::test]
    async fn create_resets_the_form_and_clears_its_draft() {
        let (mut app, _) = app_with(&[], true).await;
        app.handle_action(AppAction::NewArticle).await.unwrap();
        type_into_content(&mut app, "Draft body").await;
        assert_eq!(
            app.repository.drafts().load(&DraftKey::New).await.unwrap().as_deref(),
            Some("Draft body")
        );

        fill_editor(&mut app, "Fresh", "2024-02-01");
        app.handle_action(AppAction::EditorSubmit).await.unwrap();
        settle(&mut app).await;

        let editor = app.editor.as_ref().expect("create form stays open");
        assert!(editor.is_create());
        assert!(editor.title.is_empty());
        assert!(editor.content.is_empty());
        assert_eq!(app.screen, Screen::Editor);
        assert_eq!(app.repository.drafts().load(&DraftKey::New).await.unwrap(), None);
        assert!(app.flash.messages.iter().any(|m| m.kind == FlashKind::Success));

        let stored = app.repository.get_articles().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].content, "Draft body");
    }

    #[tokio::test]
    async fn update_discards_draft_and_returns_to_admin_list() {
        let (mut app, uids) = app_with(&[1], true).await;
        app.reload();
        settle(&mut app).await;

        app.handle_action(AppAction::EditArticle).await.unwrap();
        type_into_content(&mut app, "!").await;
        let key = DraftKey::Article(uids[0].clone());
        assert!(app.repository.drafts().load(&key).await.unwrap().is_some());

        app.editor.as_mut().unwrap().title = "Renamed".into();
        app.handle_action(AppAction::EditorSubmit).await.unwrap();
        settle(&mut app).await;

        assert!(app.editor.is_none());
        assert_eq!(app.screen, Screen::List);
        assert_eq!(app.view, View::All);
        assert_eq!(app.repository.drafts().load(&key).await.unwrap(), None);
        assert_eq!(app.articles.articles.len(), 1);
        assert_eq!(app.articles.articles[0].title, "Renamed");
        assert!(app.articles.articles[0].content.ends_with('!'));
    }

    #[tokio::test]
    async fn draft_failures_become_flash_messages() {
        let (mut app, _) = app_with(&[], true).await;
        app.handle_action(AppAction::NewArticle).await.unwrap();
        app.repository.execute_batch("DROP TABLE drafts").await.unwrap();

        type_into_content(&mut app, "x").await;

        assert_eq!(app.editor.as_ref().unwrap().content, "x");
        assert_eq!(app.flash.messages.len(), 1);
        assert_eq!(app.flash.messages[0].kind, FlashKind::Error);
    }

    #[tokio::test]
    async fn same_day_articles_stay_reachable() {
        let (mut app, _) = app_with(&[], true).await;
        app.handle_action(AppAction::NewArticle).await.unwrap();
        for i in 0..5 {
            // each reset of the form takes a new time of day
            tokio::time::sleep(Duration::from_millis(5)).await;
            fill_editor(&mut app, &format!("Same day {i}"), "2024-01-10");
            app.handle_action(AppAction::EditorSubmit).await.unwrap();
            settle(&mut app).await;
        }
        app.handle_action(AppAction::EditorCancel).await.unwrap();
        app.reload();
        settle(&mut app).await;
        assert_eq!(app.articles.articles.len(), 2);

        while app.articles.has_more {
            app.handle_action(AppAction::LoadMore).await.unwrap();
            settle(&mut app).await;
        }
        assert_eq!(app.articles.articles.len(), 5);

        let middle = app.articles.articles[2].clone();
        let prev = app.repository.get_prev_article(middle.date).await.unwrap();
        let next = app.repository.get_next_article(middle.date).await.unwrap();
        assert_eq!(prev.unwrap().uid, app.articles.articles[3].uid);
        assert_eq!(next.unwrap().uid, app.articles.articles[1].uid);
    }

    #[tokio::test]
    async fn repeated_like_waits_for_the_pending_one() {
        let (mut app, uids) = app_with(&[1], false).await;
        app.reload();
        settle(&mut app).await;

        app.handle_action(AppAction::ToggleLike).await.unwrap();
        app.handle_action(AppAction::ToggleLike).await.unwrap();
        settle(&mut app).await;

        assert!(app.is_liked(&uids[0]));
        let stored = app.repository.get_article(&uids[0]).await.unwrap().unwrap();
        assert_eq!(stored.good_count, 1);
    }
}
