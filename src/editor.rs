use chrono::{DateTime, NaiveDate, Utc};

use crate::actions::ArticleRequest;
use crate::db::{DraftKey, DraftStore};
use crate::error::Result;
use crate::models::{join_tags, normalize_tags, Article, Tag};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Tags,
    Title,
    SubTitle,
    Date,
    Thumbnail,
    SlideShow,
    Content,
    Submit,
    Delete,
}

const CREATE_FIELDS: &[Field] = &[
    Field::Tags,
    Field::Title,
    Field::SubTitle,
    Field::Date,
    Field::Thumbnail,
    Field::SlideShow,
    Field::Content,
    Field::Submit,
];

const EDIT_FIELDS: &[Field] = &[
    Field::Tags,
    Field::Title,
    Field::SubTitle,
    Field::Date,
    Field::Thumbnail,
    Field::SlideShow,
    Field::Content,
    Field::Submit,
    Field::Delete,
];

#[derive(Debug, Clone, PartialEq)]
pub enum EditorMode {
    Create,
    Edit(Article),
}

/// What Enter did on the focused field.
#[derive(Debug, Clone, PartialEq)]
pub enum EnterOutcome {
    Handled,
    Submit,
    Delete(String),
}

/// Local state of the create/edit form.
pub struct Editor {
    pub mode: EditorMode,
    pub focus: Field,
    pub tags_input: String,
    pub title: String,
    pub sub_title: String,
    pub date_input: String,
    pub thumbnail_image_path: String,
    pub content: String,
    pub is_add_slide_show: bool,
    /// Date the form started from; kept when the day is left unchanged.
    base_date: DateTime<Utc>,
    drafts: DraftStore,
}

impl Editor {
    pub fn create(drafts: DraftStore) -> Self {
        let now = Utc::now();
        Self {
            mode: EditorMode::Create,
            focus: Field::Tags,
            tags_input: String::new(),
            title: String::new(),
            sub_title: String::new(),
            date_input: now.format(DATE_FORMAT).to_string(),
            thumbnail_image_path: String::new(),
            content: String::new(),
            is_add_slide_show: false,
            base_date: now,
            drafts,
        }
    }

    pub fn edit(article: Article, drafts: DraftStore) -> Self {
        Self {
            focus: Field::Tags,
            tags_input: join_tags(&Tag::from_ids(&article.tag_ids)),
            title: article.title.clone(),
            sub_title: article.sub_title.clone(),
            date_input: article.date.format(DATE_FORMAT).to_string(),
            thumbnail_image_path: article.thumbnail_image_path.clone(),
            content: article.content.clone(),
            is_add_slide_show: article.is_add_slide_show,
            base_date: article.date,
            mode: EditorMode::Edit(article),
            drafts,
        }
    }

    /// Replaces the content with the unsaved draft for this form, if one exists.
    pub async fn restore_draft(&mut self) -> Result<()> {
        if let Some(draft) = self.drafts.load(&self.draft_key()).await? {
            tracing::info!(key = %self.draft_key().storage_key(), "restoring unsaved draft");
            self.content = draft;
        }
        Ok(())
    }

    pub fn is_create(&self) -> bool {
        matches!(self.mode, EditorMode::Create)
    }

    pub fn draft_key(&self) -> DraftKey {
        match &self.mode {
            EditorMode::Create => DraftKey::New,
            EditorMode::Edit(article) => DraftKey::Article(article.uid.clone()),
        }
    }

    fn fields(&self) -> &'static [Field] {
        if self.is_create() {
            CREATE_FIELDS
        } else {
            EDIT_FIELDS
        }
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_prev(&mut self) {
        let len = self.fields().len();
        self.move_focus(len - 1);
    }

    fn move_focus(&mut self, step: usize) {
        if self.focus == Field::Tags {
            self.commit_tags();
        }
        let fields = self.fields();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(index + step) % fields.len()];
    }

    /// Normalizes the tag text once the tag field loses focus.
    pub fn commit_tags(&mut self) {
        let ids = normalize_tags(&self.tags_input);
        self.tags_input = join_tags(&Tag::from_ids(&ids));
    }

    pub fn tag_ids(&self) -> Vec<String> {
        normalize_tags(&self.tags_input)
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            Field::Tags => Some(&mut self.tags_input),
            Field::Title => Some(&mut self.title),
            Field::SubTitle => Some(&mut self.sub_title),
            Field::Date => Some(&mut self.date_input),
            Field::Thumbnail => Some(&mut self.thumbnail_image_path),
            Field::Content => Some(&mut self.content),
            Field::SlideShow | Field::Submit | Field::Delete => None,
        }
    }

    pub async fn input_char(&mut self, c: char) -> Result<()> {
        if self.focus == Field::SlideShow {
            if c == ' ' {
                self.toggle_slide_show();
            }
            return Ok(());
        }
        if let Some(text) = self.focused_text() {
            text.push(c);
        }
        self.mirror_content().await
    }

    pub async fn backspace(&mut self) -> Result<()> {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
        self.mirror_content().await
    }

    pub async fn enter(&mut self) -> Result<EnterOutcome> {
        match self.focus {
            Field::Content => {
                self.content.push('\n');
                self.mirror_content().await?;
            }
            Field::SlideShow => self.toggle_slide_show(),
            Field::Submit => return Ok(EnterOutcome::Submit),
            Field::Delete => {
                if let EditorMode::Edit(article) = &self.mode {
                    return Ok(EnterOutcome::Delete(article.uid.clone()));
                }
            }
            _ => self.focus_next(),
        }
        Ok(EnterOutcome::Handled)
    }

    pub fn toggle_slide_show(&mut self) {
        self.is_add_slide_show = !self.is_add_slide_show;
    }

    async fn mirror_content(&self) -> Result<()> {
        if self.focus == Field::Content {
            self.drafts.save(&self.draft_key(), &self.content).await?;
        }
        Ok(())
    }

    /// The typed day at the time of day the form started from, so articles
    /// written for the same day keep distinct dates.
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        let day = NaiveDate::parse_from_str(self.date_input.trim(), DATE_FORMAT).ok()?;
        Some(day.and_time(self.base_date.time()).and_utc())
    }

    /// The article the form would submit, or `None` while it is incomplete.
    pub fn payload(&self) -> Option<Article> {
        let (uid, good_count) = match &self.mode {
            EditorMode::Create => (String::new(), 0),
            EditorMode::Edit(article) => (article.uid.clone(), article.good_count),
        };
        let article = Article {
            uid,
            title: self.title.trim().to_string(),
            sub_title: self.sub_title.trim().to_string(),
            content: self.content.clone(),
            thumbnail_image_path: self.thumbnail_image_path.trim().to_string(),
            date: self.parsed_date()?,
            tag_ids: self.tag_ids(),
            good_count,
            is_add_slide_show: self.is_add_slide_show,
        };
        article.validate().ok()?;
        Some(article)
    }

    pub fn is_disabled(&self) -> bool {
        self.payload().is_none()
    }

    pub fn submit_request(&self) -> Option<ArticleRequest> {
        let article = self.payload()?;
        Some(match self.mode {
            EditorMode::Create => ArticleRequest::Create(article),
            EditorMode::Edit(_) => ArticleRequest::Update(article),
        })
    }

    /// Empties the create form after a successful submission.
    pub async fn reset(&mut self) -> Result<()> {
        *self = Editor::create(self.drafts.clone());
        self.drafts.clear(&DraftKey::New).await
    }

    pub async fn discard_draft(&self) -> Result<()> {
        self.drafts.clear(&self.draft_key()).await
    }
}
