use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use tokio_rusqlite::Connection;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Article;

use super::drafts::{DraftKey, DraftStore};
use super::schema::SCHEMA;

const ARTICLE_COLUMNS: &str = "uid, title, sub_title, content, thumbnail_image_path, date, tag_ids, good_count, is_add_slide_show";

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    #[cfg(test)]
    pub(crate) async fn execute_batch(&self, sql: &'static str) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute_batch(sql)?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self { conn })
    }

    /// Draft store sharing this repository's connection.
    pub fn drafts(&self) -> DraftStore {
        DraftStore::new(self.conn.clone())
    }

    // Write operations

    /// Inserts a new article under a freshly generated uid and returns it.
    pub async fn create_article(&self, article: Article) -> Result<String> {
        article.validate()?;
        let uid = Uuid::new_v4().to_string();
        let tag_ids = serde_json::to_string(&article.tag_ids)?;
        let row_uid = uid.clone();

        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT INTO articles (uid, title, sub_title, content, thumbnail_image_path, date, tag_ids, good_count, is_add_slide_show)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
                    params![
                        row_uid,
                        article.title,
                        article.sub_title,
                        article.content,
                        article.thumbnail_image_path,
                        article.date.timestamp_millis(),
                        tag_ids,
                        article.good_count,
                        article.is_add_slide_show,
                    ],
                )?;
                Ok(())
            })
            .await?;

        tracing::debug!(%uid, "created article");
        Ok(uid)
    }

    /// Overwrites every field of the article stored under `article.uid`.
    pub async fn update_article(&self, article: Article) -> Result<()> {
        article.validate()?;
        let tag_ids = serde_json::to_string(&article.tag_ids)?;
        let uid = article.uid.clone();

        let changed = self
            .conn
            .call(move |conn| {
                let changed = conn.execute(
                    r#"UPDATE articles SET
                           title = ?2,
                           sub_title = ?3,
                           content = ?4,
                           thumbnail_image_path = ?5,
                           date = ?6,
                           tag_ids = ?7,
                           good_count = ?8,
                           is_add_slide_show = ?9,
                           updated_at = datetime('now')
                       WHERE uid = ?1"#,
                    params![
                        article.uid,
                        article.title,
                        article.sub_title,
                        article.content,
                        article.thumbnail_image_path,
                        article.date.timestamp_millis(),
                        tag_ids,
                        article.good_count,
                        article.is_add_slide_show,
                    ],
                )?;
                Ok(changed)
            })
            .await?;

        if changed == 0 {
            return Err(AppError::NotFound(uid));
        }
        Ok(())
    }

    /// Adds one like, or takes one away when `is_done` (the reader already
    /// liked it). Runs as a single statement so concurrent callers never lose
    /// an update. Returns the new count.
    pub async fn change_good_count(&self, uid: &str, is_done: bool) -> Result<i64> {
        let delta: i64 = if is_done { -1 } else { 1 };
        let key = uid.to_string();

        let count = self
            .conn
            .call(move |conn| {
                let count = conn
                    .query_row(
                        r#"UPDATE articles SET good_count = good_count + ?2, updated_at = datetime('now')
                           WHERE uid = ?1
                           RETURNING good_count"#,
                        params![key, delta],
                        |row| row.get::<_, i64>(0),
                    )
                    .optional()?;
                Ok(count)
            })
            .await?;

        count.ok_or_else(|| AppError::NotFound(uid.to_string()))
    }

    /// Removes the article and any draft saved for it. Missing ids are not an error.
    pub async fn delete_article(&self, uid: &str) -> Result<()> {
        let key = uid.to_string();
        let draft_key = DraftKey::Article(uid.to_string()).storage_key();

        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM drafts WHERE draft_key = ?1", params![draft_key])?;
                tx.execute("DELETE FROM articles WHERE uid = ?1", params![key])?;
                tx.commit()?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    // Read operations

    pub async fn get_articles(&self) -> Result<Vec<Article>> {
        self.query_articles(
            format!("SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY date DESC, uid DESC"),
            Vec::new(),
        )
        .await
    }

    /// One page of articles strictly older than `before`, newest first.
    /// `None` starts from the newest article.
    pub async fn get_latest_articles(
        &self,
        before: Option<DateTime<Utc>>,
        limit: u32,
    ) -> Result<Vec<Article>> {
        let before = before.map(|d| d.timestamp_millis());
        self.query_articles(
            format!(
                r#"SELECT {ARTICLE_COLUMNS} FROM articles
                   WHERE (?1 IS NULL OR date < ?1)
                   ORDER BY date DESC, uid DESC
                   LIMIT ?2"#
            ),
            vec![Box::new(before), Box::new(i64::from(limit))],
        )
        .await
    }

    pub async fn get_articles_by_good_count(&self) -> Result<Vec<Article>> {
        self.query_articles(
            format!(
                "SELECT {ARTICLE_COLUMNS} FROM articles ORDER BY good_count DESC, date DESC, uid DESC"
            ),
            Vec::new(),
        )
        .await
    }

    pub async fn get_article(&self, uid: &str) -> Result<Option<Article>> {
        self.query_optional_article(
            format!("SELECT {ARTICLE_COLUMNS} FROM articles WHERE uid = ?1"),
            vec![Box::new(uid.to_string())],
        )
        .await
    }

    pub async fn get_slide_show_articles(&self) -> Result<Vec<Article>> {
        self.query_articles(
            format!(
                r#"SELECT {ARTICLE_COLUMNS} FROM articles
                   WHERE is_add_slide_show = 1
                   ORDER BY date DESC, uid DESC"#
            ),
            Vec::new(),
        )
        .await
    }

    pub async fn get_articles_by_tag(&self, tag_id: &str) -> Result<Vec<Article>> {
        self.query_articles(
            format!(
                r#"SELECT {ARTICLE_COLUMNS} FROM articles
                   WHERE EXISTS (SELECT 1 FROM json_each(articles.tag_ids) WHERE json_each.value = ?1)
                   ORDER BY date DESC, uid DESC"#
            ),
            vec![Box::new(tag_id.to_string())],
        )
        .await
    }

    /// The closest article strictly older than `date`.
    pub async fn get_prev_article(&self, date: DateTime<Utc>) -> Result<Option<Article>> {
        self.query_optional_article(
            format!(
                r#"SELECT {ARTICLE_COLUMNS} FROM articles
                   WHERE date < ?1
                   ORDER BY date DESC, uid DESC
                   LIMIT 1"#
            ),
            vec![Box::new(date.timestamp_millis())],
        )
        .await
    }

    /// The closest article strictly newer than `date`.
    pub async fn get_next_article(&self, date: DateTime<Utc>) -> Result<Option<Article>> {
        self.query_optional_article(
            format!(
                r#"SELECT {ARTICLE_COLUMNS} FROM articles
                   WHERE date > ?1
                   ORDER BY date ASC, uid ASC
                   LIMIT 1"#
            ),
            vec![Box::new(date.timestamp_millis())],
        )
        .await
    }

    async fn query_articles(&self, sql: String, args: Vec<SqlArg>) -> Result<Vec<Article>> {
        let articles = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let articles = stmt
                    .query_map(rusqlite::params_from_iter(args.iter()), article_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(articles)
            })
            .await?;
        Ok(articles)
    }

    async fn query_optional_article(
        &self,
        sql: String,
        args: Vec<SqlArg>,
    ) -> Result<Option<Article>> {
        let article = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let article = stmt
                    .query_row(rusqlite::params_from_iter(args.iter()), article_from_row)
                    .optional()?;
                Ok(article)
            })
            .await?;
        Ok(article)
    }
}

type SqlArg = Box<dyn rusqlite::ToSql + Send>;

#[derive(Debug, thiserror::Error)]
#[error("timestamp out of range: {0}")]
struct TimestampOutOfRange(i64);

fn article_from_row(row: &Row) -> rusqlite::Result<Article> {
    let millis: i64 = row.get(5)?;
    let date = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Integer,
            Box::new(TimestampOutOfRange(millis)),
        )
    })?;

    let tag_json: String = row.get(6)?;
    let tag_ids: Vec<String> = serde_json::from_str(&tag_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;

    Ok(Article {
        uid: row.get(0)?,
        title: row.get(1)?,
        sub_title: row.get(2)?,
        content: row.get(3)?,
        thumbnail_image_path: row.get(4)?,
        date,
        tag_ids,
        good_count: row.get(7)?,
        is_add_slide_show: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_article;
    use chrono::{Duration, TimeZone};

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, 9, 30, 0).unwrap()
    }

    async fn seeded(days: &[u32]) -> (Repository, Vec<String>) {
        let repo = Repository::open_in_memory().await.unwrap();
        let mut uids = Vec::new();
        for &d in days {
            let uid = repo
                .create_article(sample_article(&format!("Day {d}"), day(d)))
                .await
                .unwrap();
            uids.push(uid);
        }
        (repo, uids)
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let repo = Repository::open_in_memory().await.unwrap();
        let mut article = sample_article("Hello", day(10));
        article.tag_ids = vec!["rust".into(), "cms".into()];
        article.is_add_slide_show = true;
        article.good_count = 3;

        let uid = repo.create_article(article.clone()).await.unwrap();
        assert!(!uid.is_empty());

        let stored = repo.get_article(&uid).await.unwrap().expect("article");
        article.uid = uid;
        assert_eq!(stored, article);
    }

    #[tokio::test]
    async fn create_ignores_incoming_uid() {
        let repo = Repository::open_in_memory().await.unwrap();
        let mut article = sample_article("Hello", day(10));
        article.uid = "chosen-by-caller".into();

        let uid = repo.create_article(article).await.unwrap();
        assert_ne!(uid, "chosen-by-caller");
        assert!(repo.get_article("chosen-by-caller").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_invalid_articles() {
        let repo = Repository::open_in_memory().await.unwrap();
        let mut article = sample_article("Hello", day(10));
        article.title.clear();

        let err = repo.create_article(article).await.unwrap_err();
        assert!(matches!(err, AppError::Invalid(_)));
        assert!(repo.get_articles().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_overwrites_and_keeps_uid() {
        let (repo, uids) = seeded(&[10]).await;
        let mut article = repo.get_article(&uids[0]).await.unwrap().unwrap();
        article.title = "Renamed".into();
        article.tag_ids = vec!["t2".into()];
        article.date = day(12);

        repo.update_article(article.clone()).await.unwrap();

        let stored = repo.get_article(&uids[0]).await.unwrap().unwrap();
        assert_eq!(stored, article);
        assert_eq!(stored.uid, uids[0]);
    }

    #[tokio::test]
    async fn update_of_missing_article_is_not_found() {
        let repo = Repository::open_in_memory().await.unwrap();
        let mut article = sample_article("Ghost", day(1));
        article.uid = "missing".into();

        let err = repo.update_article(article).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(uid) if uid == "missing"));
    }

    #[tokio::test]
    async fn delete_then_get_is_none() {
        let (repo, uids) = seeded(&[10, 11]).await;
        repo.delete_article(&uids[0]).await.unwrap();

        assert!(repo.get_article(&uids[0]).await.unwrap().is_none());
        assert_eq!(repo.get_articles().await.unwrap().len(), 1);

        // deleting again is fine
        repo.delete_article(&uids[0]).await.unwrap();
    }

    #[tokio::test]
    async fn delete_drops_the_articles_draft() {
        let (repo, uids) = seeded(&[10]).await;
        let drafts = repo.drafts();
        let key = DraftKey::Article(uids[0].clone());
        drafts.save(&key, "unsaved edit").await.unwrap();

        repo.delete_article(&uids[0]).await.unwrap();
        assert_eq!(drafts.load(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn good_count_increments_and_decrements() {
        let repo = Repository::open_in_memory().await.unwrap();
        let article = Article {
            uid: String::new(),
            title: "A".into(),
            sub_title: "B".into(),
            content: "C".into(),
            thumbnail_image_path: "p.png".into(),
            date: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            tag_ids: vec!["t1".into()],
            good_count: 0,
            is_add_slide_show: false,
        };
        let uid = repo.create_article(article).await.unwrap();

        assert_eq!(repo.change_good_count(&uid, false).await.unwrap(), 1);
        assert_eq!(repo.change_good_count(&uid, false).await.unwrap(), 2);
        let stored = repo.get_article(&uid).await.unwrap().unwrap();
        assert_eq!(stored.good_count, 2);

        assert_eq!(repo.change_good_count(&uid, true).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn good_count_of_missing_article_is_not_found() {
        let repo = Repository::open_in_memory().await.unwrap();
        let err = repo.change_good_count("nope", false).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn concurrent_likes_are_not_lost() {
        let (repo, uids) = seeded(&[10]).await;
        let uid = uids[0].clone();

        let tasks = (0..25).map(|_| {
            let repo = repo.clone();
            let uid = uid.clone();
            tokio::spawn(async move { repo.change_good_count(&uid, false).await })
        });
        for result in futures::future::join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let stored = repo.get_article(&uid).await.unwrap().unwrap();
        assert_eq!(stored.good_count, 25);
    }

    #[tokio::test]
    async fn all_articles_newest_first() {
        let (repo, _) = seeded(&[3, 9, 1, 5]).await;
        let dates: Vec<_> = repo
            .get_articles()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.date)
            .collect();
        assert_eq!(dates, vec![day(9), day(5), day(3), day(1)]);
    }

    #[tokio::test]
    async fn latest_pages_by_date_cursor() {
        let (repo, _) = seeded(&[1, 2, 3, 4, 5, 6, 7, 8]).await;

        let first = repo.get_latest_articles(None, 5).await.unwrap();
        assert_eq!(first.len(), 5);
        assert_eq!(first[0].date, day(8));
        assert_eq!(first[4].date, day(4));

        let cursor = first.last().unwrap().date;
        let second = repo.get_latest_articles(Some(cursor), 5).await.unwrap();
        let dates: Vec<_> = second.iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![day(3), day(2), day(1)]);
        assert!(second.iter().all(|a| a.date < cursor));

        let past_end = repo.get_latest_articles(Some(day(1)), 5).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn popular_orders_by_good_count() {
        let (repo, uids) = seeded(&[1, 2, 3]).await;
        repo.change_good_count(&uids[0], false).await.unwrap();
        repo.change_good_count(&uids[0], false).await.unwrap();
        repo.change_good_count(&uids[2], false).await.unwrap();

        let order: Vec<_> = repo
            .get_articles_by_good_count()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.uid)
            .collect();
        assert_eq!(order, vec![uids[0].clone(), uids[2].clone(), uids[1].clone()]);
    }

    #[tokio::test]
    async fn slide_show_only_returns_flagged() {
        let (repo, uids) = seeded(&[1, 2]).await;
        let mut article = repo.get_article(&uids[1]).await.unwrap().unwrap();
        article.is_add_slide_show = true;
        repo.update_article(article).await.unwrap();

        let slides = repo.get_slide_show_articles().await.unwrap();
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].uid, uids[1]);
    }

    #[tokio::test]
    async fn by_tag_matches_membership_only() {
        let repo = Repository::open_in_memory().await.unwrap();
        for (d, tags) in [(1, vec!["rust"]), (2, vec!["go", "rust"]), (3, vec!["rusty"])] {
            let mut a = sample_article(&format!("Day {d}"), day(d));
            a.tag_ids = tags.into_iter().map(String::from).collect();
            repo.create_article(a).await.unwrap();
        }

        let tagged = repo.get_articles_by_tag("rust").await.unwrap();
        assert_eq!(tagged.len(), 2);
        assert!(tagged.iter().all(|a| a.has_tag("rust")));
        assert_eq!(tagged[0].date, day(2));

        assert!(repo.get_articles_by_tag("python").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn prev_and_next_pick_closest_neighbours() {
        let (repo, _) = seeded(&[1, 4, 7, 10]).await;

        let prev = repo.get_prev_article(day(7)).await.unwrap().unwrap();
        assert_eq!(prev.date, day(4));
        let next = repo.get_next_article(day(4)).await.unwrap().unwrap();
        assert_eq!(next.date, day(7));

        let between = day(5) + Duration::hours(1);
        assert_eq!(repo.get_next_article(between).await.unwrap().unwrap().date, day(7));
        assert_eq!(repo.get_prev_article(between).await.unwrap().unwrap().date, day(4));
    }

    #[tokio::test]
    async fn neighbours_at_the_ends_are_none() {
        let (repo, _) = seeded(&[1, 4]).await;
        assert!(repo.get_prev_article(day(1)).await.unwrap().is_none());
        assert!(repo.get_next_article(day(4)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_tag_json_is_a_decode_error() {
        let (repo, uids) = seeded(&[1]).await;
        let uid = uids[0].clone();
        repo.conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE articles SET tag_ids = 'not json' WHERE uid = ?1",
                    params![uid],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        assert!(repo.get_article(&uids[0]).await.is_err());
    }

    #[tokio::test]
    async fn on_disk_store_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.db");
        let path = path.to_str().unwrap();

        let uid = {
            let repo = Repository::new(path).await.unwrap();
            repo.create_article(sample_article("Kept", day(2))).await.unwrap()
        };

        let reopened = Repository::new(path).await.unwrap();
        let article = reopened.get_article(&uid).await.unwrap().unwrap();
        assert_eq!(article.title, "Kept");
    }
}
