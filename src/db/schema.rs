pub const SCHEMA: &str = r#"
-- articles table (date is a millisecond unix timestamp, tag_ids a JSON array)
CREATE TABLE IF NOT EXISTS articles (
    uid TEXT PRIMARY KEY NOT NULL,
    title TEXT NOT NULL,
    sub_title TEXT NOT NULL,
    content TEXT NOT NULL,
    thumbnail_image_path TEXT NOT NULL,
    date INTEGER NOT NULL,
    tag_ids TEXT NOT NULL DEFAULT '[]',
    good_count INTEGER NOT NULL DEFAULT 0,
    is_add_slide_show INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_articles_date ON articles(date DESC);
CREATE INDEX IF NOT EXISTS idx_articles_good_count ON articles(good_count DESC);
CREATE INDEX IF NOT EXISTS idx_articles_slide_show ON articles(is_add_slide_show);

-- drafts table (unsaved editor content, keyed by 'new' or 'article:<uid>')
CREATE TABLE IF NOT EXISTS drafts (
    draft_key TEXT PRIMARY KEY NOT NULL,
    content TEXT NOT NULL,
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
