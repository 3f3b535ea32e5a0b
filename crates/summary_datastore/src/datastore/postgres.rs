use std::time::Duration;

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions, types::Json, PgPool};

use crate::{datastore::DataStore, CacheRecord, KeyPoint, StructuredSummary, VideoMetadata};

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct PgDataStore {
    pub pool: PgPool,
}

impl PgDataStore {
    /// Establish connection to database and create the video_summaries table
    /// if not exists
    pub async fn init(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30))
            // recycle connections before idle server-side timeouts kill them
            .max_lifetime(Duration::from_secs(90))
            .test_before_acquire(true)
            .connect(database_url)
            .await
            .inspect_err(
                |e| tracing::error!(error = ?e, "Failed to establish connection to database"),
            )
            .context("Failed to connect to postgres database")?;

        MIGRATOR
            .run(&pool)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to run database migrations"))
            .context("Failed to run database migrations")?;

        Ok(PgDataStore { pool })
    }

    /// Waits for checked-out connections to be returned and closes the pool
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    video_id: String,
    video_title: String,
    video_description: String,
    channel_title: String,
    channel_id: String,
    sub_title: String,
    overview: String,
    main_topics: Json<Vec<String>>,
    key_points: Json<Vec<KeyPoint>>,
    keywords: Json<Vec<String>>,
    action_items: Json<Vec<String>>,
    archive_path: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SummaryRow> for CacheRecord {
    fn from(row: SummaryRow) -> Self {
        CacheRecord {
            video_id: row.video_id,
            metadata: VideoMetadata {
                title: row.video_title,
                description: row.video_description,
                channel_title: row.channel_title,
                channel_id: row.channel_id,
            },
            summary: StructuredSummary {
                sub_title: row.sub_title,
                overview: row.overview,
                main_topics: row.main_topics.0,
                key_points: row.key_points.0,
                keywords: row.keywords.0,
                action_items: row.action_items.0,
            },
            archive_path: row.archive_path,
            created_at: row.created_at,
        }
    }
}

impl DataStore for PgDataStore {
    async fn latest_summary(&self, video_id: &str) -> anyhow::Result<Option<CacheRecord>> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT video_id, video_title, video_description, channel_title, channel_id,
                   sub_title, overview, main_topics, key_points, keywords, action_items,
                   archive_path, created_at
            FROM video_summaries
            WHERE video_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await
        .inspect_err(|e| {
            tracing::error!(error = ?e, %video_id, "Failed to fetch cached summary");
        })
        .context("Failed to fetch cached summary")?;

        Ok(row.map(CacheRecord::from))
    }

    async fn insert_summary(&self, record: &CacheRecord) -> anyhow::Result<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO video_summaries (
                video_id, video_title, video_description, channel_title, channel_id,
                sub_title, overview, main_topics, key_points, keywords, action_items,
                archive_path, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&record.video_id)
        .bind(&record.metadata.title)
        .bind(&record.metadata.description)
        .bind(&record.metadata.channel_title)
        .bind(&record.metadata.channel_id)
        .bind(&record.summary.sub_title)
        .bind(&record.summary.overview)
        .bind(Json(&record.summary.main_topics))
        .bind(Json(&record.summary.key_points))
        .bind(Json(&record.summary.keywords))
        .bind(Json(&record.summary.action_items))
        .bind(&record.archive_path)
        .bind(record.created_at)
        .fetch_one(&mut *tx)
        .await;

        let id = match inserted {
            Ok(id) => id,
            Err(err) => {
                tracing::error!(
                    error = ?err,
                    video_id = %record.video_id,
                    "Failed to insert summary"
                );
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = ?rollback_err, "Failed to roll back transaction");
                }
                return Err(err).context("Failed to insert summary");
            }
        };

        tx.commit()
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to commit summary insert"))
            .context("Failed to commit summary insert")?;

        tracing::info!(video_id = %record.video_id, id, "Saved summary");

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn summary(sub_title: &str) -> StructuredSummary {
        StructuredSummary {
            sub_title: sub_title.into(),
            overview: "overview".into(),
            main_topics: vec!["a".into(), "b".into(), "c".into()],
            key_points: vec![KeyPoint {
                title: "t".into(),
                description: "d".into(),
            }],
            keywords: vec!["k1".into(), "k2".into()],
            action_items: vec!["act".into()],
        }
    }

    #[test]
    fn test_row_maps_to_record() {
        let created_at = Utc.with_ymd_and_hms(2025, 4, 15, 9, 30, 0).unwrap();
        let row = SummaryRow {
            video_id: "abc".into(),
            video_title: "Title".into(),
            video_description: "Description".into(),
            channel_title: "Channel".into(),
            channel_id: "UC123".into(),
            sub_title: "Sub".into(),
            overview: "overview".into(),
            main_topics: Json(vec!["a".into(), "b".into(), "c".into()]),
            key_points: Json(vec![KeyPoint {
                title: "t".into(),
                description: "d".into(),
            }]),
            keywords: Json(vec!["k1".into(), "k2".into()]),
            action_items: Json(vec!["act".into()]),
            archive_path: Some("gs://bucket/summaries/abc/x.json".into()),
            created_at,
        };

        let record = CacheRecord::from(row);

        assert_eq!(record.video_id, "abc");
        assert_eq!(record.metadata.channel_id, "UC123");
        assert_eq!(record.summary, summary("Sub"));
        assert_eq!(
            record.archive_path.as_deref(),
            Some("gs://bucket/summaries/abc/x.json")
        );
        assert_eq!(record.created_at, created_at);
    }

    // Needs a disposable postgres database: DATABASE_URL=... cargo test -- --ignored
    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch postgres database"]
    async fn test_latest_summary_returns_newest_row() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let store = PgDataStore::init(&url).await.expect("Failed to init store");

        let video_id = format!("freshness-{}", Utc::now().timestamp_nanos_opt().unwrap());
        let mut older = CacheRecord::new(&video_id, VideoMetadata::default(), summary("old"), None);
        older.created_at = Utc::now() - Duration::minutes(5);
        let newer = CacheRecord::new(&video_id, VideoMetadata::default(), summary("new"), None);

        // insert newest first so insertion order cannot explain the result
        store.insert_summary(&newer).await.expect("insert newer");
        store.insert_summary(&older).await.expect("insert older");

        let latest = store
            .latest_summary(&video_id)
            .await
            .expect("lookup")
            .expect("row should exist");
        assert_eq!(latest.summary.sub_title, "new");

        assert!(store
            .latest_summary("missing-video-id")
            .await
            .expect("lookup")
            .is_none());

        store.close().await;
    }

    #[test]
    fn test_free_text_columns_are_unbounded() {
        let migration = include_str!("../../migrations/20250415000000_create_video_summaries.sql");

        for column in [
            "video_title",
            "channel_title",
            "sub_title",
            "overview",
            "archive_path",
        ] {
            let definition = migration
                .lines()
                .map(str::trim)
                .find(|line| line.starts_with(&format!("{column} ")))
                .unwrap_or_else(|| panic!("{column} missing from migration"));
            assert!(
                definition.starts_with(&format!("{column} TEXT")),
                "{column} should be TEXT, got: {definition}"
            );
        }
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a scratch postgres database"]
    async fn test_long_sub_title_is_stored() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let store = PgDataStore::init(&url).await.expect("Failed to init store");

        let video_id = format!("long-title-{}", Utc::now().timestamp_nanos_opt().unwrap());
        let sub_title = "a very long sub title ".repeat(40);
        let record = CacheRecord::new(&video_id, VideoMetadata::default(), summary(&sub_title), None);

        store.insert_summary(&record).await.expect("insert long sub title");

        let latest = store
            .latest_summary(&video_id)
            .await
            .expect("lookup")
            .expect("row should exist");
        assert_eq!(latest.summary.sub_title, sub_title);

        store.close().await;
    }
}
