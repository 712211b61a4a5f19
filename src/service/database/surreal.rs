use surrealdb::engine::any::Any;
use surrealdb::opt::auth::Root;
use surrealdb::Surreal;

use super::*;
use crate::config::SurrealConfig;

const FIND: &str = "SELECT * FROM type::thing('progress', [$user_id, $video_id])";

const CREATE: &str =
    "CREATE type::thing('progress', [$user_id, $video_id]) CONTENT $content RETURN AFTER";

const UPDATE: &str = "UPDATE type::thing('progress', [$user_id, $video_id]) CONTENT $content \
                      WHERE version = $expected RETURN AFTER";

/// Records live in the `progress` table under the id `progress:[userId, videoId]`, which makes the
/// database enforce one record per key.
#[derive(Debug, Clone)]
pub struct SurrealStore {
    database: Surreal<Any>,
}

impl SurrealStore {
    pub async fn connect(config: &SurrealConfig) -> Result<Self> {
        let url = config.endpoint.to_string();

        let database = surrealdb::engine::any::connect(url.as_str())
            .await
            .context(DatabaseConnectionSnafu { url: url.clone() })?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            database
                .signin(Root {
                    username: username.as_str(),
                    password: password.as_str(),
                })
                .await
                .context(DatabaseConnectionSnafu { url: url.clone() })?;
        }

        database
            .use_ns(&config.namespace)
            .use_db(&config.database)
            .await
            .context(DatabaseConnectionSnafu { url })?;

        tracing::info!(endpoint = %config.endpoint, namespace = %config.namespace, database = %config.database, "connected to surrealdb");

        Ok(Self { database })
    }

    async fn insert(&self, key: &WatchKey, record: &WatchRecord) -> Result<Option<WatchRecord>> {
        let mut response = self
            .database
            .query(CREATE)
            .bind(("user_id", key.user_id.to_string()))
            .bind(("video_id", key.video_id.to_string()))
            .bind(("content", record.clone()))
            .await
            .context(DatabaseQuerySnafu)?;

        response.take(0).context(DatabaseQuerySnafu)
    }
}

impl ProgressStore for SurrealStore {
    async fn find(&self, key: &WatchKey) -> Result<Option<WatchRecord>> {
        let mut response = self
            .database
            .query(FIND)
            .bind(("user_id", key.user_id.to_string()))
            .bind(("video_id", key.video_id.to_string()))
            .await
            .context(DatabaseQuerySnafu)?;

        response.take(0).context(DatabaseQuerySnafu)
    }

    async fn create(&self, record: &WatchRecord) -> Result<WatchRecord> {
        let key = record.key();

        match self.insert(&key, record).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => EmptyQuerySnafu.fail(),
            // a failed CREATE on an existing id means someone else created it first
            Err(err) => match self.find(&key).await? {
                Some(_) => ConflictSnafu {
                    key,
                    expected: None::<u64>,
                }
                .fail(),
                None => Err(err),
            },
        }
    }

    async fn update(&self, record: &WatchRecord) -> Result<WatchRecord> {
        let key = record.key();
        let next = WatchRecord {
            version: record.version + 1,
            ..record.clone()
        };

        let mut response = self
            .database
            .query(UPDATE)
            .bind(("user_id", key.user_id.to_string()))
            .bind(("video_id", key.video_id.to_string()))
            .bind(("content", next))
            .bind(("expected", record.version))
            .await
            .context(DatabaseQuerySnafu)?;

        let updated: Option<WatchRecord> = response.take(0).context(DatabaseQuerySnafu)?;

        updated.context(ConflictSnafu {
            key,
            expected: Some(record.version),
        })
    }
}
