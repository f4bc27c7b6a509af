use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_postgres::{Client, Config, NoTls, Row};
use tracing::{debug, error, info, warn};

use super::{PostingStore, StoreError, WeeklyCount};
use crate::search::Language;

const LABELS_SQL: &str =
    "SELECT DISTINCT occupation_label FROM vacancies WHERE occupation_label IS NOT NULL";

/// Each partition has its own search vector column and text-search configuration,
/// so the two lookups are separate statements rather than one OR'd query.
fn count_sql(language: Language) -> String {
    let code = language.code();
    let config = language.ts_config();
    format!(
        "SELECT to_char(date_trunc('week', published_at), 'IYYY-IW') AS week, COUNT(*) AS count
         FROM vacancies
         WHERE language = '{code}' AND published_at IS NOT NULL
           AND tsv_{code} @@ plainto_tsquery('{config}', $1)
         GROUP BY week"
    )
}

/// Postgres-backed store over the `vacancies` table.
///
/// Holds one connection and reopens it on the next call once the server has
/// closed it. Opening a connection is bounded by `timeout`.
pub struct PgStore {
    config: Config,
    timeout: Duration,
    client: Mutex<Arc<Client>>,
}

impl PgStore {
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, StoreError> {
        if url.trim().is_empty() {
            return Err(StoreError::NotConfigured);
        }
        let mut config: Config = url.parse().map_err(StoreError::Connect)?;
        config.connect_timeout(timeout);

        let client = open(&config, timeout).await?;
        info!("connected to posting store");
        Ok(Self {
            config,
            timeout,
            client: Mutex::new(Arc::new(client)),
        })
    }

    async fn client(&self) -> Result<Arc<Client>, StoreError> {
        let mut current = self.client.lock().await;
        if current.is_closed() {
            warn!("posting store connection closed, reconnecting");
            *current = Arc::new(open(&self.config, self.timeout).await?);
            info!("reconnected to posting store");
        }
        Ok(Arc::clone(&current))
    }
}

async fn open(config: &Config, timeout: Duration) -> Result<Client, StoreError> {
    let (client, connection) = tokio::time::timeout(timeout, config.connect(NoTls))
        .await
        .map_err(|_| StoreError::ConnectTimeout(timeout))?
        .map_err(StoreError::Connect)?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!(error = %e, "postgres connection closed");
        }
    });
    Ok(client)
}

impl PostingStore for PgStore {
    async fn load_distinct_labels(&self) -> Result<Vec<String>, StoreError> {
        let rows = self.client().await?.query(LABELS_SQL, &[]).await?;
        let labels = rows
            .iter()
            .map(|row| row.try_get::<_, Option<String>>(0))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(labels.into_iter().flatten().collect())
    }

    async fn count_by_week(
        &self,
        language: Language,
        term: &str,
    ) -> Result<Vec<WeeklyCount>, StoreError> {
        let rows = self
            .client()
            .await?
            .query(&count_sql(language), &[&term])
            .await?;
        debug!(%language, term, rows = rows.len(), "weekly counts fetched");
        rows.iter().map(weekly_count_from_row).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.client().await?.query_one("SELECT 1", &[]).await?;
        Ok(())
    }
}

fn weekly_count_from_row(row: &Row) -> Result<WeeklyCount, StoreError> {
    let week: String = row.try_get("week")?;
    let count: i64 = row.try_get("count")?;
    let count = u64::try_from(count)
        .map_err(|_| StoreError::InvalidRow(format!("negative count {count} for week {week}")))?;
    Ok(WeeklyCount::new(week, count))
}
