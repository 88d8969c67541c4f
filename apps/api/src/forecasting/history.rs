//! Raw history source — loads per-variant application outcomes for a profile.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::outcome::{ApplicationRow, VariantHistory};

/// Storage seam for application history. Carried in `AppState` as
/// `Arc<dyn HistorySource>`.
#[async_trait]
pub trait HistorySource: Send + Sync {
    /// Returns one history per resume variant of the profile, in a stable order.
    async fn variant_histories(&self, profile_id: Uuid) -> Result<Vec<VariantHistory>>;

    /// Returns every record of one variant, however few. `None` when the
    /// profile has no applications under that variant.
    async fn variant_history(
        &self,
        profile_id: Uuid,
        variant_id: &str,
    ) -> Result<Option<VariantHistory>>;
}

const HISTORY_QUERY: &str = r#"
    SELECT rv.id AS variant_id,
           rv.title AS variant_title,
           ja.applied_at,
           ja.response_received,
           ja.interview_granted,
           ja.company,
           ja.job_title
    FROM resume_versions rv
    JOIN job_applications ja ON ja.resume_version_id = rv.id
    WHERE rv.profile_id = $1
"#;

pub struct PgHistorySource {
    pool: PgPool,
    min_applications: usize,
}

impl PgHistorySource {
    pub fn new(pool: PgPool, min_applications: usize) -> Self {
        Self {
            pool,
            min_applications,
        }
    }
}

#[async_trait]
impl HistorySource for PgHistorySource {
    async fn variant_histories(&self, profile_id: Uuid) -> Result<Vec<VariantHistory>> {
        let query = format!("{HISTORY_QUERY} ORDER BY rv.title, rv.id, ja.applied_at");
        let rows = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(profile_id)
            .fetch_all(&self.pool)
            .await
            .with_context(|| {
                format!("failed to load application history for profile {profile_id}")
            })?;

        let histories = group_rows(rows)
            .into_iter()
            .filter(|h| h.records.len() >= self.min_applications)
            .collect();
        Ok(histories)
    }

    async fn variant_history(
        &self,
        profile_id: Uuid,
        variant_id: &str,
    ) -> Result<Option<VariantHistory>> {
        let query = format!("{HISTORY_QUERY} AND rv.id::text = $2 ORDER BY ja.applied_at");
        let rows = sqlx::query_as::<_, ApplicationRow>(&query)
            .bind(profile_id)
            .bind(variant_id)
            .fetch_all(&self.pool)
            .await
            .with_context(|| {
                format!("failed to load history for resume variant {variant_id}")
            })?;

        Ok(group_rows(rows).into_iter().next())
    }
}

/// Groups rows already ordered by variant into one history per variant.
pub fn group_rows(rows: Vec<ApplicationRow>) -> Vec<VariantHistory> {
    let mut histories: Vec<VariantHistory> = Vec::new();

    for row in rows {
        let variant_id = row.variant_id.to_string();
        match histories.last_mut() {
            Some(current) if current.variant_id == variant_id => {
                current.records.push(row.into_record());
            }
            _ => {
                let variant_title = row.variant_title.clone();
                histories.push(VariantHistory {
                    variant_id,
                    variant_title,
                    records: vec![row.into_record()],
                });
            }
        }
    }

    histories
}
