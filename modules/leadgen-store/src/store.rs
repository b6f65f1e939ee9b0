use anyhow::{Context, Result};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use leadgen_common::CanonicalLead;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Outcome of an upsert batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpsertSummary {
    pub inserted_count: usize,
    pub ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LeadStats {
    pub total_leads: i64,
    pub with_email: i64,
}

// ---------------------------------------------------------------------------
// PgLeadStore
// ---------------------------------------------------------------------------

/// Lead table access. Every query is scoped to a single owner.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;
        Ok(Self::new(pool))
    }

    /// Run the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Which of `emails` already belong to a stored lead of this owner.
    pub async fn existing_emails(&self, owner: &str, emails: &[String]) -> Result<Vec<String>> {
        if emails.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT email FROM leads
            WHERE owner_id = $1 AND email = ANY($2)
            "#,
        )
        .bind(owner)
        .bind(emails)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Insert or update leads for one owner inside a single transaction.
    /// A lead whose id already exists for the owner is overwritten in place.
    pub async fn upsert_leads(
        &self,
        owner: &str,
        leads: &[CanonicalLead],
    ) -> Result<UpsertSummary> {
        if leads.is_empty() {
            return Ok(UpsertSummary::default());
        }

        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(leads.len());

        for lead in leads {
            let criteria = serde_json::to_value(&lead.source_criteria)?;
            let id = sqlx::query_scalar::<_, String>(
                r#"
                INSERT INTO leads
                    (owner_id, id, first_name, last_name, full_name, email, phone,
                     linkedin_url, job_title, company_name, company_size, industry,
                     location, keywords, confidence_score, confidence_level,
                     source_query_criteria)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
                ON CONFLICT (owner_id, id) DO UPDATE SET
                    first_name = EXCLUDED.first_name,
                    last_name = EXCLUDED.last_name,
                    full_name = EXCLUDED.full_name,
                    email = EXCLUDED.email,
                    phone = EXCLUDED.phone,
                    linkedin_url = EXCLUDED.linkedin_url,
                    job_title = EXCLUDED.job_title,
                    company_name = EXCLUDED.company_name,
                    company_size = EXCLUDED.company_size,
                    industry = EXCLUDED.industry,
                    location = EXCLUDED.location,
                    keywords = EXCLUDED.keywords,
                    confidence_score = EXCLUDED.confidence_score,
                    confidence_level = EXCLUDED.confidence_level,
                    source_query_criteria = EXCLUDED.source_query_criteria,
                    updated_at = now()
                RETURNING id
                "#,
            )
            .bind(owner)
            .bind(&lead.id)
            .bind(&lead.first_name)
            .bind(&lead.last_name)
            .bind(&lead.full_name)
            .bind(&lead.email)
            .bind(&lead.phone)
            .bind(&lead.linkedin_url)
            .bind(&lead.job_title)
            .bind(&lead.company_name)
            .bind(&lead.company_size)
            .bind(&lead.industry)
            .bind(&lead.location)
            .bind(&lead.keywords)
            .bind(lead.confidence_score)
            .bind(lead.confidence_level.as_str())
            .bind(&criteria)
            .fetch_one(&mut *tx)
            .await?;
            ids.push(id);
        }

        tx.commit().await?;
        info!(owner, inserted = ids.len(), "Upserted leads");

        Ok(UpsertSummary {
            inserted_count: ids.len(),
            ids,
        })
    }

    /// Delete the owner's leads with the given ids. Returns the ids actually removed.
    pub async fn delete_leads(&self, owner: &str, ids: &[String]) -> Result<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let deleted = sqlx::query_scalar::<_, String>(
            "DELETE FROM leads WHERE owner_id = $1 AND id = ANY($2) RETURNING id",
        )
        .bind(owner)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        info!(owner, requested = ids.len(), deleted = deleted.len(), "Deleted leads");
        Ok(deleted)
    }

    pub async fn lead_stats(&self, owner: &str) -> Result<LeadStats> {
        let (total_leads, with_email) = sqlx::query_as::<_, (i64, i64)>(
            "SELECT COUNT(*), COUNT(email) FROM leads WHERE owner_id = $1",
        )
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;

        Ok(LeadStats {
            total_leads,
            with_email,
        })
    }
}
