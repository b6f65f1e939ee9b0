//! Postgres persistence for normalized leads, partitioned by owner.

mod store;

pub use store::{LeadStats, PgLeadStore, UpsertSummary};
