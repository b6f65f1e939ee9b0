pub mod batch;
pub mod dedup;
pub mod normalizer;
pub mod query;
pub mod search;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use batch::{process_batch, BatchOutcome, RecordFailure};
pub use dedup::filter_new;
pub use normalizer::{normalize, RawExternalRecord};
pub use query::{GeneratedQuery, QueryBuilder, QueryMode, QuerySource};
pub use search::{LeadSearch, SearchOutcome, SearchSettings};
pub use traits::{LeadStore, ProspectScraper, TextCompleter};
