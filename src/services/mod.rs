// Service exports
pub mod cache;
pub mod memory;
pub mod postgres;
pub mod retry;
pub mod scoring_job;
pub mod store;
pub mod supabase;

pub use cache::{CacheError, CacheKey, CacheManager, MatchCache};
pub use memory::MemoryStore;
pub use postgres::PostgresClient;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use scoring_job::{JobError, ScoringService, ScoringSummary};
pub use store::{Store, StoreError};
pub use supabase::{RecordSource, SourceError, SupabaseClient, SupabaseTables};
