use crate::{
    error::AppResult,
    models::{BookMetadata, CandidateSeed},
};

pub mod google_books;
pub mod static_pool;

pub use google_books::GoogleBooksProvider;
pub use static_pool::{CandidatePoolFile, StaticCandidatePool};

/// Candidate Pool Provider
///
/// Supplies unscored candidates. Implementations may scrape, call an API or
/// return fixtures; the selector only sees the resulting seeds.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CandidateProvider: Send + Sync {
    async fn fetch_candidates(&self) -> AppResult<Vec<CandidateSeed>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Book metadata lookup
///
/// Used to fill in author, crowd rating, genre and cover for books the
/// reading log or candidate pool left incomplete.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Look up the best match for a title, narrowed by author when known
    ///
    /// Returns `Ok(None)` when the provider has no match.
    async fn lookup(&self, title: &str, author: &str) -> AppResult<Option<BookMetadata>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
