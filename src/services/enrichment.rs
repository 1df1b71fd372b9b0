//! Metadata enrichment at the I/O boundary.
//!
//! Fills gaps in read records and candidate seeds from a [`MetadataProvider`].
//! Values already present always win over looked-up ones, and a failed lookup
//! leaves the item untouched.
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::{BookMetadata, BookRecord, CandidateSeed};
use crate::services::providers::MetadataProvider;

/// Concurrent lookups in flight against the provider
const MAX_CONCURRENT_LOOKUPS: usize = 4;

fn record_needs_lookup(record: &BookRecord) -> bool {
    record.author.trim().is_empty()
        || record.external_rating <= 0.0
        || record.genre.trim().is_empty()
        || record.details.cover_url.is_none()
}

fn seed_needs_lookup(seed: &CandidateSeed) -> bool {
    seed.external_rating <= 0.0 || seed.genre.is_none() || seed.cover_url.is_none()
}

/// Returns a copy of `record` with missing fields taken from `metadata`
pub fn apply_to_record(record: &BookRecord, metadata: &BookMetadata) -> BookRecord {
    let mut enriched = record.clone();

    if enriched.author.trim().is_empty() {
        if let Some(author) = metadata.primary_author() {
            enriched.author = author.to_string();
        }
    }
    if enriched.external_rating <= 0.0 {
        if let Some(rating) = metadata.average_rating {
            enriched.external_rating = rating;
        }
    }
    if enriched.genre.trim().is_empty() {
        if let Some(genre) = metadata.primary_genre() {
            enriched.genre = genre;
        }
    }
    if enriched.details.cover_url.is_none() {
        enriched.details.cover_url = metadata.cover_url.clone();
    }
    if enriched.details.num_ratings.is_none() {
        enriched.details.num_ratings = metadata.ratings_count;
    }

    enriched
}

/// Returns a copy of `seed` with missing fields taken from `metadata`
pub fn apply_to_seed(seed: &CandidateSeed, metadata: &BookMetadata) -> CandidateSeed {
    let mut enriched = seed.clone();

    if enriched.external_rating <= 0.0 {
        if let Some(rating) = metadata.average_rating {
            enriched.external_rating = rating;
        }
    }
    if enriched.genre.is_none() {
        enriched.genre = metadata.primary_genre();
    }
    if enriched.cover_url.is_none() {
        enriched.cover_url = metadata.cover_url.clone();
    }

    enriched
}

/// Looks up `(title, author)` pairs concurrently, preserving input order
///
/// Failed lookups are logged and yield `None`.
async fn lookup_all(
    provider: Arc<dyn MetadataProvider>,
    queries: Vec<(usize, String, String)>,
    len: usize,
) -> Vec<Option<BookMetadata>> {
    let mut results = vec![None; len];
    let permits = Arc::new(Semaphore::new(MAX_CONCURRENT_LOOKUPS));
    let mut tasks = JoinSet::new();

    for (index, title, author) in queries {
        let provider = provider.clone();
        let permits = permits.clone();
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await;
            let result = provider.lookup(&title, &author).await;
            (index, title, result)
        });
    }

    let mut failures = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, _, Ok(metadata))) => results[index] = metadata,
            Ok((_, title, Err(e))) => {
                failures += 1;
                tracing::warn!(title = %title, error = %e, provider = provider.name(), "Metadata lookup failed");
            }
            Err(e) => {
                failures += 1;
                tracing::error!(error = %e, "Metadata lookup task failed");
            }
        }
    }

    if failures > 0 {
        tracing::warn!(failures, total = len, "Partial metadata enrichment");
    }

    results
}

/// Enriches read records, returning the new records and how many changed
pub async fn enrich_records(
    provider: Arc<dyn MetadataProvider>,
    records: Vec<BookRecord>,
) -> (Vec<BookRecord>, usize) {
    let queries: Vec<_> = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record_needs_lookup(record))
        .map(|(i, record)| (i, record.title.clone(), record.author.clone()))
        .collect();

    if queries.is_empty() {
        return (records, 0);
    }

    let found = lookup_all(provider, queries, records.len()).await;

    let mut changed = 0;
    let enriched = records
        .iter()
        .zip(found)
        .map(|(record, metadata)| match metadata {
            Some(metadata) => {
                let enriched = apply_to_record(record, &metadata);
                if enriched != *record {
                    changed += 1;
                }
                enriched
            }
            None => record.clone(),
        })
        .collect();

    tracing::info!(changed, "Enriched read records");
    (enriched, changed)
}

/// Enriches candidate seeds before scoring
pub async fn enrich_candidates(
    provider: Arc<dyn MetadataProvider>,
    seeds: Vec<CandidateSeed>,
) -> Vec<CandidateSeed> {
    let queries: Vec<_> = seeds
        .iter()
        .enumerate()
        .filter(|(_, seed)| !seed.title.trim().is_empty() && seed_needs_lookup(seed))
        .map(|(i, seed)| (i, seed.title.clone(), seed.author.clone()))
        .collect();

    if queries.is_empty() {
        return seeds;
    }

    let found = lookup_all(provider, queries, seeds.len()).await;

    seeds
        .iter()
        .zip(found)
        .map(|(seed, metadata)| match metadata {
            Some(metadata) => apply_to_seed(seed, &metadata),
            None => seed.clone(),
        })
        .collect()
}
