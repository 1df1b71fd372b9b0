use std::collections::{HashMap, HashSet};

use crate::models::{split_genres, BookRecord, SourcePerformance, UserProfile};

const FAVORITE_AUTHOR_THRESHOLD: f64 = 4.0;
const MIN_GROUP_SAMPLES: usize = 2;

/// Running mean over a stream of values
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Single-pass builder for [`UserProfile`]
///
/// Only running sums and counts are kept per key, so records can be pushed
/// as they stream in.
#[derive(Debug, Default)]
pub struct ProfileBuilder {
    read_keys: HashSet<String>,
    user_ratings: MeanAccumulator,
    external_ratings: MeanAccumulator,
    favorite_authors: Vec<String>,
    favorite_lookup: HashSet<String>,
    genres: HashMap<String, MeanAccumulator>,
    sources: HashMap<String, MeanAccumulator>,
    source_order: Vec<String>,
}

impl ProfileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: &BookRecord) {
        if record.is_identifiable() {
            self.read_keys.insert(record.identity_key());
        }

        let rating = record.user_rating;
        if rating <= 0.0 {
            return;
        }
        self.user_ratings.push(rating);
        if record.external_rating > 0.0 {
            self.external_ratings.push(record.external_rating);
        }

        let author = record.author.trim();
        if rating >= FAVORITE_AUTHOR_THRESHOLD
            && !author.is_empty()
            && self.favorite_lookup.insert(author.to_lowercase())
        {
            self.favorite_authors.push(author.to_string());
        }

        for genre in split_genres(&record.genre) {
            self.genres.entry(genre).or_default().push(rating);
        }

        let source = record.source.trim();
        if !source.is_empty() {
            if !self.sources.contains_key(source) {
                self.source_order.push(source.to_string());
            }
            self.sources
                .entry(source.to_string())
                .or_default()
                .push(rating);
        }
    }

    pub fn finish(self) -> UserProfile {
        let average_user_rating = self.user_ratings.mean().unwrap_or(0.0);
        let average_external_rating = self.external_ratings.mean().unwrap_or(0.0);

        // Bias is only meaningful when every user rating has a crowd counterpart
        let rating_bias = if self.user_ratings.count > 0
            && self.user_ratings.count == self.external_ratings.count
        {
            average_user_rating - average_external_rating
        } else {
            0.0
        };

        let genre_preferences = self
            .genres
            .into_iter()
            .filter(|(_, acc)| acc.count >= MIN_GROUP_SAMPLES)
            .filter_map(|(genre, acc)| acc.mean().map(|mean| (genre, mean)))
            .collect();

        let source_performance = self
            .source_order
            .into_iter()
            .filter_map(|source| {
                let acc = self.sources.get(&source)?;
                if acc.count < MIN_GROUP_SAMPLES {
                    return None;
                }
                Some(SourcePerformance {
                    average_rating: acc.mean()?,
                    sample_size: acc.count,
                    source,
                })
            })
            .collect();

        UserProfile {
            read_keys: self.read_keys,
            average_user_rating,
            average_external_rating,
            rating_bias,
            favorite_authors: self.favorite_authors,
            genre_preferences,
            source_performance,
            rated_count: self.user_ratings.count,
        }
    }
}

/// Builds a profile from a finite record stream
pub fn build_profile<'a, I>(records: I) -> UserProfile
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut builder = ProfileBuilder::new();
    for record in records {
        builder.push(record);
    }
    let profile = builder.finish();

    tracing::info!(
        read = profile.read_count(),
        rated = profile.rated_count,
        favorite_authors = profile.favorite_authors.len(),
        genres = profile.genre_preferences.len(),
        sources = profile.source_performance.len(),
        rating_bias = profile.rating_bias,
        "Built user profile"
    );

    profile
}
