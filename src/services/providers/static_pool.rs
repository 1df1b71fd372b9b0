use std::path::PathBuf;

use crate::{
    error::{AppError, AppResult},
    models::CandidateSeed,
    services::providers::CandidateProvider,
};

/// Fixed candidate pool
#[derive(Debug, Clone)]
pub struct StaticCandidatePool {
    seeds: Vec<CandidateSeed>,
}

impl StaticCandidatePool {
    pub fn new(seeds: Vec<CandidateSeed>) -> Self {
        Self { seeds }
    }

    /// Curated shortlist used when no pool file is configured
    pub fn curated() -> Self {
        let seed = |title: &str, author: &str, source: &str, rating: f64, genre: &str| {
            CandidateSeed {
                title: title.to_string(),
                author: author.to_string(),
                source: source.to_string(),
                external_rating: rating,
                genre: Some(genre.to_string()),
                cover_url: None,
            }
        };

        Self::new(vec![
            seed(
                "Intermezzo",
                "Sally Rooney",
                "Goodreads Choice Awards 2024",
                3.95,
                "literary fiction",
            ),
            seed(
                "James",
                "Percival Everett",
                "Pulitzer Prize for Fiction 2025",
                4.47,
                "historical fiction",
            ),
            seed(
                "Orbital",
                "Samantha Harvey",
                "Booker Prize 2024",
                3.54,
                "literary fiction",
            ),
            seed(
                "The Ministry of Time",
                "Kaliane Bradley",
                "Goodreads Choice Awards 2024",
                3.79,
                "science fiction",
            ),
            seed(
                "Tomorrow, and Tomorrow, and Tomorrow",
                "Gabrielle Zevin",
                "Goodreads Choice Awards 2022",
                4.15,
                "literary fiction",
            ),
            seed(
                "Piranesi",
                "Susanna Clarke",
                "Women's Prize for Fiction 2021",
                4.23,
                "fantasy",
            ),
            seed(
                "Klara and the Sun",
                "Kazuo Ishiguro",
                "Booker Prize Longlist 2021",
                3.78,
                "science fiction",
            ),
            seed(
                "Demon Copperhead",
                "Barbara Kingsolver",
                "Pulitzer Prize for Fiction 2023",
                4.44,
                "coming-of-age",
            ),
        ])
    }
}

#[async_trait::async_trait]
impl CandidateProvider for StaticCandidatePool {
    async fn fetch_candidates(&self) -> AppResult<Vec<CandidateSeed>> {
        Ok(self.seeds.clone())
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Candidate pool kept in a JSON file: an array of seeds
#[derive(Debug, Clone)]
pub struct CandidatePoolFile {
    path: PathBuf,
}

impl CandidatePoolFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl CandidateProvider for CandidatePoolFile {
    async fn fetch_candidates(&self) -> AppResult<Vec<CandidateSeed>> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::Internal(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let seeds: Vec<CandidateSeed> = serde_json::from_str(&text)
            .map_err(|e| AppError::InvalidInput(format!("Malformed candidate pool: {}", e)))?;

        tracing::info!(path = %self.path.display(), candidates = seeds.len(), "Loaded candidate pool");
        Ok(seeds)
    }

    fn name(&self) -> &'static str {
        "pool_file"
    }
}
