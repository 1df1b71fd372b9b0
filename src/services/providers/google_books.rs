/// Google Books API provider
///
/// Looks up volumes by title and author and maps the first match to
/// [`BookMetadata`]. Lookups (including misses) are memoised in Redis so
/// repeated runs over the same reading log do not re-query the API.
///
/// API Flow:
/// `GET {api_url}/books/v1/volumes?q=intitle:{title} inauthor:{author}&maxResults=1&key=..`
use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::BookMetadata,
    services::providers::MetadataProvider,
};

const LOOKUP_CACHE_TTL: u64 = 604800; // 1 week

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Vec<Volume>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Volume {
    volume_info: VolumeInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VolumeInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    authors: Vec<String>,
    average_rating: Option<f64>,
    ratings_count: Option<i64>,
    #[serde(default)]
    categories: Vec<String>,
    image_links: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageLinks {
    thumbnail: Option<String>,
    small_thumbnail: Option<String>,
}

impl From<VolumeInfo> for BookMetadata {
    fn from(info: VolumeInfo) -> Self {
        let cover_url = info
            .image_links
            .and_then(|links| links.thumbnail.or(links.small_thumbnail));

        BookMetadata {
            title: info.title,
            authors: info.authors,
            average_rating: info.average_rating.filter(|r| r.is_finite() && *r > 0.0),
            ratings_count: info.ratings_count,
            categories: info.categories,
            cover_url,
        }
    }
}

fn search_query(title: &str, author: &str) -> String {
    let author = author.trim();
    if author.is_empty() {
        format!("intitle:{}", title.trim())
    } else {
        format!("intitle:{} inauthor:{}", title.trim(), author)
    }
}

#[derive(Clone)]
pub struct GoogleBooksProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    cache: Cache,
}

impl GoogleBooksProvider {
    pub fn new(cache: Cache, api_key: Option<String>, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            cache,
        }
    }

    async fn fetch_volume(&self, title: &str, author: &str) -> AppResult<Option<BookMetadata>> {
        let url = format!("{}/books/v1/volumes", self.api_url.trim_end_matches('/'));

        let mut query = vec![
            ("q", search_query(title, author)),
            ("maxResults", "1".to_string()),
            ("printType", "books".to_string()),
        ];
        if let Some(key) = &self.api_key {
            query.push(("key", key.clone()));
        }

        let response = self.http_client.get(&url).query(&query).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "Google Books API returned status {}: {}",
                status, body
            )));
        }

        let volumes: VolumesResponse = response.json().await?;
        let metadata = volumes
            .items
            .into_iter()
            .next()
            .map(|volume| BookMetadata::from(volume.volume_info));

        tracing::info!(
            title = %title,
            author = %author,
            found = metadata.is_some(),
            provider = "google_books",
            "Book lookup completed"
        );

        Ok(metadata)
    }
}

#[async_trait::async_trait]
impl MetadataProvider for GoogleBooksProvider {
    async fn lookup(&self, title: &str, author: &str) -> AppResult<Option<BookMetadata>> {
        if title.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Lookup title cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::BookLookup {
                title: title.to_string(),
                author: author.to_string(),
            },
            LOOKUP_CACHE_TTL,
            self.fetch_volume(title, author)
        )
    }

    fn name(&self) -> &'static str {
        "google_books"
    }
}
