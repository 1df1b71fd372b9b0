use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One spreadsheet row as header → cell text
pub type RawRow = HashMap<String, String>;

/// Renders a JSON cell the way a spreadsheet shows it
///
/// Numbers and booleans become their text, `null` becomes an empty cell.
pub fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// `deserialize_with` for rows whose cells may be any JSON value
pub fn deserialize_rows<'de, D>(deserializer: D) -> Result<Vec<RawRow>, D::Error>
where
    D: Deserializer<'de>,
{
    let rows = Vec::<HashMap<String, Value>>::deserialize(deserializer)?;
    Ok(rows
        .into_iter()
        .map(|row| row.into_iter().map(|(k, v)| (k, cell_text(v))).collect())
        .collect())
}

/// Builds the identity key used for read-history matching and de-duplication
///
/// The key is `title|||author`, trimmed and lowercased.
pub fn identity_key(title: &str, author: &str) -> String {
    format!(
        "{}|||{}",
        title.trim().to_lowercase(),
        author.trim().to_lowercase()
    )
}

/// Optional details carried alongside a record for persistence
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BookDetails {
    pub year_read: Option<i32>,
    pub book_type: Option<String>,
    pub cover_url: Option<String>,
    pub num_ratings: Option<i64>,
    pub num_editions: Option<i64>,
}

/// A normalized entry of the user's read history
///
/// Ratings use the 0–5 scale where `0` means unrated/unknown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub source: String,
    pub user_rating: f64,
    pub external_rating: f64,
    pub genre: String,
    #[serde(default)]
    pub details: BookDetails,
}

impl BookRecord {
    pub fn identity_key(&self) -> String {
        identity_key(&self.title, &self.author)
    }

    /// True when both title and author are present
    pub fn is_identifiable(&self) -> bool {
        !self.title.trim().is_empty() && !self.author.trim().is_empty()
    }

    /// `user_rating − external_rating` when both ratings are known
    pub fn ratings_gap(&self) -> Option<f64> {
        (self.user_rating > 0.0 && self.external_rating > 0.0)
            .then(|| self.user_rating - self.external_rating)
    }

    pub fn ratings_trend(&self) -> Option<RatingsTrend> {
        self.ratings_gap().map(|gap| {
            if gap > 0.0 {
                RatingsTrend::Over
            } else {
                RatingsTrend::Under
            }
        })
    }
}

/// Whether the user rated a book above or below the crowd
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RatingsTrend {
    Over,
    Under,
}

impl RatingsTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingsTrend::Over => "Over",
            RatingsTrend::Under => "Under",
        }
    }
}

/// A read book as persisted to `books_read_ratings`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct EnrichedBook {
    pub identity_key: String,
    pub title: String,
    pub author: String,
    pub source: String,
    pub genre: String,
    pub book_type: Option<String>,
    pub year_read: Option<i32>,
    pub rating: Option<f64>,
    pub goodreads_rating: Option<f64>,
    pub cover_url: Option<String>,
    pub num_ratings: Option<i64>,
    pub num_editions: Option<i64>,
    pub ratings_gap: Option<f64>,
    pub ratings_trend: Option<String>,
}

impl From<&BookRecord> for EnrichedBook {
    fn from(record: &BookRecord) -> Self {
        let known = |value: f64| (value > 0.0).then_some(value);

        Self {
            identity_key: record.identity_key(),
            title: record.title.clone(),
            author: record.author.clone(),
            source: record.source.clone(),
            genre: record.genre.clone(),
            book_type: record.details.book_type.clone(),
            year_read: record.details.year_read,
            rating: known(record.user_rating),
            goodreads_rating: known(record.external_rating),
            cover_url: record.details.cover_url.clone(),
            num_ratings: record.details.num_ratings,
            num_editions: record.details.num_editions,
            ratings_gap: record.ratings_gap(),
            ratings_trend: record.ratings_trend().map(|t| t.as_str().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Rows(#[serde(deserialize_with = "deserialize_rows")] Vec<RawRow>);

    #[test]
    fn test_rows_accept_numeric_and_null_cells() {
        let Rows(rows) = serde_json::from_str(
            r#"[{"Title": "Dune", "Rating": 5, "Goodreads Rating": 4.3, "Genre": null, "Owned": true}]"#,
        )
        .unwrap();
        assert_eq!(rows[0]["Title"], "Dune");
        assert_eq!(rows[0]["Rating"], "5");
        assert_eq!(rows[0]["Goodreads Rating"], "4.3");
        assert_eq!(rows[0]["Genre"], "");
        assert_eq!(rows[0]["Owned"], "true");
    }

    fn record(user_rating: f64, external_rating: f64) -> BookRecord {
        BookRecord {
            title: "Normal People".to_string(),
            author: "Sally Rooney".to_string(),
            source: String::new(),
            user_rating,
            external_rating,
            genre: "literary fiction".to_string(),
            details: BookDetails::default(),
        }
    }

    #[test]
    fn test_identity_key_is_lowercase_and_trimmed() {
        assert_eq!(
            identity_key("  Normal People ", "Sally ROONEY"),
            "normal people|||sally rooney"
        );
    }

    #[test]
    fn test_ratings_trend_over() {
        let book = record(4.5, 3.9);
        assert!(book.ratings_gap().unwrap() > 0.0);
        assert_eq!(book.ratings_trend(), Some(RatingsTrend::Over));
    }

    #[test]
    fn test_ratings_trend_equal_is_under() {
        assert_eq!(record(4.0, 4.0).ratings_trend(), Some(RatingsTrend::Under));
    }

    #[test]
    fn test_ratings_gap_requires_both_ratings() {
        assert_eq!(record(4.0, 0.0).ratings_gap(), None);
        assert_eq!(record(0.0, 4.0).ratings_trend(), None);
    }

    #[test]
    fn test_enriched_book_drops_unknown_ratings() {
        let enriched = EnrichedBook::from(&record(0.0, 3.8));
        assert_eq!(enriched.rating, None);
        assert_eq!(enriched.goodreads_rating, Some(3.8));
        assert_eq!(enriched.identity_key, "normal people|||sally rooney");
        assert_eq!(enriched.ratings_trend, None);
    }
}
