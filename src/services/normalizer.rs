//! Record Normalizer
//!
//! Turns heterogeneous spreadsheet rows into canonical [`BookRecord`]s. Numeric
//! cells are parsed leniently: anything unparsable becomes `0` (ratings) or
//! absent (counts), never an error.
use crate::models::{BookDetails, BookRecord, RawRow};

const TITLE_KEYS: &[&str] = &["title"];
const AUTHOR_KEYS: &[&str] = &["author"];
const SOURCE_KEYS: &[&str] = &["source"];
const USER_RATING_KEYS: &[&str] = &["rating", "user rating", "user_rating"];
const EXTERNAL_RATING_KEYS: &[&str] = &[
    "goodreads rating",
    "goodreads_rating",
    "external rating",
    "external_rating",
];
const GENRE_KEYS: &[&str] = &["genre", "genres"];
const YEAR_READ_KEYS: &[&str] = &["year read", "year_read"];
const TYPE_KEYS: &[&str] = &["type"];
const COVER_KEYS: &[&str] = &["cover_url", "cover url"];
const NUM_RATINGS_KEYS: &[&str] = &["num_ratings", "ratings count"];
const NUM_EDITIONS_KEYS: &[&str] = &["num_editions", "editions"];

const MAX_RATING: f64 = 5.0;

/// Why a row did not produce a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    EmptyTitle,
}

/// Normalizes one row, or reports why it was skipped
pub fn normalize_row(row: &RawRow) -> Result<BookRecord, SkipReason> {
    let title = field(row, TITLE_KEYS);
    if title.is_empty() {
        return Err(SkipReason::EmptyTitle);
    }

    let details = BookDetails {
        year_read: non_empty(field(row, YEAR_READ_KEYS)).and_then(parse_year),
        book_type: non_empty(field(row, TYPE_KEYS)),
        cover_url: non_empty(field(row, COVER_KEYS)),
        num_ratings: non_empty(field(row, NUM_RATINGS_KEYS)).and_then(|v| parse_count(&v)),
        num_editions: non_empty(field(row, NUM_EDITIONS_KEYS)).and_then(|v| parse_count(&v)),
    };

    Ok(BookRecord {
        title,
        author: field(row, AUTHOR_KEYS),
        source: field(row, SOURCE_KEYS),
        user_rating: parse_rating(&field(row, USER_RATING_KEYS)),
        external_rating: parse_rating(&field(row, EXTERNAL_RATING_KEYS)),
        genre: field(row, GENRE_KEYS),
        details,
    })
}

/// Normalizes every row, logging and dropping the ones that cannot be used
pub fn normalize_rows<'a, I>(rows: I) -> (Vec<BookRecord>, usize)
where
    I: IntoIterator<Item = &'a RawRow>,
{
    let mut records = Vec::new();
    let mut skipped = 0;

    for (index, row) in rows.into_iter().enumerate() {
        match normalize_row(row) {
            Ok(record) => records.push(record),
            Err(reason) => {
                skipped += 1;
                tracing::warn!(row = index, reason = ?reason, "Skipping spreadsheet row");
            }
        }
    }

    (records, skipped)
}

/// Parses a 0–5 rating; malformed or out-of-range values become `0`
///
/// Accepts scraped forms such as `"4.12 avg rating — 1,234 ratings"` by
/// reading the leading numeric token.
pub fn parse_rating(raw: &str) -> f64 {
    let cleaned = raw.replace("really liked it", "");
    let token: String = cleaned
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match token.parse::<f64>() {
        Ok(value) if value.is_finite() && (0.0..=MAX_RATING).contains(&value) => value,
        _ => 0.0,
    }
}

/// Parses counts such as `"1,234 ratings"` or `"87 editions"`
pub fn parse_count(raw: &str) -> Option<i64> {
    let digits: String = raw
        .trim()
        .replace(',', "")
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn parse_year(raw: String) -> Option<i32> {
    // Sheets exports numbers as "2023" or "2023.0"
    raw.trim()
        .split('.')
        .next()
        .and_then(|year| year.parse().ok())
}

/// Looks up the first present alias, matching headers case-insensitively
fn field(row: &RawRow, aliases: &[&str]) -> String {
    aliases
        .iter()
        .find_map(|alias| {
            row.iter()
                .find(|(key, value)| {
                    key.trim().eq_ignore_ascii_case(alias) && !value.trim().is_empty()
                })
                .map(|(_, value)| value.trim().to_string())
        })
        .unwrap_or_default()
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
