/// Spreadsheet collaborators
///
/// A record source yields the raw rows of the user's reading log. Sheets are
/// exported as a header row followed by data rows; [`rows_from_values`] turns
/// that grid into keyed rows for the normalizer.
use crate::{error::AppResult, models::RawRow};

pub mod google_sheets;
pub mod json_file;

pub use google_sheets::GoogleSheetsSource;
pub use json_file::JsonFileSource;

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecordSource: Send + Sync {
    /// Fetch every row of the reading log
    async fn fetch_rows(&self) -> AppResult<Vec<RawRow>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fixed rows, for previews and tests
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Vec<RawRow>,
}

impl InMemorySource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        Self { rows }
    }
}

#[async_trait::async_trait]
impl RecordSource for InMemorySource {
    async fn fetch_rows(&self) -> AppResult<Vec<RawRow>> {
        Ok(self.rows.clone())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

/// Converts a header-first value grid into keyed rows
///
/// Short rows are padded with empty cells; blank header cells are ignored.
pub fn rows_from_values(values: Vec<Vec<String>>) -> Vec<RawRow> {
    let mut iter = values.into_iter();
    let Some(header) = iter.next() else {
        return Vec::new();
    };

    iter.filter(|row| row.iter().any(|cell| !cell.trim().is_empty()))
        .map(|row| {
            header
                .iter()
                .enumerate()
                .filter(|(_, name)| !name.trim().is_empty())
                .map(|(i, name)| (name.clone(), row.get(i).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}
