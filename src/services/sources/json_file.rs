use std::path::PathBuf;

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::{cell_text, deserialize_rows, RawRow},
    services::sources::{rows_from_values, RecordSource},
};

/// Either a values grid (as exported from Sheets) or a list of keyed rows
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Export {
    Grid { values: Vec<Vec<Value>> },
    Rows(#[serde(deserialize_with = "deserialize_rows")] Vec<RawRow>),
}

/// Reads a local JSON export of the reading log
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn parse_export(text: &str) -> AppResult<Vec<RawRow>> {
    let export: Export = serde_json::from_str(text)
        .map_err(|e| AppError::InvalidInput(format!("Malformed reading log export: {}", e)))?;

    Ok(match export {
        Export::Grid { values } => rows_from_values(
            values
                .into_iter()
                .map(|row| row.into_iter().map(cell_text).collect())
                .collect(),
        ),
        Export::Rows(rows) => rows,
    })
}

#[async_trait::async_trait]
impl RecordSource for JsonFileSource {
    async fn fetch_rows(&self) -> AppResult<Vec<RawRow>> {
        let text = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            AppError::Internal(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let rows = parse_export(&text)?;
        tracing::info!(path = %self.path.display(), rows = rows.len(), "Loaded reading log export");
        Ok(rows)
    }

    fn name(&self) -> &'static str {
        "json_file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid_export() {
        let rows =
            parse_export(r#"{"values": [["Title", "Rating"], ["Dune", "5"]]}"#).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Rating"], "5");
    }

    #[test]
    fn test_parse_row_export() {
        let rows = parse_export(r#"[{"Title": "Dune", "Author": "Frank Herbert"}]"#).unwrap();
        assert_eq!(rows[0]["Author"], "Frank Herbert");
    }

    #[test]
    fn test_numeric_cells_do_not_abort_the_export() {
        let rows = parse_export(
            r#"[{"Title": "Dune", "Rating": 5}, {"Title": "Emma", "Rating": null}]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Rating"], "5");
        assert_eq!(rows[1]["Rating"], "");

        let rows =
            parse_export(r#"{"values": [["Title", "Rating"], ["Dune", 4.5]]}"#).unwrap();
        assert_eq!(rows[0]["Rating"], "4.5");
    }

    #[test]
    fn test_parse_malformed_export() {
        assert!(matches!(
            parse_export("{not json"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let source = JsonFileSource::new("/nonexistent/reading-log.json");
        assert!(source.fetch_rows().await.is_err());
    }
}
