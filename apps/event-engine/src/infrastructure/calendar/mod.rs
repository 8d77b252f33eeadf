//! Local economic-calendar extract adapter.
//!
//! Reads the cached CSV extract (`Country, Date, Title, Impact`) used when
//! the live macro calendar is unavailable. Dates are strictly `MM-DD-YYYY`;
//! rows that fail that format are skipped and counted, never fatal. Fully
//! blank rows are skipped silently.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::application::ports::{MacroCalendar, MacroFetch, RawMacroEvent};

/// Date format of the calendar extract.
const EXTRACT_DATE_FORMAT: &str = "%m-%d-%Y";

/// One row of the extract. The `Country` column carries the currency code
/// the release concerns.
#[derive(Debug, Default, Deserialize)]
struct ExtractRow {
    #[serde(rename = "Country", default)]
    country: Option<String>,
    #[serde(rename = "Date", default)]
    date: Option<String>,
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Impact", default)]
    impact: Option<String>,
}

impl ExtractRow {
    fn is_blank(&self) -> bool {
        [&self.country, &self.date, &self.title, &self.impact]
            .iter()
            .all(|field| field.as_deref().is_none_or(|v| v.trim().is_empty()))
    }
}

/// Macro calendar backed by a local CSV extract.
pub struct CsvMacroCalendar {
    path: PathBuf,
}

impl CsvMacroCalendar {
    /// Create an adapter over the extract at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse the extract contents.
    fn parse(contents: &str, path: &Path) -> MacroFetch {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(contents.as_bytes());

        let mut fetch = MacroFetch::default();
        for result in reader.deserialize::<ExtractRow>() {
            let row = match result {
                Ok(row) => row,
                Err(error) => {
                    tracing::warn!(path = %path.display(), error = %error, "unreadable extract row");
                    fetch.malformed_rows += 1;
                    continue;
                }
            };

            if row.is_blank() {
                continue;
            }

            let date_ok = row
                .date
                .as_deref()
                .is_some_and(|d| NaiveDate::parse_from_str(d.trim(), EXTRACT_DATE_FORMAT).is_ok());
            if !date_ok {
                fetch.malformed_rows += 1;
                continue;
            }

            fetch.events.push(RawMacroEvent {
                date: row.date.unwrap_or_default(),
                event: row.title.filter(|t| !t.is_empty()),
                currency: row.country.filter(|c| !c.is_empty()),
                impact: row.impact.filter(|i| !i.is_empty()),
                importance: None,
            });
        }

        fetch
    }
}

#[async_trait]
impl MacroCalendar for CsvMacroCalendar {
    async fn fetch(&self) -> MacroFetch {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %error,
                    "failed to read calendar extract"
                );
                return MacroFetch::default();
            }
        };

        let fetch = Self::parse(&contents, &self.path);
        if fetch.malformed_rows > 0 {
            tracing::warn!(
                path = %self.path.display(),
                count = fetch.malformed_rows,
                "calendar extract rows skipped as malformed"
            );
        }
        fetch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_extract(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn parses_rows_and_counts_malformed_dates() {
        // 10 data rows, 2 with unparseable dates.
        let file = write_extract(
            "Country,Date,Title,Impact\n\
             USD,03-14-2025,CPI Release,High\n\
             USD,03-15-2025,Retail Sales,Medium\n\
             USD,2025-03-16,Wrong Date Format,High\n\
             EUR,03-17-2025,ECB Rate Decision,High\n\
             USD,03-18-2025,Housing Starts,Low\n\
             USD,not-a-date,Broken Row,High\n\
             USD,03-20-2025,Jobless Claims,Medium\n\
             GBP,03-21-2025,BoE Minutes,Low\n\
             USD,03-22-2025,PMI Flash,Medium\n\
             USD,03-23-2025,Consumer Sentiment,Low\n",
        );

        let fetch = CsvMacroCalendar::new(file.path()).fetch().await;
        assert_eq!(fetch.events.len(), 8);
        assert_eq!(fetch.malformed_rows, 2);
        assert_eq!(fetch.events[0].event.as_deref(), Some("CPI Release"));
        assert_eq!(fetch.events[0].currency.as_deref(), Some("USD"));
        assert_eq!(fetch.events[0].impact.as_deref(), Some("High"));
    }

    #[tokio::test]
    async fn blank_rows_are_skipped_silently() {
        let file = write_extract(
            "Country,Date,Title,Impact\n\
             ,,,\n\
             USD,03-14-2025,CPI Release,High\n\
             ,,,\n",
        );

        let fetch = CsvMacroCalendar::new(file.path()).fetch().await;
        assert_eq!(fetch.events.len(), 1);
        assert_eq!(fetch.malformed_rows, 0);
    }

    #[tokio::test]
    async fn missing_file_degrades_to_empty() {
        let fetch = CsvMacroCalendar::new("/nonexistent/economic_calendar.csv")
            .fetch()
            .await;
        assert!(fetch.events.is_empty());
        assert_eq!(fetch.malformed_rows, 0);
    }
}
