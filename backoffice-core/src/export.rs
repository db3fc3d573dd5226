//! Tabular export of the filtered view.

use crate::error::ExportError;
use crate::record::{Column, Record};
use chrono::{NaiveDate, Utc};
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Export format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[Self::Csv, Self::Tsv, Self::Json]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Tsv => "text/tab-separated-values",
            Self::Json => "application/json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What to export: a format and an optional cap on exported records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ExportRequest {
    pub fn new(format: ExportFormat) -> Self {
        Self {
            format,
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// A finished export, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub data: Vec<u8>,
    pub mime_type: &'static str,
    pub filename: String,
    pub row_count: usize,
}

impl ExportArtifact {
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

/// Converts records into a tabular artifact.
pub struct Exporter;

impl Exporter {
    /// Export with today's date in the filename.
    pub fn export<R: Record>(
        records: &[&R],
        request: &ExportRequest,
    ) -> Result<ExportArtifact, ExportError> {
        Self::export_dated(records, request, Utc::now().date_naive())
    }

    pub fn export_dated<R: Record>(
        records: &[&R],
        request: &ExportRequest,
        date: NaiveDate,
    ) -> Result<ExportArtifact, ExportError> {
        let take = request.limit.unwrap_or(records.len());
        let rows: Vec<BTreeMap<String, String>> = records
            .iter()
            .take(take)
            .flat_map(|record| record.export_rows())
            .collect();
        let columns = R::export_columns();

        let data = match request.format {
            ExportFormat::Csv => Self::delimited(columns, &rows, b',')?,
            ExportFormat::Tsv => Self::delimited(columns, &rows, b'\t')?,
            ExportFormat::Json => Self::json(columns, &rows)?,
        };

        Ok(ExportArtifact {
            data,
            mime_type: request.format.mime_type(),
            filename: filename(R::KIND.key(), request.format, date),
            row_count: rows.len(),
        })
    }

    fn delimited(
        columns: &[Column],
        rows: &[BTreeMap<String, String>],
        delimiter: u8,
    ) -> Result<Vec<u8>, ExportError> {
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        writer.write_record(columns.iter().map(|c| c.label))?;
        for row in rows {
            writer.write_record(
                columns
                    .iter()
                    .map(|c| row.get(c.key).map(String::as_str).unwrap_or("")),
            )?;
        }
        writer.flush().map_err(csv::Error::from)?;
        writer
            .into_inner()
            .map_err(|e| ExportError::Buffer(e.to_string()))
    }

    fn json(columns: &[Column], rows: &[BTreeMap<String, String>]) -> Result<Vec<u8>, ExportError> {
        let objects: Vec<Value> = rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = columns
                    .iter()
                    .map(|c| {
                        let value = row.get(c.key).cloned().unwrap_or_default();
                        (c.label.to_string(), Value::String(value))
                    })
                    .collect();
                Value::Object(object)
            })
            .collect();
        Ok(serde_json::to_vec_pretty(&objects)?)
    }
}

/// `{resource}_export_{YYYY-MM-DD}.{ext}`
pub fn filename(resource: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}_export_{}.{}",
        resource,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}
