//! Raw tabular input
//!
//! The uploaded file is read as CSV with a header row. Cell values are kept
//! as text (surrounding whitespace trimmed); typing happens in
//! [`super::schema`].

use super::PipelineError;
use std::io::Read;

/// Header plus rows of text cells, every row as wide as the header
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Build a table from already-split cells
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, PipelineError> {
        if headers.is_empty() {
            return Err(PipelineError::MalformedInput(
                "table has no header row".to_string(),
            ));
        }
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(PipelineError::MalformedInput(format!(
                "row {} has {} fields, header has {}",
                i + 1,
                row.len(),
                headers.len()
            )));
        }
        Ok(Self { headers, rows })
    }

    /// Parse CSV content held in memory
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, PipelineError> {
        Self::from_reader(bytes)
    }

    /// Parse CSV from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, PipelineError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(malformed)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(malformed)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows (header excluded)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn malformed(e: csv::Error) -> PipelineError {
    PipelineError::MalformedInput(e.to_string())
}
