//! Shared fixtures for harp-rp integration tests

#![allow(dead_code)]

use harp_rp::model::LogisticModel;
use harp_rp::pipeline::ModelHandle;
use std::path::PathBuf;

/// Column headers as exported by the upstream dataset, index column first
pub const SOURCE_HEADERS: [&str; 27] = [
    "Unnamed: 0",
    "Age",
    "Cholesterol",
    "Heart rate",
    "Diabetes",
    "Family History",
    "Smoking",
    "Obesity",
    "Alcohol Consumption",
    "Exercise Hours Per Week",
    "Diet",
    "Previous Heart Problems",
    "Medication Use",
    "Stress Level",
    "Sedentary Hours Per Day",
    "Income",
    "BMI",
    "Triglycerides",
    "Physical Activity Days Per Week",
    "Sleep Hours Per Day",
    "Blood sugar",
    "CK-MB",
    "Troponin",
    "Gender",
    "Systolic blood pressure",
    "Diastolic blood pressure",
    "id",
];

/// Fixture classifier: p = sigmoid(10 * age - 5), every other weight zero
pub fn fixture_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("model.json")
}

pub fn fixture_model() -> ModelHandle {
    let model = LogisticModel::load(&fixture_model_path()).expect("fixture model must load");
    ModelHandle::ready(model)
}

/// Age giving a clearly low-risk probability under the fixture model
pub const LOW_RISK_AGE: &str = "0.2";
/// Age giving a clearly high-risk probability under the fixture model
pub const HIGH_RISK_AGE: &str = "0.8";

fn default_cell(header: &str, index: usize, id: i64) -> String {
    match header {
        "Unnamed: 0" => index.to_string(),
        "id" => id.to_string(),
        "Gender" => "Male".to_string(),
        "Diabetes" | "Family History" | "Smoking" | "Obesity" | "Alcohol Consumption"
        | "Previous Heart Problems" | "Medication Use" => "0".to_string(),
        "Stress Level" => "5".to_string(),
        "Physical Activity Days Per Week" => "3".to_string(),
        "Heart rate" => "0.05".to_string(),
        _ => "0.5".to_string(),
    }
}

/// One CSV row; `overrides` replaces cells by header name
pub fn csv_row(index: usize, id: i64, overrides: &[(&str, &str)]) -> String {
    SOURCE_HEADERS
        .iter()
        .map(|header| {
            overrides
                .iter()
                .find(|(h, _)| h == header)
                .map(|(_, v)| v.to_string())
                .unwrap_or_else(|| default_cell(header, index, id))
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// CSV document with the source headers and the given rows
pub fn csv_document(rows: &[String]) -> String {
    let mut doc = SOURCE_HEADERS.join(",");
    doc.push('\n');
    for row in rows {
        doc.push_str(row);
        doc.push('\n');
    }
    doc
}

/// CSV document with one column removed from header and rows
pub fn csv_document_without(column: &str, ids: &[i64]) -> String {
    let keep: Vec<usize> = SOURCE_HEADERS
        .iter()
        .enumerate()
        .filter(|(_, h)| **h != column)
        .map(|(i, _)| i)
        .collect();

    let mut lines = vec![keep
        .iter()
        .map(|i| SOURCE_HEADERS[*i])
        .collect::<Vec<_>>()
        .join(",")];
    for (index, id) in ids.iter().enumerate() {
        let cells: Vec<String> = keep
            .iter()
            .map(|i| default_cell(SOURCE_HEADERS[*i], index, *id))
            .collect();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}
