//! Schema normalization
//!
//! Canonicalizes column names, drops the serialization index column, types
//! every cell of the clinical attribute set and applies the unit
//! conventions the classifier was trained with.
//!
//! Policies:
//! - Header names are trimmed, lower-cased and whitespace becomes `_`
//!   (`"Heart rate"` → `heart_rate`, `"CK-MB"` → `ck-mb`).
//! - Gender is a lossy binary code: exactly `Male` → 1, any other present
//!   text → 0. The comparison sees the cell after the reader has trimmed
//!   surrounding whitespace, so `" Male"` is coded 1.
//! - Heart rate is multiplied by [`HEART_RATE_SCALE`].
//! - Integer-coded attributes are truncated toward zero.
//! - A present value that does not parse as a finite number fails the
//!   whole batch; an absent value is recorded as missing.

use super::table::RawTable;
use super::PipelineError;
use std::collections::HashSet;
use tracing::debug;

/// Record identifier as supplied in the `id` column
pub type RecordId = i64;

/// Canonical name of the identifier column
pub const ID_COLUMN: &str = "id";

/// Gender token coded as 1
pub const MALE_TOKEN: &str = "Male";

/// Heart rate unit conversion to the training data convention
pub const HEART_RATE_SCALE: f64 = 10.0;

/// Cell contents read as "no value"
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "NULL", "null", "None", "<NA>", "#N/A",
    "#NA", "#N/A N/A", "1.#IND", "-1.#IND", "1.#QNAN", "-1.#QNAN",
];

/// How a raw cell is typed during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    /// Finite floating-point measurement
    Continuous,
    /// Flag or small count, truncated to an integer
    IntegerCoded,
    /// Categorical text mapped to {0, 1}
    Gender,
}

/// Clinical attributes every input row must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attribute {
    Age,
    Cholesterol,
    HeartRate,
    Diabetes,
    FamilyHistory,
    Smoking,
    Obesity,
    AlcoholConsumption,
    ExerciseHoursPerWeek,
    Diet,
    PreviousHeartProblems,
    MedicationUse,
    StressLevel,
    SedentaryHoursPerDay,
    Income,
    Bmi,
    Triglycerides,
    PhysicalActivityDaysPerWeek,
    SleepHoursPerDay,
    BloodSugar,
    CkMb,
    Troponin,
    Gender,
    SystolicBloodPressure,
    DiastolicBloodPressure,
}

impl Attribute {
    pub const COUNT: usize = 25;

    /// All attributes in source column order
    pub const ALL: [Attribute; Attribute::COUNT] = [
        Attribute::Age,
        Attribute::Cholesterol,
        Attribute::HeartRate,
        Attribute::Diabetes,
        Attribute::FamilyHistory,
        Attribute::Smoking,
        Attribute::Obesity,
        Attribute::AlcoholConsumption,
        Attribute::ExerciseHoursPerWeek,
        Attribute::Diet,
        Attribute::PreviousHeartProblems,
        Attribute::MedicationUse,
        Attribute::StressLevel,
        Attribute::SedentaryHoursPerDay,
        Attribute::Income,
        Attribute::Bmi,
        Attribute::Triglycerides,
        Attribute::PhysicalActivityDaysPerWeek,
        Attribute::SleepHoursPerDay,
        Attribute::BloodSugar,
        Attribute::CkMb,
        Attribute::Troponin,
        Attribute::Gender,
        Attribute::SystolicBloodPressure,
        Attribute::DiastolicBloodPressure,
    ];

    /// Position in [`Attribute::ALL`] and in record value arrays
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical (normalized) column name
    pub fn column_name(self) -> &'static str {
        match self {
            Attribute::Age => "age",
            Attribute::Cholesterol => "cholesterol",
            Attribute::HeartRate => "heart_rate",
            Attribute::Diabetes => "diabetes",
            Attribute::FamilyHistory => "family_history",
            Attribute::Smoking => "smoking",
            Attribute::Obesity => "obesity",
            Attribute::AlcoholConsumption => "alcohol_consumption",
            Attribute::ExerciseHoursPerWeek => "exercise_hours_per_week",
            Attribute::Diet => "diet",
            Attribute::PreviousHeartProblems => "previous_heart_problems",
            Attribute::MedicationUse => "medication_use",
            Attribute::StressLevel => "stress_level",
            Attribute::SedentaryHoursPerDay => "sedentary_hours_per_day",
            Attribute::Income => "income",
            Attribute::Bmi => "bmi",
            Attribute::Triglycerides => "triglycerides",
            Attribute::PhysicalActivityDaysPerWeek => "physical_activity_days_per_week",
            Attribute::SleepHoursPerDay => "sleep_hours_per_day",
            Attribute::BloodSugar => "blood_sugar",
            Attribute::CkMb => "ck-mb",
            Attribute::Troponin => "troponin",
            Attribute::Gender => "gender",
            Attribute::SystolicBloodPressure => "systolic_blood_pressure",
            Attribute::DiastolicBloodPressure => "diastolic_blood_pressure",
        }
    }

    pub fn kind(self) -> AttributeKind {
        match self {
            Attribute::Diabetes
            | Attribute::FamilyHistory
            | Attribute::Smoking
            | Attribute::Obesity
            | Attribute::AlcoholConsumption
            | Attribute::PreviousHeartProblems
            | Attribute::MedicationUse
            | Attribute::StressLevel
            | Attribute::PhysicalActivityDaysPerWeek => AttributeKind::IntegerCoded,
            Attribute::Gender => AttributeKind::Gender,
            _ => AttributeKind::Continuous,
        }
    }

    pub fn from_column_name(name: &str) -> Option<Self> {
        Attribute::ALL
            .iter()
            .copied()
            .find(|a| a.column_name() == name)
    }
}

/// One typed input row; `None` marks a missing value
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub id: RecordId,
    values: [Option<f64>; Attribute::COUNT],
}

impl NormalizedRecord {
    pub fn new(id: RecordId, values: [Option<f64>; Attribute::COUNT]) -> Self {
        Self { id, values }
    }

    pub fn get(&self, attribute: Attribute) -> Option<f64> {
        self.values[attribute.index()]
    }

    /// Attributes with no value, in source column order
    pub fn missing(&self) -> Vec<Attribute> {
        Attribute::ALL
            .iter()
            .copied()
            .filter(|a| self.get(*a).is_none())
            .collect()
    }
}

/// Canonical form of a source column header
pub fn canonical_column_name(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Index column written by dataframe serializers (`""` or `unnamed:_0`)
pub fn is_index_column(canonical: &str) -> bool {
    canonical.is_empty() || canonical.starts_with("unnamed:")
}

fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell.trim())
}

/// Column positions of the identifier and every attribute
struct ColumnMap {
    id: usize,
    attributes: [usize; Attribute::COUNT],
}

fn map_columns(headers: &[String]) -> Result<ColumnMap, PipelineError> {
    let mut id = None;
    let mut attributes: [Option<usize>; Attribute::COUNT] = [None; Attribute::COUNT];
    let mut ignored = Vec::new();

    for (position, header) in headers.iter().enumerate() {
        let name = canonical_column_name(header);
        if is_index_column(&name) {
            continue;
        }

        if name == ID_COLUMN {
            if id.replace(position).is_some() {
                return Err(PipelineError::Schema(format!("duplicate column '{}'", name)));
            }
        } else if let Some(attribute) = Attribute::from_column_name(&name) {
            if attributes[attribute.index()].replace(position).is_some() {
                return Err(PipelineError::Schema(format!("duplicate column '{}'", name)));
            }
        } else {
            ignored.push(name);
        }
    }

    if !ignored.is_empty() {
        debug!(columns = ?ignored, "Ignoring columns outside the clinical schema");
    }

    let mut missing: Vec<&str> = Vec::new();
    if id.is_none() {
        missing.push(ID_COLUMN);
    }
    missing.extend(
        Attribute::ALL
            .iter()
            .filter(|a| attributes[a.index()].is_none())
            .map(|a| a.column_name()),
    );
    if !missing.is_empty() {
        return Err(PipelineError::Schema(format!(
            "missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut positions = [0usize; Attribute::COUNT];
    for attribute in Attribute::ALL {
        positions[attribute.index()] = attributes[attribute.index()].unwrap_or_default();
    }

    Ok(ColumnMap {
        id: id.unwrap_or_default(),
        attributes: positions,
    })
}

fn parse_id(cell: &str, row_number: usize) -> Result<RecordId, PipelineError> {
    let cell = cell.trim();
    if is_missing(cell) {
        return Err(PipelineError::Schema(format!(
            "row {}: missing identifier",
            row_number
        )));
    }
    if let Ok(id) = cell.parse::<i64>() {
        return Ok(id);
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(PipelineError::Schema(format!(
            "row {}: identifier '{}' is not an integer",
            row_number, cell
        ))),
    }
}

fn parse_value(
    attribute: Attribute,
    cell: &str,
    id: RecordId,
) -> Result<Option<f64>, PipelineError> {
    if is_missing(cell) {
        return Ok(None);
    }

    let kind = attribute.kind();
    if kind == AttributeKind::Gender {
        return Ok(Some(if cell == MALE_TOKEN { 1.0 } else { 0.0 }));
    }

    let value = cell
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| {
            PipelineError::Schema(format!(
                "id {}: column '{}' holds non-numeric value '{}'",
                id,
                attribute.column_name(),
                cell
            ))
        })?;

    let value = match (kind, attribute) {
        (AttributeKind::IntegerCoded, _) => value.trunc(),
        (_, Attribute::HeartRate) => value * HEART_RATE_SCALE,
        _ => value,
    };
    if !value.is_finite() {
        return Err(PipelineError::Schema(format!(
            "id {}: column '{}' value '{}' is out of range after unit conversion",
            id,
            attribute.column_name(),
            cell
        )));
    }
    Ok(Some(value))
}

/// Type every row of the table
///
/// Fails the batch on structural problems (missing or duplicate columns,
/// missing/duplicate identifiers, non-numeric values). Missing attribute
/// values are preserved as `None` for the partitioner.
pub fn normalize(table: &RawTable) -> Result<Vec<NormalizedRecord>, PipelineError> {
    let columns = map_columns(table.headers())?;
    let mut seen = HashSet::with_capacity(table.len());
    let mut records = Vec::with_capacity(table.len());

    for (i, row) in table.rows().iter().enumerate() {
        let id = parse_id(&row[columns.id], i + 1)?;
        if !seen.insert(id) {
            return Err(PipelineError::Schema(format!(
                "identifier {} appears more than once",
                id
            )));
        }

        let mut values = [None; Attribute::COUNT];
        for attribute in Attribute::ALL {
            let cell = &row[columns.attributes[attribute.index()]];
            values[attribute.index()] = parse_value(attribute, cell, id)?;
        }
        records.push(NormalizedRecord::new(id, values));
    }

    debug!(rows = records.len(), "Normalized batch");
    Ok(records)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Source-style headers, as exported by the upstream dataset
    pub(crate) const SOURCE_HEADERS: [&str; 27] = [
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

    /// One source row in header order; `overrides` replaces cells by header
    pub(crate) fn source_row(index: usize, id: i64, overrides: &[(&str, &str)]) -> Vec<String> {
        SOURCE_HEADERS
            .iter()
            .map(|header| {
                if let Some((_, v)) = overrides.iter().find(|(h, _)| h == header) {
                    return v.to_string();
                }
                match *header {
                    "Unnamed: 0" => index.to_string(),
                    "id" => id.to_string(),
                    "Gender" => "Male".to_string(),
                    "Diabetes" | "Family History" | "Smoking" | "Obesity"
                    | "Alcohol Consumption" | "Previous Heart Problems" | "Medication Use" => {
                        "0.0".to_string()
                    }
                    "Stress Level" => "5.0".to_string(),
                    "Physical Activity Days Per Week" => "3.0".to_string(),
                    "Heart rate" => "0.05".to_string(),
                    _ => "0.5".to_string(),
                }
            })
            .collect()
    }

    pub(crate) fn source_table(rows: Vec<Vec<String>>) -> RawTable {
        RawTable::new(SOURCE_HEADERS.iter().map(|h| h.to_string()).collect(), rows).unwrap()
    }

    #[test]
    fn test_canonical_column_name() {
        assert_eq!(canonical_column_name("Heart rate"), "heart_rate");
        assert_eq!(canonical_column_name("  Exercise Hours Per Week "), "exercise_hours_per_week");
        assert_eq!(canonical_column_name("CK-MB"), "ck-mb");
        assert_eq!(canonical_column_name("Unnamed: 0"), "unnamed:_0");
    }

    #[test]
    fn test_every_attribute_round_trips_its_column_name() {
        for attribute in Attribute::ALL {
            assert_eq!(Attribute::from_column_name(attribute.column_name()), Some(attribute));
        }
        assert_eq!(Attribute::ALL.len(), Attribute::COUNT);
        for (i, attribute) in Attribute::ALL.iter().enumerate() {
            assert_eq!(attribute.index(), i);
        }
    }

    #[test]
    fn test_index_column_detection() {
        assert!(is_index_column(""));
        assert!(is_index_column("unnamed:_0"));
        assert!(!is_index_column("id"));
    }

    #[test]
    fn test_normalize_source_headers() {
        let table = source_table(vec![source_row(0, 101, &[])]);
        let records = normalize(&table).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 101);
        assert_eq!(records[0].get(Attribute::Age), Some(0.5));
        assert!(records[0].missing().is_empty());
    }

    #[test]
    fn test_heart_rate_rescaled() {
        let table = source_table(vec![source_row(0, 1, &[("Heart rate", "0.0733")])]);
        let records = normalize(&table).unwrap();

        let heart_rate = records[0].get(Attribute::HeartRate).unwrap();
        assert!((heart_rate - 0.733).abs() < 1e-12);
    }

    #[test]
    fn test_gender_mapping_is_exact_match() {
        let table = source_table(vec![
            source_row(0, 1, &[("Gender", "Male")]),
            source_row(1, 2, &[("Gender", "Female")]),
            source_row(2, 3, &[("Gender", "male")]),
            source_row(3, 4, &[("Gender", "unknown")]),
        ]);
        let records = normalize(&table).unwrap();

        let codes: Vec<Option<f64>> = records.iter().map(|r| r.get(Attribute::Gender)).collect();
        assert_eq!(codes, vec![Some(1.0), Some(0.0), Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_integer_coded_truncated() {
        let table = source_table(vec![source_row(
            0,
            1,
            &[("Stress Level", "7.9"), ("Diabetes", "1.0")],
        )]);
        let records = normalize(&table).unwrap();

        assert_eq!(records[0].get(Attribute::StressLevel), Some(7.0));
        assert_eq!(records[0].get(Attribute::Diabetes), Some(1.0));
    }

    #[test]
    fn test_missing_tokens_become_none() {
        let table = source_table(vec![
            source_row(0, 1, &[("Diabetes", "")]),
            source_row(1, 2, &[("BMI", "NaN")]),
            source_row(2, 3, &[("Gender", "NA")]),
        ]);
        let records = normalize(&table).unwrap();

        assert_eq!(records[0].missing(), vec![Attribute::Diabetes]);
        assert_eq!(records[1].missing(), vec![Attribute::Bmi]);
        assert_eq!(records[2].missing(), vec![Attribute::Gender]);
    }

    #[test]
    fn test_non_numeric_value_is_schema_error() {
        let table = source_table(vec![source_row(0, 1, &[("Smoking", "yes")])]);
        let result = normalize(&table);

        match result {
            Err(PipelineError::Schema(msg)) => assert!(msg.contains("smoking")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_infinite_value_is_schema_error() {
        let table = source_table(vec![source_row(0, 1, &[("BMI", "inf")])]);
        assert!(matches!(normalize(&table), Err(PipelineError::Schema(_))));
    }

    #[test]
    fn test_heart_rate_overflowing_after_rescale_is_schema_error() {
        let table = source_table(vec![source_row(0, 1, &[("Heart rate", "1e308")])]);

        match normalize(&table) {
            Err(PipelineError::Schema(msg)) => assert!(msg.contains("heart_rate")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_padded_gender_token_coded_male_after_csv_trim() {
        let csv = format!(
            "{}\n{}\n",
            SOURCE_HEADERS.join(","),
            source_row(0, 1, &[("Gender", " Male ")]).join(",")
        );
        let table = RawTable::from_csv_bytes(csv.as_bytes()).unwrap();
        assert_eq!(normalize(&table).unwrap()[0].get(Attribute::Gender), Some(1.0));
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let headers: Vec<String> = SOURCE_HEADERS
            .iter()
            .filter(|h| **h != "Diabetes")
            .map(|h| h.to_string())
            .collect();
        let table = RawTable::new(headers, Vec::new()).unwrap();

        match normalize(&table) {
            Err(PipelineError::Schema(msg)) => assert!(msg.contains("diabetes")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_index_column_optional() {
        let headers: Vec<String> = SOURCE_HEADERS[1..].iter().map(|h| h.to_string()).collect();
        let row = source_row(0, 9, &[])[1..].to_vec();
        let table = RawTable::new(headers, vec![row]).unwrap();

        let records = normalize(&table).unwrap();
        assert_eq!(records[0].id, 9);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let mut headers: Vec<String> = SOURCE_HEADERS.iter().map(|h| h.to_string()).collect();
        headers.push("Heart Attack Risk (Binary)".to_string());
        let mut row = source_row(0, 5, &[]);
        row.push(String::new());
        let table = RawTable::new(headers, vec![row]).unwrap();

        let records = normalize(&table).unwrap();
        assert!(records[0].missing().is_empty());
    }

    #[test]
    fn test_duplicate_column_is_schema_error() {
        let mut headers: Vec<String> = SOURCE_HEADERS.iter().map(|h| h.to_string()).collect();
        headers.push("age".to_string());
        let mut row = source_row(0, 5, &[]);
        row.push("0.3".to_string());
        let table = RawTable::new(headers, vec![row]).unwrap();

        assert!(matches!(normalize(&table), Err(PipelineError::Schema(_))));
    }

    #[test]
    fn test_identifier_rules() {
        let float_id = source_table(vec![source_row(0, 0, &[("id", "42.0")])]);
        assert_eq!(normalize(&float_id).unwrap()[0].id, 42);

        let missing_id = source_table(vec![source_row(0, 0, &[("id", "")])]);
        assert!(matches!(normalize(&missing_id), Err(PipelineError::Schema(_))));

        let fractional_id = source_table(vec![source_row(0, 0, &[("id", "4.5")])]);
        assert!(matches!(normalize(&fractional_id), Err(PipelineError::Schema(_))));

        let duplicate = source_table(vec![source_row(0, 3, &[]), source_row(1, 3, &[])]);
        assert!(matches!(normalize(&duplicate), Err(PipelineError::Schema(_))));
    }
}
