//! Inference
//!
//! Applies the pretrained classifier to engineered records and turns the
//! positive-class probability into a binary risk class at
//! [`DECISION_THRESHOLD`].
//!
//! The classifier is loaded once at startup into a [`ModelHandle`] and
//! shared read-only. A failed load is a permanent "unavailable" state that
//! every invocation checks; it is never retried per request.

use super::features::{EngineeredRecord, FeatureSchema};
use super::schema::RecordId;
use super::PipelineError;
use crate::model::LogisticModel;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Calibrated operating point; probabilities at or above it are high risk
pub const DECISION_THRESHOLD: f64 = 0.46;

/// Classifier-side failure
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Feature matrix has {found} columns, classifier expects {expected}")]
    Shape { expected: usize, found: usize },

    #[error("Evaluation failed: {0}")]
    Evaluation(String),
}

/// Row-major feature matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<&'static str>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Stack engineered records produced against `schema`
    pub fn from_records(
        records: &[EngineeredRecord],
        schema: &'static FeatureSchema,
    ) -> Result<Self, PipelineError> {
        if let Some(record) = records
            .iter()
            .find(|r| r.schema_version() != schema.version() || r.values().len() != schema.len())
        {
            return Err(PipelineError::Internal(format!(
                "record {} engineered against schema {} ({} values), expected {} ({} values)",
                record.id,
                record.schema_version(),
                record.values().len(),
                schema.version(),
                schema.len()
            )));
        }

        let columns = schema.names();
        for record in records {
            if let Some((name, value)) = columns
                .iter()
                .zip(record.values())
                .find(|(_, v)| !v.is_finite())
            {
                return Err(PipelineError::Schema(format!(
                    "id {}: feature '{}' is not finite ({})",
                    record.id, name, value
                )));
            }
        }

        Ok(Self {
            columns,
            rows: records.iter().map(|r| r.values().to_vec()).collect(),
        })
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }
}

/// Probabilistic binary classifier over a fixed, named feature schema
pub trait Classifier: Send + Sync {
    /// Model name for diagnostics
    fn name(&self) -> &str;

    /// Ordered feature names the classifier was trained on
    fn feature_names(&self) -> &[String];

    /// Probability of the positive (high-risk) class, one per row
    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError>;
}

enum ModelState {
    Ready(Box<dyn Classifier>),
    Unavailable(String),
}

/// Immutable, shareable handle to the loaded classifier
#[derive(Clone)]
pub struct ModelHandle {
    state: Arc<ModelState>,
}

impl ModelHandle {
    pub fn ready(classifier: impl Classifier + 'static) -> Self {
        Self {
            state: Arc::new(ModelState::Ready(Box::new(classifier))),
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            state: Arc::new(ModelState::Unavailable(reason.into())),
        }
    }

    /// Load a classifier artifact; failure yields the unavailable state
    pub fn load(path: &Path) -> Self {
        match LogisticModel::load(path) {
            Ok(model) => {
                info!(
                    model = model.name(),
                    features = model.feature_names().len(),
                    "Loaded classifier from {}",
                    path.display()
                );
                Self::ready(model)
            }
            Err(e) => {
                error!("Failed to load classifier from {}: {}", path.display(), e);
                Self::unavailable(e.to_string())
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state, ModelState::Ready(_))
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match &*self.state {
            ModelState::Ready(_) => None,
            ModelState::Unavailable(reason) => Some(reason.as_str()),
        }
    }

    pub fn classifier(&self) -> Result<&dyn Classifier, PipelineError> {
        match &*self.state {
            ModelState::Ready(classifier) => Ok(classifier.as_ref()),
            ModelState::Unavailable(reason) => Err(PipelineError::ModelUnavailable(reason.clone())),
        }
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.state {
            ModelState::Ready(classifier) => f
                .debug_struct("ModelHandle")
                .field("classifier", &classifier.name())
                .finish(),
            ModelState::Unavailable(reason) => f
                .debug_struct("ModelHandle")
                .field("unavailable", reason)
                .finish(),
        }
    }
}

/// Binary classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskClass {
    Low,
    High,
}

impl RiskClass {
    /// Threshold a positive-class probability (inclusive boundary)
    pub fn from_probability(probability: f64) -> Self {
        if probability >= DECISION_THRESHOLD {
            RiskClass::High
        } else {
            RiskClass::Low
        }
    }

    /// Binary code: 0 low, 1 high
    pub fn code(self) -> u8 {
        match self {
            RiskClass::Low => 0,
            RiskClass::High => 1,
        }
    }
}

/// Classifier bound to a validated feature schema
pub struct InferenceEngine<'a> {
    classifier: &'a dyn Classifier,
    schema: &'static FeatureSchema,
}

impl<'a> InferenceEngine<'a> {
    /// Check model availability and the feature contract
    pub fn new(handle: &'a ModelHandle, schema: &'static FeatureSchema) -> Result<Self, PipelineError> {
        let classifier = handle.classifier()?;

        let expected = classifier.feature_names();
        let found = schema.names();
        let matches = expected.len() == found.len()
            && expected.iter().zip(&found).all(|(e, f)| e.as_str() == *f);
        if !matches {
            return Err(PipelineError::SchemaMismatch {
                expected: expected.to_vec(),
                found: found.iter().map(|s| s.to_string()).collect(),
            });
        }

        Ok(Self { classifier, schema })
    }

    /// Label every record; an empty input never reaches the classifier
    pub fn classify(
        &self,
        records: &[EngineeredRecord],
    ) -> Result<Vec<(RecordId, RiskClass)>, PipelineError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let matrix = FeatureMatrix::from_records(records, self.schema)?;
        let probabilities = self
            .classifier
            .predict_proba(&matrix)
            .map_err(|e| PipelineError::Inference(e.to_string()))?;

        if probabilities.len() != records.len() {
            return Err(PipelineError::Inference(format!(
                "classifier returned {} probabilities for {} rows",
                probabilities.len(),
                records.len()
            )));
        }

        let mut labels = Vec::with_capacity(records.len());
        for (record, probability) in records.iter().zip(probabilities) {
            if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
                return Err(PipelineError::Inference(format!(
                    "probability {} for id {} is outside [0, 1]",
                    probability, record.id
                )));
            }
            labels.push((record.id, RiskClass::from_probability(probability)));
        }

        debug!(
            rows = labels.len(),
            high = labels.iter().filter(|(_, c)| *c == RiskClass::High).count(),
            classifier = self.classifier.name(),
            "Classified batch"
        );
        Ok(labels)
    }
}
