//! Risk prediction pipeline
//!
//! Raw CSV table → schema normalization → complete/incomplete partition →
//! feature engineering (complete rows) → inference → result assembly.
//!
//! Every stage returns an explicit `Result`; the [`RiskPipeline`] boundary
//! converts any [`PipelineError`] into a `"failed"` [`PredictionResponse`]
//! so no fault escapes to the caller. Rows with missing attributes are not
//! an error: they take the incomplete path and receive the sentinel label.

pub mod assembler;
pub mod features;
pub mod inference;
pub mod partition;
pub mod schema;
pub mod table;

pub use assembler::Prediction;
pub use features::{EngineeredRecord, Feature, FeatureSchema};
pub use inference::{Classifier, ClassifierError, FeatureMatrix, ModelHandle, RiskClass};
pub use partition::{CompleteRecord, IncompleteRecord, Partition};
pub use schema::{Attribute, NormalizedRecord, RecordId};
pub use table::RawTable;

use harp_common::api::{PredictionRecord, PredictionResponse};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Batch-level pipeline failure
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input could not be parsed as a CSV table at all
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Required columns missing, duplicated, or holding values of the wrong type
    #[error("Schema error: {0}")]
    Schema(String),

    /// Classifier was never loaded
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Classifier's feature contract differs from the engineered feature schema
    #[error("Feature schema mismatch: classifier expects {expected:?}, pipeline produces {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// Classifier failed or returned unusable probabilities
    #[error("Inference error: {0}")]
    Inference(String),

    /// Pipeline invariant violated
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Message exposed to API clients; the detailed cause stays in the logs
    pub fn public_message(&self) -> &'static str {
        match self {
            PipelineError::MalformedInput(_) => "make sure the uploaded file is a valid CSV table",
            PipelineError::Schema(_) => {
                "invalid data, make sure the uploaded file contains all required attributes"
            }
            PipelineError::SchemaMismatch { .. } => {
                "invalid data, make sure the uploaded file contains the required number of attributes"
            }
            PipelineError::ModelUnavailable(_) => "prediction model is not loaded",
            PipelineError::Inference(_) | PipelineError::Internal(_) => {
                "prediction failed, see service logs"
            }
        }
    }

    /// Stable machine-readable category, used in log fields
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::MalformedInput(_) => "MALFORMED_INPUT",
            PipelineError::Schema(_) => "SCHEMA_ERROR",
            PipelineError::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            PipelineError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            PipelineError::Inference(_) => "INFERENCE_ERROR",
            PipelineError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// True when the fault lies with the submitted data rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::MalformedInput(_) | PipelineError::Schema(_)
        )
    }
}

/// Runs the full prediction pipeline against a shared, read-only classifier
#[derive(Clone)]
pub struct RiskPipeline {
    model: ModelHandle,
    schema: &'static FeatureSchema,
}

impl RiskPipeline {
    pub fn new(model: ModelHandle) -> Self {
        Self {
            model,
            schema: &FeatureSchema::V1,
        }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    /// Run every stage, surfacing the typed failure cause
    pub fn try_predict(&self, table: &RawTable) -> Result<Vec<PredictionRecord>, PipelineError> {
        let normalized = schema::normalize(table)?;
        let input_order: Vec<RecordId> = normalized.iter().map(|r| r.id).collect();

        let partition = partition::partition(normalized);
        debug!(
            complete = partition.complete.len(),
            incomplete = partition.incomplete.len(),
            "Partitioned batch"
        );

        let engineered = features::engineer(&partition.complete, self.schema);

        let engine = inference::InferenceEngine::new(&self.model, self.schema)?;
        let classified = engine.classify(&engineered)?;

        assembler::assemble(&input_order, classified, &partition.incomplete)
    }

    /// Predict on an already-parsed table
    pub fn predict(&self, table: &RawTable) -> PredictionResponse {
        self.respond(self.try_predict(table))
    }

    /// Parse CSV bytes and predict
    pub fn predict_csv(&self, bytes: &[u8]) -> PredictionResponse {
        let result = RawTable::from_csv_bytes(bytes).and_then(|table| self.try_predict(&table));
        self.respond(result)
    }

    fn respond(&self, result: Result<Vec<PredictionRecord>, PipelineError>) -> PredictionResponse {
        match result {
            Ok(data) => {
                info!(records = data.len(), "Prediction batch complete");
                PredictionResponse::success(data)
            }
            Err(e) => {
                if e.is_client_error() {
                    warn!(code = e.code(), "Prediction batch rejected: {}", e);
                } else {
                    error!(code = e.code(), "Prediction batch failed: {}", e);
                }
                PredictionResponse::failed(e.public_message())
            }
        }
    }
}
