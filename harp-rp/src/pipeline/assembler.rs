//! Result assembly
//!
//! Joins classifier labels for complete records with sentinel entries for
//! incomplete ones and renders the human-readable label per identifier,
//! in input row order. Every input identifier appears exactly once.

use super::inference::RiskClass;
use super::partition::IncompleteRecord;
use super::schema::RecordId;
use super::PipelineError;
use harp_common::api::PredictionRecord;
use std::collections::HashMap;
use tracing::trace;

/// Sentinel code for records the classifier never saw
pub const INSUFFICIENT_DATA_CODE: i8 = -100;

pub const LOW_RISK_LABEL: &str = "low risk";
pub const HIGH_RISK_LABEL: &str = "high risk";
pub const INSUFFICIENT_DATA_LABEL: &str = "insufficient data for prediction";

/// Final per-record outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prediction {
    Risk(RiskClass),
    InsufficientData,
}

impl Prediction {
    /// 0 low, 1 high, [`INSUFFICIENT_DATA_CODE`] sentinel
    pub fn code(self) -> i8 {
        match self {
            Prediction::Risk(class) => class.code() as i8,
            Prediction::InsufficientData => INSUFFICIENT_DATA_CODE,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Prediction::Risk(RiskClass::Low) => LOW_RISK_LABEL,
            Prediction::Risk(RiskClass::High) => HIGH_RISK_LABEL,
            Prediction::InsufficientData => INSUFFICIENT_DATA_LABEL,
        }
    }
}

/// Full outer join of both paths on identifier
///
/// `input_order` lists every identifier of the batch as read. An identifier
/// missing from both paths, present on both, or unknown to the batch is an
/// internal invariant violation.
pub fn assemble(
    input_order: &[RecordId],
    classified: Vec<(RecordId, RiskClass)>,
    incomplete: &[IncompleteRecord],
) -> Result<Vec<PredictionRecord>, PipelineError> {
    let mut outcomes: HashMap<RecordId, Prediction> =
        HashMap::with_capacity(classified.len() + incomplete.len());

    let entries = classified
        .into_iter()
        .map(|(id, class)| (id, Prediction::Risk(class)))
        .chain(incomplete.iter().map(|r| (r.id, Prediction::InsufficientData)));

    for (id, prediction) in entries {
        if outcomes.insert(id, prediction).is_some() {
            return Err(PipelineError::Internal(format!(
                "identifier {} produced more than one prediction",
                id
            )));
        }
    }

    let mut data = Vec::with_capacity(input_order.len());
    for id in input_order {
        let prediction = outcomes.remove(id).ok_or_else(|| {
            PipelineError::Internal(format!("identifier {} has no prediction", id))
        })?;
        trace!(id = *id, code = prediction.code(), "Assembled prediction");
        data.push(PredictionRecord::new(*id, prediction.label()));
    }

    if !outcomes.is_empty() {
        let mut unknown: Vec<RecordId> = outcomes.into_keys().collect();
        unknown.sort_unstable();
        return Err(PipelineError::Internal(format!(
            "predictions for identifiers not in the batch: {:?}",
            unknown
        )));
    }

    Ok(data)
}
