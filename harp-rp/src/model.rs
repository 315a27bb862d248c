//! Pretrained classifier artifact
//!
//! The deployed classifier is a logistic regression exported as JSON:
//!
//! ```json
//! {
//!   "name": "heart-risk-logreg",
//!   "version": "2024-05",
//!   "features": ["age", "cholesterol", "..."],
//!   "coefficients": [0.12, -0.03, "..."],
//!   "intercept": -0.41,
//!   "scaler": { "mean": [...], "scale": [...] }
//! }
//! ```
//!
//! When `scaler` is present each feature is standardized as
//! `(x - mean) / scale` before the linear term. Training happens elsewhere;
//! this module only loads and evaluates the artifact.

use crate::pipeline::{Classifier, ClassifierError, FeatureMatrix};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Artifact loading error
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Cannot read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

/// Per-feature standardization parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Serialized form of a logistic-regression classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl ModelArtifact {
    fn validate(&self) -> Result<(), ModelError> {
        let n = self.features.len();
        if n == 0 {
            return Err(ModelError::Invalid("artifact declares no features".to_string()));
        }
        if self.coefficients.len() != n {
            return Err(ModelError::Invalid(format!(
                "{} coefficients for {} features",
                self.coefficients.len(),
                n
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::Invalid("non-finite weight".to_string()));
        }

        if let Some(scaler) = &self.scaler {
            if scaler.mean.len() != n || scaler.scale.len() != n {
                return Err(ModelError::Invalid(format!(
                    "scaler has {} means and {} scales for {} features",
                    scaler.mean.len(),
                    scaler.scale.len(),
                    n
                )));
            }
            if scaler.mean.iter().any(|m| !m.is_finite()) {
                return Err(ModelError::Invalid("non-finite scaler mean".to_string()));
            }
            if scaler.scale.iter().any(|s| !s.is_finite() || *s == 0.0) {
                return Err(ModelError::Invalid("scaler scale must be finite and non-zero".to_string()));
            }
        }
        Ok(())
    }
}

/// Logistic-regression classifier evaluated from a [`ModelArtifact`]
#[derive(Debug, Clone)]
pub struct LogisticModel {
    artifact: ModelArtifact,
}

impl LogisticModel {
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        artifact.validate()?;
        Ok(Self { artifact })
    }

    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Self::from_artifact(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Positive-class probability for one row in feature order
    pub fn probability(&self, row: &[f64]) -> f64 {
        let a = &self.artifact;
        let mut z = a.intercept;
        for (i, (x, w)) in row.iter().zip(&a.coefficients).enumerate() {
            let x = match &a.scaler {
                Some(scaler) => (x - scaler.mean[i]) / scaler.scale[i],
                None => *x,
            };
            z += w * x;
        }
        sigmoid(z)
    }
}

/// Logistic function, stable for large |z|
fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticModel {
    fn name(&self) -> &str {
        &self.artifact.name
    }

    fn feature_names(&self) -> &[String] {
        &self.artifact.features
    }

    fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<f64>, ClassifierError> {
        let expected = self.artifact.features.len();
        if features.n_columns() != expected {
            return Err(ClassifierError::Shape {
                expected,
                found: features.n_columns(),
            });
        }

        features
            .rows()
            .iter()
            .map(|row| {
                let p = self.probability(row);
                if p.is_nan() {
                    Err(ClassifierError::Evaluation("probability is NaN".to_string()))
                } else {
                    Ok(p)
                }
            })
            .collect()
    }
}
