//! Feature engineering
//!
//! Derives composite risk indicators from complete records and projects
//! them onto the classifier's feature schema.
//!
//! The cutoffs assume pressure and activity-hours columns arrive already
//! scaled to the 0–1 range by the upstream dataset. They are calibration
//! constants of the deployed classifier and must change together with it.

use super::partition::CompleteRecord;
use super::schema::{Attribute, RecordId};

/// Normalized systolic/diastolic pressure above which hypertension is flagged
pub const HYPERTENSION_CUTOFF: f64 = 0.6;

/// Normalized sedentary hours above which `high_sedentary` is flagged
pub const HIGH_SEDENTARY_CUTOFF: f64 = 0.7;

/// Normalized exercise hours below which `low_exercise` is flagged
pub const LOW_EXERCISE_CUTOFF: f64 = 0.3;

/// Engineering-only inputs; never part of a feature schema
pub const DROPPED_ATTRIBUTES: [Attribute; 6] = [
    Attribute::CkMb,
    Attribute::Troponin,
    Attribute::BloodSugar,
    Attribute::Income,
    Attribute::SystolicBloodPressure,
    Attribute::DiastolicBloodPressure,
];

/// A single classifier input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// Normalized attribute passed through unchanged
    Raw(Attribute),
    Hypertension,
    PulsePressure,
    MetabolicRiskScore,
    HighSedentary,
    LowExercise,
    LifestyleRiskScore,
}

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::Raw(attribute) => attribute.column_name(),
            Feature::Hypertension => "hypertension",
            Feature::PulsePressure => "pulse_pressure",
            Feature::MetabolicRiskScore => "metabolic_risk_score",
            Feature::HighSedentary => "high_sedentary",
            Feature::LowExercise => "low_exercise",
            Feature::LifestyleRiskScore => "lifestyle_risk_score",
        }
    }
}

const V1_FEATURES: [Feature; 25] = [
    Feature::Raw(Attribute::Age),
    Feature::Raw(Attribute::Cholesterol),
    Feature::Raw(Attribute::HeartRate),
    Feature::Raw(Attribute::Diabetes),
    Feature::Raw(Attribute::FamilyHistory),
    Feature::Raw(Attribute::Smoking),
    Feature::Raw(Attribute::Obesity),
    Feature::Raw(Attribute::AlcoholConsumption),
    Feature::Raw(Attribute::ExerciseHoursPerWeek),
    Feature::Raw(Attribute::Diet),
    Feature::Raw(Attribute::PreviousHeartProblems),
    Feature::Raw(Attribute::MedicationUse),
    Feature::Raw(Attribute::StressLevel),
    Feature::Raw(Attribute::SedentaryHoursPerDay),
    Feature::Raw(Attribute::Bmi),
    Feature::Raw(Attribute::Triglycerides),
    Feature::Raw(Attribute::PhysicalActivityDaysPerWeek),
    Feature::Raw(Attribute::SleepHoursPerDay),
    Feature::Raw(Attribute::Gender),
    Feature::Hypertension,
    Feature::PulsePressure,
    Feature::MetabolicRiskScore,
    Feature::HighSedentary,
    Feature::LowExercise,
    Feature::LifestyleRiskScore,
];

/// Versioned, ordered list of classifier input columns
#[derive(Debug, PartialEq, Eq)]
pub struct FeatureSchema {
    version: &'static str,
    features: &'static [Feature],
}

impl FeatureSchema {
    /// Schema of the deployed classifier
    pub const V1: FeatureSchema = FeatureSchema {
        version: "v1",
        features: &V1_FEATURES,
    };

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn features(&self) -> &'static [Feature] {
        self.features
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Composite indicators computed from one complete record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    pub hypertension: u8,
    pub pulse_pressure: f64,
    /// obesity + diabetes + hypertension, 0..=3
    pub metabolic_risk_score: u8,
    pub high_sedentary: u8,
    pub low_exercise: u8,
    /// smoking + alcohol_consumption + high_sedentary + low_exercise, 0..=4
    pub lifestyle_risk_score: u8,
}

fn indicator(condition: bool) -> u8 {
    u8::from(condition)
}

fn flag(record: &CompleteRecord, attribute: Attribute) -> u8 {
    indicator(record.get(attribute) != 0.0)
}

impl DerivedFeatures {
    pub fn compute(record: &CompleteRecord) -> Self {
        let systolic = record.get(Attribute::SystolicBloodPressure);
        let diastolic = record.get(Attribute::DiastolicBloodPressure);

        let hypertension =
            indicator(systolic > HYPERTENSION_CUTOFF || diastolic > HYPERTENSION_CUTOFF);
        let pulse_pressure = (systolic - diastolic).abs();
        let metabolic_risk_score =
            flag(record, Attribute::Obesity) + flag(record, Attribute::Diabetes) + hypertension;

        let high_sedentary =
            indicator(record.get(Attribute::SedentaryHoursPerDay) > HIGH_SEDENTARY_CUTOFF);
        let low_exercise =
            indicator(record.get(Attribute::ExerciseHoursPerWeek) < LOW_EXERCISE_CUTOFF);
        let lifestyle_risk_score = flag(record, Attribute::Smoking)
            + flag(record, Attribute::AlcoholConsumption)
            + high_sedentary
            + low_exercise;

        Self {
            hypertension,
            pulse_pressure,
            metabolic_risk_score,
            high_sedentary,
            low_exercise,
            lifestyle_risk_score,
        }
    }
}

/// Complete record projected onto a feature schema
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredRecord {
    pub id: RecordId,
    schema_version: &'static str,
    values: Vec<f64>,
}

impl EngineeredRecord {
    pub fn schema_version(&self) -> &'static str {
        self.schema_version
    }

    /// Feature values in schema order
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Engineer one record against `schema`
pub fn engineer_record(record: &CompleteRecord, schema: &'static FeatureSchema) -> EngineeredRecord {
    let derived = DerivedFeatures::compute(record);
    let values = schema
        .features()
        .iter()
        .map(|feature| match *feature {
            Feature::Raw(attribute) => record.get(attribute),
            Feature::Hypertension => f64::from(derived.hypertension),
            Feature::PulsePressure => derived.pulse_pressure,
            Feature::MetabolicRiskScore => f64::from(derived.metabolic_risk_score),
            Feature::HighSedentary => f64::from(derived.high_sedentary),
            Feature::LowExercise => f64::from(derived.low_exercise),
            Feature::LifestyleRiskScore => f64::from(derived.lifestyle_risk_score),
        })
        .collect();

    EngineeredRecord {
        id: record.id,
        schema_version: schema.version(),
        values,
    }
}

/// Engineer every complete record, preserving order
pub fn engineer(records: &[CompleteRecord], schema: &'static FeatureSchema) -> Vec<EngineeredRecord> {
    records.iter().map(|r| engineer_record(r, schema)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record_with(values: &[(Attribute, f64)]) -> CompleteRecord {
        let mut all = [0.0; Attribute::COUNT];
        for (attribute, value) in values {
            all[attribute.index()] = *value;
        }
        CompleteRecord::new(1, all)
    }

    #[test]
    fn test_v1_schema_excludes_dropped_attributes() {
        let names = FeatureSchema::V1.names();
        assert_eq!(names.len(), 25);
        for attribute in DROPPED_ATTRIBUTES {
            assert!(!names.contains(&attribute.column_name()));
        }
    }

    #[test]
    fn test_v1_schema_covers_every_retained_attribute() {
        let names = FeatureSchema::V1.names();
        for attribute in Attribute::ALL {
            if !DROPPED_ATTRIBUTES.contains(&attribute) {
                assert!(names.contains(&attribute.column_name()), "{:?}", attribute);
            }
        }
        let mut unique = names.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_hypertension_cutoff_is_exclusive() {
        let at_cutoff = record_with(&[
            (Attribute::SystolicBloodPressure, 0.6),
            (Attribute::DiastolicBloodPressure, 0.6),
        ]);
        assert_eq!(DerivedFeatures::compute(&at_cutoff).hypertension, 0);

        let diastolic_high = record_with(&[
            (Attribute::SystolicBloodPressure, 0.2),
            (Attribute::DiastolicBloodPressure, 0.61),
        ]);
        assert_eq!(DerivedFeatures::compute(&diastolic_high).hypertension, 1);
    }

    #[test]
    fn test_activity_cutoffs() {
        let derived = DerivedFeatures::compute(&record_with(&[
            (Attribute::SedentaryHoursPerDay, 0.7),
            (Attribute::ExerciseHoursPerWeek, 0.3),
        ]));
        assert_eq!(derived.high_sedentary, 0);
        assert_eq!(derived.low_exercise, 0);

        let derived = DerivedFeatures::compute(&record_with(&[
            (Attribute::SedentaryHoursPerDay, 0.71),
            (Attribute::ExerciseHoursPerWeek, 0.29),
        ]));
        assert_eq!(derived.high_sedentary, 1);
        assert_eq!(derived.low_exercise, 1);
    }

    #[test]
    fn test_composite_scores() {
        let derived = DerivedFeatures::compute(&record_with(&[
            (Attribute::Obesity, 1.0),
            (Attribute::Diabetes, 1.0),
            (Attribute::SystolicBloodPressure, 0.9),
            (Attribute::DiastolicBloodPressure, 0.4),
            (Attribute::Smoking, 1.0),
            (Attribute::AlcoholConsumption, 0.0),
            (Attribute::SedentaryHoursPerDay, 0.8),
            (Attribute::ExerciseHoursPerWeek, 0.5),
        ]));

        assert_eq!(derived.metabolic_risk_score, 3);
        assert_eq!(derived.lifestyle_risk_score, 2);
        assert!((derived.pulse_pressure - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_engineered_values_follow_schema_order() {
        let record = record_with(&[
            (Attribute::Age, 0.42),
            (Attribute::Gender, 1.0),
            (Attribute::SystolicBloodPressure, 0.7),
            (Attribute::DiastolicBloodPressure, 0.3),
        ]);
        let engineered = engineer_record(&record, &FeatureSchema::V1);
        let names = FeatureSchema::V1.names();
        let value_of = |name: &str| {
            let position = names.iter().position(|n| *n == name).unwrap();
            engineered.values()[position]
        };

        assert_eq!(engineered.values().len(), FeatureSchema::V1.len());
        assert_eq!(engineered.schema_version(), "v1");
        assert_eq!(value_of("age"), 0.42);
        assert_eq!(value_of("gender"), 1.0);
        assert_eq!(value_of("hypertension"), 1.0);
        assert!((value_of("pulse_pressure") - 0.4).abs() < 1e-12);
    }

    fn arb_record() -> impl Strategy<Value = CompleteRecord> {
        (
            proptest::collection::vec(0.0..1.0f64, Attribute::COUNT),
            proptest::collection::vec(0u8..3, 4),
        )
            .prop_map(|(continuous, flags)| {
                let mut values = [0.0; Attribute::COUNT];
                values.copy_from_slice(&continuous);
                values[Attribute::Obesity.index()] = f64::from(flags[0]);
                values[Attribute::Diabetes.index()] = f64::from(flags[1]);
                values[Attribute::Smoking.index()] = f64::from(flags[2]);
                values[Attribute::AlcoholConsumption.index()] = f64::from(flags[3]);
                CompleteRecord::new(1, values)
            })
    }

    proptest! {
        /// hypertension=1 iff either pressure exceeds the cutoff
        #[test]
        fn hypertension_definition(record in arb_record()) {
            let derived = DerivedFeatures::compute(&record);
            let systolic = record.get(Attribute::SystolicBloodPressure);
            let diastolic = record.get(Attribute::DiastolicBloodPressure);

            prop_assert_eq!(derived.hypertension == 1, systolic > 0.6 || diastolic > 0.6);
            prop_assert_eq!(derived.pulse_pressure, (systolic - diastolic).abs());
        }

        /// Composite scores stay inside their declared ranges
        #[test]
        fn score_ranges(record in arb_record()) {
            let derived = DerivedFeatures::compute(&record);
            prop_assert!(derived.metabolic_risk_score <= 3);
            prop_assert!(derived.lifestyle_risk_score <= 4);
        }

        /// Engineering is a pure function of its input
        #[test]
        fn engineering_is_deterministic(record in arb_record()) {
            let first = engineer_record(&record, &FeatureSchema::V1);
            let second = engineer_record(&record.clone(), &FeatureSchema::V1);
            prop_assert_eq!(first, second);
        }
    }
}
