//! Complete/incomplete partitioning
//!
//! A record is complete only when every clinical attribute has a value.
//! Incomplete records keep nothing but their identifier and never reach
//! feature engineering or the classifier.

use super::schema::{Attribute, NormalizedRecord, RecordId};
use tracing::debug;

/// Record with every attribute present
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteRecord {
    pub id: RecordId,
    values: [f64; Attribute::COUNT],
}

impl CompleteRecord {
    pub fn new(id: RecordId, values: [f64; Attribute::COUNT]) -> Self {
        Self { id, values }
    }

    pub fn get(&self, attribute: Attribute) -> f64 {
        self.values[attribute.index()]
    }
}

impl TryFrom<&NormalizedRecord> for CompleteRecord {
    /// Missing attributes, in source column order
    type Error = Vec<Attribute>;

    fn try_from(record: &NormalizedRecord) -> Result<Self, Self::Error> {
        let mut values = [0.0; Attribute::COUNT];
        let mut missing = Vec::new();

        for attribute in Attribute::ALL {
            match record.get(attribute) {
                Some(v) => values[attribute.index()] = v,
                None => missing.push(attribute),
            }
        }

        if missing.is_empty() {
            Ok(Self::new(record.id, values))
        } else {
            Err(missing)
        }
    }
}

/// Identifier of a record lacking at least one attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncompleteRecord {
    pub id: RecordId,
}

/// Disjoint split of a normalized batch, each side in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    pub complete: Vec<CompleteRecord>,
    pub incomplete: Vec<IncompleteRecord>,
}

/// Route every record to exactly one side
pub fn partition(records: Vec<NormalizedRecord>) -> Partition {
    let mut result = Partition::default();

    for record in &records {
        match CompleteRecord::try_from(record) {
            Ok(complete) => result.complete.push(complete),
            Err(missing) => {
                debug!(
                    id = record.id,
                    missing = ?missing.iter().map(|a| a.column_name()).collect::<Vec<_>>(),
                    "Record incomplete"
                );
                result.incomplete.push(IncompleteRecord { id: record.id });
            }
        }
    }

    result
}
