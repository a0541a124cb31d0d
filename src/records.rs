//! Append-only journal of consumed drinks.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{Result, TeaCalError};
use crate::metrics::MetricsCollector;
use crate::models::{ConsumptionRecord, NewRecord};
use crate::repository::{JsonListRepository, Repository};
use crate::storage::{keys, KeyValueStore};
use crate::validation::InputValidator;

/// The records journal
pub struct RecordsStore {
    records: JsonListRepository<ConsumptionRecord>,
    metrics: MetricsCollector,
}

impl RecordsStore {
    /// Load the journal from storage
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self> {
        Ok(Self {
            records: JsonListRepository::load(store, keys::RECORDS)?,
            metrics: MetricsCollector::default(),
        })
    }

    /// Append a record with a fresh id and the current time
    pub fn append(&mut self, new_record: NewRecord) -> Result<ConsumptionRecord> {
        let drink = new_record
            .drink
            .ok_or_else(|| TeaCalError::Validation("Select a drink before recording".to_string()))?;
        InputValidator::validate_kcal(drink.calories)?;
        if let Some(level) = new_record.sugar_level {
            InputValidator::validate_sugar_level(f64::from(level))?;
        }

        let record = ConsumptionRecord {
            id: Uuid::new_v4().to_string(),
            drink_ref: drink,
            cup_size: new_record.cup_size,
            sugar_level: new_record.sugar_level,
            mood: new_record.mood,
            notes: InputValidator::sanitize_text(&new_record.notes),
            timestamp: Utc::now(),
        };
        self.records.put(record.clone())?;

        self.metrics
            .record_append(record.mood.as_str(), record.drink_ref.calories);
        info!(
            record_id = %record.id,
            drink = %record.drink_ref.name,
            brand = %record.drink_ref.brand,
            kcal = record.drink_ref.calories,
            mood = %record.mood,
            "Record appended"
        );
        Ok(record)
    }

    /// All records in the order they were appended
    #[must_use]
    pub fn list(&self) -> &[ConsumptionRecord] {
        self.records.list()
    }

    /// All records, newest first
    #[must_use]
    pub fn list_recent(&self) -> Vec<ConsumptionRecord> {
        let mut records = self.records.list().to_vec();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        records
    }

    /// Record by id
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&ConsumptionRecord> {
        self.records.get(id)
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing has been recorded yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
