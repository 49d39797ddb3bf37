use uuid::Uuid;
use bp_tracker_data::models::{NewReadingRecord, ReadingRecord};

use crate::entities::reading::Reading;

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Parse a caller-supplied id string
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Convert from data model to domain entity for a stored reading
pub fn convert_to_domain_reading(record: ReadingRecord) -> Reading {
    Reading {
        id: Some(record.id),
        timestamp: record.timestamp,
        systolic: record.systolic,
        diastolic: record.diastolic,
        pulse: record.pulse,
        classification: if record.classification.is_empty() {
            None
        } else {
            Some(record.classification)
        },
    }
}

/// Convert from domain entity to data model for an insert
pub fn convert_to_data_new_record(reading: &Reading) -> NewReadingRecord {
    NewReadingRecord {
        timestamp: reading.timestamp,
        systolic: reading.systolic,
        diastolic: reading.diastolic,
        pulse: reading.pulse,
        classification: reading.classification.clone().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_convert_to_domain_reading() {
        let record = ReadingRecord {
            id: Uuid::new_v4(),
            timestamp: Utc.with_ymd_and_hms(2024, 2, 10, 9, 15, 0).unwrap(),
            systolic: 128,
            diastolic: 82,
            pulse: 71,
            classification: "Hypertension Stage 1".to_string(),
        };

        let reading = convert_to_domain_reading(record.clone());

        assert_eq!(reading.id, Some(record.id));
        assert_eq!(reading.timestamp, record.timestamp);
        assert_eq!(reading.systolic, 128);
        assert_eq!(reading.diastolic, 82);
        assert_eq!(reading.pulse, 71);
        assert_eq!(reading.classification.as_deref(), Some("Hypertension Stage 1"));
    }

    #[test]
    fn test_empty_classification_becomes_none() {
        let record = ReadingRecord {
            id: Uuid::new_v4(),
            timestamp: Utc.with_ymd_and_hms(2024, 2, 10, 9, 15, 0).unwrap(),
            systolic: 118,
            diastolic: 76,
            pulse: 64,
            classification: String::new(),
        };

        assert!(convert_to_domain_reading(record).classification.is_none());
    }

    #[test]
    fn test_convert_to_data_new_record() {
        let reading = Reading::new(Utc.with_ymd_and_hms(2024, 2, 10, 9, 15, 0).unwrap(), 118, 76, 64);
        let record = convert_to_data_new_record(&reading);

        assert_eq!(record.timestamp, reading.timestamp);
        assert_eq!(record.systolic, 118);
        assert_eq!(record.classification, "");
    }

    #[test]
    fn test_parse_string_to_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_string_to_uuid(&id.to_string()), Ok(id));
        assert!(parse_string_to_uuid("42").unwrap_err().contains("Invalid UUID format"));
    }
}
