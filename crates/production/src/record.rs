use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use eggs_core::{DomainError, RecordId};

/// Soft-delete flag of a record, persisted as a single-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum RecordStatus {
    #[default]
    #[serde(rename = "A")]
    Active,
    #[serde(rename = "I")]
    Inactive,
}

impl RecordStatus {
    pub fn code(self) -> &'static str {
        match self {
            RecordStatus::Active => "A",
            RecordStatus::Inactive => "I",
        }
    }

    pub fn from_code(code: &str) -> Result<Self, DomainError> {
        match code.trim() {
            "A" => Ok(RecordStatus::Active),
            "I" => Ok(RecordStatus::Inactive),
            other => Err(DomainError::corrupt(format!("unknown status code '{other}'"))),
        }
    }
}

impl core::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// One egg-production entry.
///
/// Every field except `id` is nullable: an update writes the record exactly as
/// submitted, so fields the caller leaves out end up `null`.
///
/// `priceKilo` goes through `Decimal` end to end (JSON number in, `NUMERIC` in
/// the store, JSON number out) so no precision is lost to `f64`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EggProductionRecord {
    /// Server-assigned; ignored on create, pinned to the path on update.
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub id: Option<RecordId>,

    #[serde(default)]
    pub quantity_eggs: Option<i32>,

    #[serde(default, alias = "eggsKilo")]
    pub eggs_per_kilo: Option<i32>,

    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    #[schema(value_type = Option<f64>)]
    pub price_kilo: Option<Decimal>,

    #[serde(default)]
    pub registration_date: Option<NaiveDate>,

    #[serde(default, alias = "estado")]
    pub status: Option<RecordStatus>,
}

impl EggProductionRecord {
    pub fn is_active(&self) -> bool {
        self.status == Some(RecordStatus::Active)
    }

    /// Same record under a different identity.
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;
    use serde_json::json;

    #[test]
    fn status_codes_round_trip() {
        assert_eq!(RecordStatus::from_code("A").unwrap(), RecordStatus::Active);
        assert_eq!(RecordStatus::from_code("I").unwrap(), RecordStatus::Inactive);
        assert!(RecordStatus::from_code("X").is_err());
        assert_eq!(RecordStatus::Inactive.code(), "I");
    }

    #[test]
    fn deserializes_camel_case_payload() {
        let record: EggProductionRecord = serde_json::from_value(json!({
            "quantityEggs": 100,
            "eggsPerKilo": 20,
            "priceKilo": 3.50,
            "registrationDate": "2024-01-01",
            "status": "A"
        }))
        .unwrap();

        assert_eq!(record.id, None);
        assert_eq!(record.quantity_eggs, Some(100));
        assert_eq!(record.eggs_per_kilo, Some(20));
        assert_eq!(record.price_kilo, Some(Decimal::from_str("3.5").unwrap()));
        assert_eq!(record.registration_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert!(record.is_active());
    }

    #[test]
    fn accepts_legacy_field_names() {
        let record: EggProductionRecord =
            serde_json::from_str(r#"{"eggsKilo": 18, "estado": "I"}"#).unwrap();

        assert_eq!(record.eggs_per_kilo, Some(18));
        assert_eq!(record.status, Some(RecordStatus::Inactive));
    }

    #[test]
    fn price_keeps_exact_scale() {
        let record: EggProductionRecord =
            serde_json::from_str(r#"{"priceKilo": 12.345678901234567890}"#).unwrap();
        assert_eq!(
            record.price_kilo,
            Some(Decimal::from_str("12.345678901234567890").unwrap())
        );

        let out = serde_json::to_string(&record).unwrap();
        assert!(out.contains(r#""priceKilo":12.345678901234567890"#), "{out}");
    }

    #[test]
    fn omitted_fields_serialize_as_null() {
        let record = EggProductionRecord::default().with_id(RecordId::new(3));
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["id"], json!(3));
        assert!(value["quantityEggs"].is_null());
        assert!(value["status"].is_null());
    }
}
