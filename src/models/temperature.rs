use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;
use uuid::Uuid;

/// Status text returned after a successful submission
pub const INSERTED_STATUS: &str = "Document inserted successfully.";

/// Human-readable timestamp format used in query responses,
/// e.g. `Sun Oct 18 2026 10:00:00 GMT+0000 (UTC)`
const DISPLAY_TIMESTAMP_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z (UTC)";

/// Writes finite temperatures as JSON numbers and anything else
/// (NaN, infinities) as its string marker, since JSON has no NaN.
fn serialize_temperature<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_str(&value.to_string())
    }
}

/// Raw text fields of a submission, as received from the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemperatureForm {
    pub username: Option<String>,
    pub q1: Option<String>,
    pub q2: Option<String>,
    pub temperature: Option<String>,
}

impl TemperatureForm {
    /// Pick the known fields out of the submitted text fields; others are ignored.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            username: fields.get("username").cloned(),
            q1: fields.get("q1").cloned(),
            q2: fields.get("q2").cloned(),
            temperature: fields.get("temperature").cloned(),
        }
    }
}

/// One persisted temperature submission.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureRecord {
    pub timestamp: DateTime<Utc>,
    pub username: String,
    pub q1: bool,
    pub q2: bool,
    pub temperature: f64,
    /// Object store key of the photo, if one was submitted
    pub image_key: Option<String>,
}

impl TemperatureRecord {
    /// Build a record from the raw form, stamped with the current time.
    pub fn from_form(form: &TemperatureForm, image_key: Option<String>) -> Self {
        Self::from_form_at(form, image_key, Utc::now())
    }

    pub fn from_form_at(
        form: &TemperatureForm,
        image_key: Option<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp,
            username: form.username.clone().unwrap_or_default(),
            q1: parse_flag(form.q1.as_deref()),
            q2: parse_flag(form.q2.as_deref()),
            temperature: parse_temperature(form.temperature.as_deref()),
            image_key,
        }
    }
}

/// `"true"` in any letter case is true; anything else, including absence, is false.
pub fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

/// Parse a temperature, yielding NaN when the field is missing or not a number.
pub fn parse_temperature(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Public URL of a stored photo, or an empty string when there is none.
pub fn image_url(public_base_url: &str, image_key: Option<&str>) -> String {
    match image_key {
        Some(key) if !key.is_empty() => {
            format!("{}/{}", public_base_url.trim_end_matches('/'), key)
        }
        _ => String::new(),
    }
}

/// Response body for a successful submission.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub status: String,
    pub inserted_count: u64,
    pub inserted_id: Uuid,
}

impl SubmitResponse {
    pub fn inserted(inserted_id: Uuid) -> Self {
        Self {
            status: INSERTED_STATUS.to_string(),
            inserted_count: 1,
            inserted_id,
        }
    }
}

/// One item of a user's history.
#[derive(Debug, Serialize, ToSchema)]
pub struct TemperatureRecordResponse {
    /// One-based position in the store's return order
    pub sn: usize,
    pub timestamp: String,
    pub username: String,
    pub q1: bool,
    pub q2: bool,
    /// A number, or a string marker such as "NaN" when the submitted value did not parse
    #[serde(serialize_with = "serialize_temperature")]
    pub temperature: f64,
    /// Public URL of the photo, empty when none was submitted
    pub image: String,
}

impl TemperatureRecordResponse {
    pub fn from_record(sn: usize, record: &TemperatureRecord, public_base_url: &str) -> Self {
        Self {
            sn,
            timestamp: record.timestamp.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
            username: record.username.clone(),
            q1: record.q1,
            q2: record.q2,
            temperature: record.temperature,
            image: image_url(public_base_url, record.image_key.as_deref()),
        }
    }

    /// Number records 1..=N in the given order.
    pub fn from_records(records: &[TemperatureRecord], public_base_url: &str) -> Vec<Self> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| Self::from_record(index + 1, record, public_base_url))
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
