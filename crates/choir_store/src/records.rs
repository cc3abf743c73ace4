//! Typed documents for the non-song collections.
//!
//! Stored documents are loose: ids may live under `docId` or be numeric,
//! optional fields may be `null`, and timestamps come as RFC 3339 strings,
//! epoch milliseconds or `{seconds, nanoseconds}` objects. [`decode`] smooths
//! the first two over before serde applies each record's defaults.

use chrono::{DateTime, Utc};
use choir_core::VoicePart;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::StoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Songs,
    Announcements,
    Absences,
    QtSharing,
    MealSignups,
    Donations,
}

impl Collection {
    pub const ALL: [Collection; 6] = [
        Collection::Songs,
        Collection::Announcements,
        Collection::Absences,
        Collection::QtSharing,
        Collection::MealSignups,
        Collection::Donations,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Songs => "songs",
            Collection::Announcements => "announcements",
            Collection::Absences => "absences",
            Collection::QtSharing => "qtSharing",
            Collection::MealSignups => "mealSignups",
            Collection::Donations => "donations",
        }
    }
}

/// Decode a stored document into a typed record.
pub fn decode<T: serde::de::DeserializeOwned>(document: Value) -> Result<T, StoreError> {
    let mut fields = match document {
        Value::Object(fields) => fields,
        other => {
            return Err(StoreError::Validation(format!(
                "expected a document object, got {other}"
            )));
        }
    };
    fields.retain(|_, v| !v.is_null());

    let id = match (fields.remove("id"), fields.remove("docId")) {
        (Some(id), _) | (None, Some(id)) => id,
        (None, None) => return Err(StoreError::Validation("document has no id".into())),
    };
    let id = match id {
        Value::String(s) if !s.trim().is_empty() => s,
        Value::Number(n) => n.to_string(),
        other => {
            return Err(StoreError::Validation(format!("invalid document id: {other}")));
        }
    };
    fields.insert("id".into(), Value::String(id));

    Ok(serde_json::from_value(Value::Object(fields))?)
}

fn deserialize_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<Value> = Option::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| D::Error::custom(format!("invalid timestamp {s}: {e}"))),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {n}"))),
        Some(Value::Object(obj)) => {
            let seconds = obj
                .get("seconds")
                .or_else(|| obj.get("_seconds"))
                .and_then(Value::as_i64)
                .ok_or_else(|| D::Error::custom("timestamp object without seconds"))?;
            let nanos = obj
                .get("nanoseconds")
                .or_else(|| obj.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            let nanos = u32::try_from(nanos).map_err(D::Error::custom)?;
            DateTime::<Utc>::from_timestamp(seconds, nanos)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {seconds}")))
        }
        Some(other) => Err(D::Error::custom(format!(
            "expected timestamp, got {other}"
        ))),
    }
}

fn default_true() -> bool {
    true
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub details: Map<String, Value>,
    #[serde(default)]
    pub notes: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbsenceStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Absence {
    pub id: String,
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub voice_part: Option<VoicePart>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub status: AbsenceStatus,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberType {
    #[default]
    #[serde(rename = "성도")]
    Saint,
    #[serde(rename = "집사")]
    Deacon,
    #[serde(rename = "권사")]
    Elder,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QtSharing {
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub member_id: Option<String>,
    #[serde(default)]
    pub member_name: Option<String>,
    #[serde(default)]
    pub member_type: MemberType,
    #[serde(default)]
    pub bible_verse: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub dislikes: u32,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealStatus {
    #[default]
    Open,
    Confirmed,
    Full,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealSignup {
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub status: MealStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Venmo,
    Zelle,
}

fn default_payment_methods() -> Vec<PaymentMethod> {
    vec![PaymentMethod::Venmo, PaymentMethod::Zelle]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub id: String,
    #[serde(default)]
    pub recipient_id: Option<String>,
    #[serde(default)]
    pub recipient_name: Option<String>,
    #[serde(default)]
    pub recipient_handle: Option<String>,
    #[serde(default = "default_payment_methods")]
    pub payment_methods: Vec<PaymentMethod>,
    #[serde(default)]
    pub qr_codes: Map<String, Value>,
    #[serde(default)]
    pub bank_details: Map<String, Value>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_opt_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}
