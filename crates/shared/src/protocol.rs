use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::CertificateRequest;

/// Marker value the submit endpoint places in [`SubmitCertificateResponse::responce`].
pub const AFFIRMATIVE_CONFIRMATION: &str = "Ok";

/// Body returned by `POST /request-certificate`.
///
/// The collaborator spells its confirmation key `responce`; the field keeps
/// that name so the wire contract round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitCertificateResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responce: Option<String>,
}

impl SubmitCertificateResponse {
    pub fn ok() -> Self {
        Self {
            responce: Some(AFFIRMATIVE_CONFIRMATION.to_string()),
        }
    }

    pub fn is_affirmative(&self) -> bool {
        self.responce.as_deref() == Some(AFFIRMATIVE_CONFIRMATION)
    }
}

/// One row of `GET /request-list`.
///
/// Decoding tolerates missing, `null`, numeric and boolean values so a single
/// odd row never poisons the list; everything is kept in string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequestRecord {
    #[serde(default, deserialize_with = "lenient_string")]
    pub address_to: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub purpose: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub issued_on: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub employee_id: String,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_no: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,
}

impl CertificateRequestRecord {
    pub fn request(&self) -> CertificateRequest {
        CertificateRequest {
            address_to: self.address_to.clone(),
            purpose: self.purpose.clone(),
            issued_on: self.issued_on.clone(),
            employee_id: self.employee_id.clone(),
        }
    }

    pub fn reference_no_or_empty(&self) -> &str {
        self.reference_no.as_deref().unwrap_or_default()
    }

    pub fn status_or_empty(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }
}

impl From<CertificateRequest> for CertificateRequestRecord {
    fn from(value: CertificateRequest) -> Self {
        Self {
            address_to: value.address_to,
            purpose: value.purpose,
            issued_on: value.issued_on,
            employee_id: value.employee_id,
            reference_no: None,
            status: None,
        }
    }
}

/// Decode a request-list body. Non-array bodies yield `None`; rows that are not
/// objects are skipped.
pub fn decode_record_list(body: Value) -> Option<Vec<CertificateRequestRecord>> {
    match body {
        Value::Array(rows) => Some(
            rows.into_iter()
                .filter_map(|row| serde_json::from_value(row).ok())
                .collect(),
        ),
        _ => None,
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value))
}
