use crate::api::auth::{AuthMethod, AuthProof};
use crate::domain::models::{PunchType, RawRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Authenticated session passed explicitly into every backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Session {
            token: response.token,
            user: response.user,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileUpdateResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub(crate) struct SetupPinRequest<'a> {
    pub pin: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}

/// Day bucket as grouped by the backend's monthly endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDayGroup {
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub records: Vec<RawRecord>,
}

impl RawDayGroup {
    /// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
    pub fn day(&self) -> Option<NaiveDate> {
        let date = self.date.trim();
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .ok()
            .or_else(|| {
                chrono::DateTime::parse_from_rfc3339(date)
                    .ok()
                    .map(|timestamp| timestamp.date_naive())
            })
    }
}

/// Go encodes empty slices as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PunchRequest {
    #[serde(rename = "type")]
    pub punch_type: PunchType,
    pub location: String,
    pub device: String,
    pub auth_method: AuthMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biometric_token: Option<String>,
}

impl PunchRequest {
    pub fn new(punch_type: PunchType, proof: &AuthProof, device: &str) -> Self {
        Self {
            punch_type,
            location: device.to_string(),
            device: device.to_string(),
            auth_method: proof.method(),
            pin: proof.pin().map(str::to_string),
            biometric_token: proof.biometric_token(),
        }
    }
}

/// Backend answer to a punch submission. Authoritative for what was stored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PunchReceipt {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub record: RawRecord,
}

impl PunchReceipt {
    /// The committed record as reported by the backend. Device, location and
    /// auth method are taken from the request when the response omits them.
    pub fn into_raw(self, request: &PunchRequest) -> RawRecord {
        let auth_method = match request.auth_method {
            AuthMethod::Pin => "pin",
            AuthMethod::Biometric => "biometric",
        };

        RawRecord {
            device: self.record.device.or_else(|| Some(request.device.clone())),
            location: self.record.location.or_else(|| Some(request.location.clone())),
            auth_method: self
                .record
                .auth_method
                .or_else(|| Some(auth_method.to_string())),
            ..self.record
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Statistics {
    pub total_hours: f64,
    pub days_worked: i64,
    pub late_days: i64,
    pub average_hours_per_day: f64,
    pub current_month: String,
}
