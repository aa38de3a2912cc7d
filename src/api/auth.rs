use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Pin,
    Biometric,
}

/// Confirmation attached to a punch. The ceremony producing it belongs to the
/// platform; the client only forwards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthProof {
    Biometric { credential_id: String },
    Pin { code: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthProofError {
    #[error("no device credential registered, a PIN is required")]
    PinRequired,
}

impl AuthProof {
    /// An explicit PIN wins; otherwise the registered device credential is
    /// used, falling back to asking for a PIN when there is none.
    pub fn select(credential_id: Option<&str>, pin: Option<&str>) -> Result<Self, AuthProofError> {
        let pin = pin.map(str::trim).filter(|pin| !pin.is_empty());
        let credential_id = credential_id.filter(|id| !id.is_empty());

        match (pin, credential_id) {
            (Some(code), _) => Ok(AuthProof::Pin {
                code: code.to_string(),
            }),
            (None, Some(credential_id)) => Ok(AuthProof::Biometric {
                credential_id: credential_id.to_string(),
            }),
            (None, None) => Err(AuthProofError::PinRequired),
        }
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            AuthProof::Biometric { .. } => AuthMethod::Biometric,
            AuthProof::Pin { .. } => AuthMethod::Pin,
        }
    }

    /// Token sent as `biometricToken`: the credential id bytes in standard base64.
    pub fn biometric_token(&self) -> Option<String> {
        match self {
            AuthProof::Biometric { credential_id } => Some(STANDARD.encode(credential_id.as_bytes())),
            AuthProof::Pin { .. } => None,
        }
    }

    pub fn pin(&self) -> Option<&str> {
        match self {
            AuthProof::Pin { code } => Some(code),
            AuthProof::Biometric { .. } => None,
        }
    }
}

/// Fresh identifier for a device credential enrolled from the bot.
pub fn new_credential_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
