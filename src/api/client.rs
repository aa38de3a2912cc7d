use crate::api::AttendanceBackend;
use crate::api::error::ApiError;
use crate::api::models::{
    AuthResponse, ErrorBody, LoginRequest, MessageResponse, ProfileUpdate, ProfileUpdateResponse,
    PunchReceipt, PunchRequest, RawDayGroup, RegisterRequest, Session, SetupPinRequest, Statistics,
    UserProfile,
};
use crate::domain::models::RawRecord;
use crate::utils::validation::is_valid_pin;
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const LOGIN_PATH: &str = "/login";
const REGISTER_PATH: &str = "/register";
const PROFILE_PATH: &str = "/profile";
const SETUP_PIN_PATH: &str = "/setup-pin";
const REGISTER_POINT_PATH: &str = "/register-point";
const TODAY_POINTS_PATH: &str = "/points/today";
const MONTHLY_POINTS_PATH: &str = "/points/monthly";
const STATISTICS_PATH: &str = "/points/statistics";

/// HTTP adapter for the time-clock backend.
#[derive(Debug, Clone)]
pub struct PontoClient {
    http: reqwest::Client,
    base_url: String,
}

impl PontoClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.canonical_reason().unwrap_or("unknown error").to_string()
                } else {
                    body.trim().to_string()
                }
            });

        tracing::warn!("Backend responded {}: {}", status, message);

        if status == StatusCode::UNAUTHORIZED && is_session_failure(&message) {
            Err(ApiError::Unauthorized(message))
        } else {
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        tracing::info!("Logging in {}", email);
        self.send(
            self.http
                .post(self.url(LOGIN_PATH))
                .json(&LoginRequest { email, password }),
        )
        .await
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ApiError> {
        tracing::info!("Registering account for {}", email);
        self.send(self.http.post(self.url(REGISTER_PATH)).json(&RegisterRequest {
            name,
            email,
            password,
        }))
        .await
    }

    pub async fn profile(&self, session: &Session) -> Result<UserProfile, ApiError> {
        self.send(self.http.get(self.url(PROFILE_PATH)).bearer_auth(&session.token))
            .await
    }

    pub async fn update_profile(
        &self,
        session: &Session,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, ApiError> {
        let response: ProfileUpdateResponse = self
            .send(
                self.http
                    .put(self.url(PROFILE_PATH))
                    .bearer_auth(&session.token)
                    .json(update),
            )
            .await?;

        Ok(response.user)
    }

    pub async fn setup_pin(&self, session: &Session, pin: &str) -> Result<Option<String>, ApiError> {
        if !is_valid_pin(pin) {
            return Err(ApiError::InvalidPin);
        }

        let response: MessageResponse = self
            .send(
                self.http
                    .post(self.url(SETUP_PIN_PATH))
                    .bearer_auth(&session.token)
                    .json(&SetupPinRequest { pin }),
            )
            .await?;

        Ok(response.message)
    }

    pub async fn statistics(&self, session: &Session) -> Result<Statistics, ApiError> {
        self.send(self.http.get(self.url(STATISTICS_PATH)).bearer_auth(&session.token))
            .await
    }
}

/// The backend also answers 401 for a wrong PIN, biometric token or current
/// password. Only the auth middleware's messages mean the token itself is dead.
fn is_session_failure(message: &str) -> bool {
    matches!(
        message,
        "Token não fornecido" | "Token inválido" | "Usuário não autenticado" | "Unauthorized"
    )
}

#[async_trait]
impl AttendanceBackend for PontoClient {
    async fn fetch_today(&self, session: &Session) -> Result<Vec<RawRecord>, ApiError> {
        let records: Option<Vec<RawRecord>> = self
            .send(self.http.get(self.url(TODAY_POINTS_PATH)).bearer_auth(&session.token))
            .await?;

        Ok(records.unwrap_or_default())
    }

    async fn fetch_month(
        &self,
        session: &Session,
        year: i32,
        month: u32,
    ) -> Result<Vec<RawDayGroup>, ApiError> {
        tracing::debug!("Fetching points for {}/{}", month, year);
        let groups: Option<Vec<RawDayGroup>> = self
            .send(
                self.http
                    .get(self.url(MONTHLY_POINTS_PATH))
                    .bearer_auth(&session.token)
                    .query(&[("year", year.to_string()), ("month", month.to_string())]),
            )
            .await?;

        Ok(groups.unwrap_or_default())
    }

    async fn submit_punch(
        &self,
        session: &Session,
        request: &PunchRequest,
    ) -> Result<PunchReceipt, ApiError> {
        tracing::info!(
            "Submitting {} punch for {} via {:?}",
            request.punch_type,
            session.user.email,
            request.auth_method
        );
        self.send(
            self.http
                .post(self.url(REGISTER_POINT_PATH))
                .bearer_auth(&session.token)
                .json(request),
        )
        .await
    }
}
