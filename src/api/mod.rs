pub mod auth;
pub mod client;
pub mod error;
pub mod models;

pub use auth::{AuthMethod, AuthProof, AuthProofError};
pub use client::PontoClient;
pub use error::ApiError;
pub use models::{PunchReceipt, PunchRequest, RawDayGroup, Session, UserProfile};

use crate::domain::models::RawRecord;
use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};

/// What the attendance flows need from the backend.
#[async_trait]
pub trait AttendanceBackend: Send + Sync {
    async fn fetch_today(&self, session: &Session) -> Result<Vec<RawRecord>, ApiError>;

    async fn fetch_month(
        &self,
        session: &Session,
        year: i32,
        month: u32,
    ) -> Result<Vec<RawDayGroup>, ApiError>;

    async fn submit_punch(
        &self,
        session: &Session,
        request: &PunchRequest,
    ) -> Result<PunchReceipt, ApiError>;

    /// There is no per-day endpoint: the month is fetched and the matching
    /// day group picked out.
    async fn fetch_day(&self, session: &Session, date: NaiveDate) -> Result<Vec<RawRecord>, ApiError> {
        let groups = self.fetch_month(session, date.year(), date.month()).await?;

        Ok(groups
            .into_iter()
            .find(|group| group.day() == Some(date))
            .map(|group| group.records)
            .unwrap_or_default())
    }
}
