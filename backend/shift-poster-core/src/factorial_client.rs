// src/factorial_client.rs

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE, COOKIE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::ApiConfig;
use crate::factorial_data::{AttendancePeriod, NewShift, Shift};

pub const PERIODS_ENDPOINT: &str = "/attendance/periods";
pub const SHIFTS_ENDPOINT: &str = "/attendance/shifts";

// --- Errors ---

#[derive(Error, Debug)]
pub enum FactorialError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Factorial API error: Status={status}, Message='{message}'")]
    Api { status: StatusCode, message: String },

    #[error("Session cookie cannot be sent as a header value")]
    InvalidSession,
}

// --- Session ---

/// An already-authenticated browser session, handed to every remote call.
#[derive(Clone)]
pub struct Session {
    cookie: HeaderValue,
}

impl Session {
    pub fn from_cookie(cookie: &str) -> Result<Self, FactorialError> {
        let mut cookie =
            HeaderValue::from_str(cookie.trim()).map_err(|_| FactorialError::InvalidSession)?;
        cookie.set_sensitive(true);
        Ok(Self { cookie })
    }

    fn cookie(&self) -> &HeaderValue {
        &self.cookie
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("cookie", &"<redacted>").finish()
    }
}

// --- API Seam ---

/// The four attendance calls the poster makes.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    async fn list_periods(
        &self,
        session: &Session,
        year: i32,
        month: u32,
    ) -> Result<Vec<AttendancePeriod>, FactorialError>;

    /// Returns the raw response body.
    async fn create_shift(
        &self,
        session: &Session,
        shift: &NewShift,
    ) -> Result<String, FactorialError>;

    async fn list_shifts(&self, session: &Session) -> Result<Vec<Shift>, FactorialError>;

    async fn delete_shift(&self, session: &Session, shift_id: u64) -> Result<(), FactorialError>;
}

// --- Reqwest Client ---

#[derive(Clone, Debug)]
pub struct FactorialClient {
    http_client: Client,
    base_url: Url,
}

impl FactorialClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FactorialError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        let base_url = Url::parse(base_url)?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, FactorialError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, FactorialError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, endpoint))?)
    }

    fn build_request(&self, session: &Session, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(COOKIE, session.cookie().clone())
            .header(ACCEPT, "application/json")
    }

    /// Executes the request, turning any non-2xx reply into [`FactorialError::Api`].
    /// The body of a successful response is left unread.
    async fn execute_checked(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<Response, FactorialError> {
        let request = request_builder.build()?;
        let request_url = request.url().to_string();
        debug!("Sending request for '{}' to URL: {}", context_msg, request_url);

        let response = match self.http_client.execute(request).await {
            Ok(resp) => resp,
            Err(e) => {
                error!(
                    "HTTP execution failed for '{}' (URL: {}): {}",
                    context_msg, request_url, e
                );
                return Err(FactorialError::Request(e));
            }
        };

        let status = response.status();
        debug!("Received response for '{}': Status={}", context_msg, status);
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("Failed to read error body: {}", e));
        error!(
            "API error response for '{}': Status={}, Body='{}'",
            context_msg, status, message
        );
        Err(FactorialError::Api { status, message })
    }

    async fn send_for_text(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<String, FactorialError> {
        let response = self.execute_checked(request_builder, context_msg).await?;
        let body = response.text().await?;
        debug!("Raw response body for '{}': {}", context_msg, body);
        Ok(body)
    }

    async fn send_and_deserialize<T: DeserializeOwned>(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<T, FactorialError> {
        let body = self.send_for_text(request_builder, context_msg).await?;
        serde_json::from_str::<T>(&body).map_err(|e| {
            error!("JSON deserialization failed for '{}': {}", context_msg, e);
            FactorialError::Json(e)
        })
    }
}

#[async_trait]
impl AttendanceApi for FactorialClient {
    async fn list_periods(
        &self,
        session: &Session,
        year: i32,
        month: u32,
    ) -> Result<Vec<AttendancePeriod>, FactorialError> {
        let mut url = self.endpoint_url(PERIODS_ENDPOINT)?;
        url.query_pairs_mut()
            .append_pair("year", &year.to_string())
            .append_pair("month", &month.to_string());
        let request = self.build_request(session, Method::GET, url);
        self.send_and_deserialize(request, "list attendance periods")
            .await
    }

    async fn create_shift(
        &self,
        session: &Session,
        shift: &NewShift,
    ) -> Result<String, FactorialError> {
        let url = self.endpoint_url(SHIFTS_ENDPOINT)?;
        let request = self
            .build_request(session, Method::POST, url)
            .header(CONTENT_TYPE, "application/json")
            .json(shift);
        self.send_for_text(request, "create shift").await
    }

    async fn list_shifts(&self, session: &Session) -> Result<Vec<Shift>, FactorialError> {
        let url = self.endpoint_url(SHIFTS_ENDPOINT)?;
        let request = self.build_request(session, Method::GET, url);
        self.send_and_deserialize(request, "list shifts").await
    }

    async fn delete_shift(&self, session: &Session, shift_id: u64) -> Result<(), FactorialError> {
        let url = self.endpoint_url(&format!("{}/{}", SHIFTS_ENDPOINT, shift_id))?;
        let request = self.build_request(session, Method::DELETE, url);
        self.execute_checked(request, "delete shift").await?;
        Ok(())
    }
}
