use std::{sync::Arc, time::Duration};

use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::{
    config::ForecastConfig,
    credential::Credential,
    error::ForecastError,
    flatten::parse_response,
    model::{DateRange, ForecastEnd, ForecastRequest, ForecastResult},
    sink::RecordSink,
};

/// Client for the hourly timeline endpoint.
///
/// Holds the API key loaded at construction and an HTTP client bounded by the
/// configured timeout. Cheap to clone and safe to share between tasks.
#[derive(Debug, Clone)]
pub struct ForecastClient {
    config: ForecastConfig,
    credential: Credential,
    http: Client,
    sink: Option<Arc<dyn RecordSink>>,
}

impl ForecastClient {
    /// Build a client, reading the API key from `config.secret_file`.
    ///
    /// A missing key does not fail here; the first request reports it instead.
    pub fn new(config: ForecastConfig) -> Result<Self, ForecastError> {
        let credential = Credential::load(&config.secret_file);
        Self::with_credential(config, credential)
    }

    pub fn with_credential(
        config: ForecastConfig,
        credential: Credential,
    ) -> Result<Self, ForecastError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ForecastError::Client(e.to_string()))?;

        Ok(Self { config, credential, http, sink: None })
    }

    /// Attach a sink that receives the records of every successful call.
    pub fn with_sink(mut self, sink: impl RecordSink + 'static) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Fetch hourly records from `current` (today when `None`) up to `future`.
    ///
    /// `future` is either an end date or a number of days added to `current`.
    #[instrument(skip_all, fields(location = %self.config.location))]
    pub async fn get_forecast(
        &self,
        future: impl Into<ForecastEnd>,
        current: Option<NaiveDate>,
    ) -> Result<ForecastResult, ForecastError> {
        let request = self.build_request(&DateRange::new(future, current))?;
        let body = self.send(&request).await?;

        let records = parse_response(&body)?;
        debug!(records = records.len(), "flattened forecast response");

        if let Some(sink) = &self.sink {
            if let Err(err) = sink.write(&records) {
                warn!(error = %err, "failed to write forecast records to sink");
            }
        }

        Ok(records)
    }

    /// Resolve `range` and build the request target without sending anything.
    ///
    /// Fails with [`ForecastError::CredentialMissing`] when no key was loaded, so an
    /// empty key is never sent.
    pub fn build_request(&self, range: &DateRange) -> Result<ForecastRequest, ForecastError> {
        let key = self.credential.key().ok_or_else(|| ForecastError::CredentialMissing {
            path: self.credential.source().to_path_buf(),
        })?;

        let (start, end) = range.resolve()?;
        info!(%start, %end, "requesting hourly forecast");

        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            ForecastError::InvalidUrl(format!("'{}': {e}", self.config.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ForecastError::InvalidUrl(format!("'{}' cannot be a base", self.config.base_url))
            })?
            .pop_if_empty()
            .push(&self.config.location)
            .push(&start.format("%Y-%m-%d").to_string())
            .push(&end.format("%Y-%m-%d").to_string());

        let query = vec![
            ("key".to_string(), key.to_string()),
            ("include".to_string(), "hours".to_string()),
            ("elements".to_string(), self.config.elements.join(",")),
        ];

        Ok(ForecastRequest { url, query, start, end })
    }

    async fn send(&self, request: &ForecastRequest) -> Result<Value, ForecastError> {
        let timeout = self.config.timeout_secs;
        debug!(url = %request.url, "sending forecast request");

        let res = self
            .http
            .get(request.url.clone())
            .query(&request.query)
            .send()
            .await
            .map_err(|e| ForecastError::from_reqwest(e, timeout))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| ForecastError::from_reqwest(e, timeout))?;

        if !status.is_success() {
            return Err(ForecastError::RequestFailed {
                status: status.as_u16(),
                body: (!body.trim().is_empty()).then(|| truncate_body(&body)),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
