use crate::{
    decoder::DeltaDecoder,
    error::AdvisorError,
    prompt::CompletionRequest,
    request::AdviceRequest,
    stream::AdviceStream,
};
use log::{debug, warn};
use reqwest::{
    blocking::{Client, Response},
    header::ACCEPT,
    StatusCode,
};
use serde::Deserialize;
use std::time::Duration;

/// Default end-to-end request timeout, body included.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// What kind of service `url` points at.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Endpoint {
    /// The hosted advisor function; receives an [`AdviceRequest`] and
    /// builds the prompt itself.
    #[default]
    Proxy,

    /// An OpenAI-compatible chat completions endpoint; the prompt is
    /// rendered client side.
    Gateway { model: String },
}

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    /// Endpoint URL.
    pub url: String,

    /// Bearer token sent with every request.
    pub api_key: String,

    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,

    pub endpoint: Endpoint,

    /// See [`DeltaDecoder::with_retry_limit`].
    pub retry_limit: Option<usize>,
}

impl AdvisorConfig {
    pub fn builder() -> AdvisorConfigBuilder {
        AdvisorConfigBuilder {
            url: None,
            api_key: None,
            timeout: Some(DEFAULT_TIMEOUT),
            endpoint: Endpoint::Proxy,
            retry_limit: None,
        }
    }
}

pub struct AdvisorConfigBuilder {
    /// Endpoint URL (required).
    url: Option<String>,

    /// Bearer token (required).
    api_key: Option<String>,

    /// Whole-request timeout (defaults to 120 s).
    timeout: Option<Duration>,

    /// Endpoint kind (defaults to [`Endpoint::Proxy`]).
    endpoint: Endpoint,

    /// Decoder retry cap (defaults to unlimited).
    retry_limit: Option<usize>,
}

impl AdvisorConfigBuilder {
    /// Endpoint URL (required).
    #[must_use]
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Bearer token (required).
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Whole-request timeout (defaults to 120 s, `None` disables it).
    #[must_use]
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Talk to a chat completions gateway directly using `model`.
    #[must_use]
    pub fn gateway(mut self, model: impl Into<String>) -> Self {
        self.endpoint = Endpoint::Gateway {
            model: model.into(),
        };
        self
    }

    /// Fail a stream whose data line keeps failing to parse after
    /// `limit` retries (defaults to retrying until the stream ends).
    #[must_use]
    pub fn retry_limit(mut self, limit: usize) -> Self {
        self.retry_limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<AdvisorConfig, AdvisorError> {
        let url = self.url.ok_or(AdvisorError::Builder("url"))?;
        let api_key = self.api_key.ok_or(AdvisorError::Builder("api_key"))?;
        Ok(AdvisorConfig {
            url,
            api_key,
            timeout: self.timeout,
            endpoint: self.endpoint,
            retry_limit: self.retry_limit,
        })
    }
}

/// Blocking client for the field advisor.
pub struct AdvisorClient {
    http: Client,
    config: AdvisorConfig,
}

impl AdvisorClient {
    pub fn new(config: AdvisorConfig) -> Result<Self, AdvisorError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    /// Sends `request` and returns the advice as a stream of growing
    /// snapshots.
    ///
    /// Status errors are reported before any of the body is read.
    pub fn stream_advice(
        &self,
        request: &AdviceRequest,
    ) -> Result<AdviceStream<Response>, AdvisorError> {
        let builder = self
            .http
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .header(ACCEPT, "text/event-stream");
        let builder = match &self.config.endpoint {
            Endpoint::Proxy => builder.json(request),
            Endpoint::Gateway { model } => builder.json(&CompletionRequest::new(model, request)),
        };

        let response = check_status(builder.send()?)?;
        debug!(
            "advice; field: {}, status: {}",
            request.field.name,
            response.status()
        );

        let decoder = match self.config.retry_limit {
            Some(limit) => DeltaDecoder::new().with_retry_limit(limit),
            None => DeltaDecoder::new(),
        };
        Ok(AdviceStream::with_decoder(response, decoder))
    }

    /// Like [`AdvisorClient::stream_advice`] but waits for the complete
    /// text.
    pub fn advice(&self, request: &AdviceRequest) -> Result<String, AdvisorError> {
        self.stream_advice(request)?.into_text()
    }
}

fn check_status(response: Response) -> Result<Response, AdvisorError> {
    let status = response.status();
    if status == StatusCode::NO_CONTENT {
        return Err(AdvisorError::NoBody);
    }
    if status.is_success() {
        return Ok(response);
    }
    let body = match status {
        StatusCode::TOO_MANY_REQUESTS | StatusCode::PAYMENT_REQUIRED => None,
        _ => response.text().ok(),
    };
    Err(status_error(status, body.as_deref()))
}

/// Maps an unsuccessful status, and the body's `{"error": ...}`
/// message if any, to an error.
fn status_error(status: StatusCode, body: Option<&str>) -> AdvisorError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    match status {
        StatusCode::TOO_MANY_REQUESTS => AdvisorError::RateLimited,
        StatusCode::PAYMENT_REQUIRED => AdvisorError::QuotaExhausted,
        status => {
            let message = body
                .and_then(|body| serde_json::from_str::<ErrorBody>(body).ok())
                .map(|body| body.error)
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_default();
            warn!("advisor error; status: {status}, message: {message}");
            AdvisorError::Status {
                code: status.as_u16(),
                message,
            }
        }
    }
}
