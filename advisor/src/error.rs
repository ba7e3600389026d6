use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("data line failed to parse {attempts} times: {line}")]
    MalformedPayload {
        line: String,
        attempts: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("missing required parameter '{0}'")]
    Builder(&'static str),

    #[error("rate limited")]
    RateLimited,

    #[error("quota exhausted")]
    QuotaExhausted,

    #[error("response has no body")]
    NoBody,

    #[error("advisor returned {code}: {message}")]
    Status { code: u16, message: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Decode(#[from] DecodeError),
}

impl AdvisorError {
    /// Short message suitable for a transient user notification.
    ///
    /// Only rate limiting and quota exhaustion get their own wording;
    /// everything else is a generic failure.
    pub fn notice(&self) -> &'static str {
        match self {
            Self::RateLimited => "Rate limit exceeded. Please try again later.",
            Self::QuotaExhausted => "AI credits depleted. Please add credits to continue.",
            _ => "Failed to get AI analysis. Please try again.",
        }
    }
}
