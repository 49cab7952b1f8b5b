use std::borrow::Cow;
use std::time::Duration;

/// Failures talking to the upstream generator or the metric sink.
#[initium_derive::initium_error]
pub enum UpstreamError {
    #[error("Upstream call timed out after {}s", after.as_secs())]
    Timeout { after: Duration },

    #[error("Upstream answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Upstream returned an empty body")]
    EmptyBody,

    #[error("Upstream transport error{}: {source}", format_context(context))]
    Transport { source: reqwest::Error, context: Option<Cow<'static, str>> },

    #[error("Upstream payload could not be decoded{}: {source}", format_context(context))]
    Decode { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Invalid upstream url{}: {source}", format_context(context))]
    Url { source: url::ParseError, context: Option<Cow<'static, str>> },
}

impl UpstreamError {
    /// Short, stable label reported to callers as the failure cause.
    #[must_use]
    pub const fn cause(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Status { .. } => "status",
            Self::EmptyBody => "empty-body",
            Self::Transport { .. } | Self::Url { .. } => "transport",
            Self::Decode { .. } => "decode",
        }
    }

    /// Maps a reqwest failure, keeping timeouts distinguishable.
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration, context: &'static str) -> Self {
        if err.is_timeout() {
            Self::Timeout { after: timeout }
        } else {
            Self::Transport { source: err, context: Some(context.into()) }
        }
    }
}
