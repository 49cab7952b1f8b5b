use super::UpstreamError;
use std::borrow::Cow;

#[initium_derive::initium_error]
pub enum CatalogError {
    #[error("Feature catalog unavailable{}: {source}", format_context(context))]
    Fetch { source: UpstreamError, context: Option<Cow<'static, str>> },

    /// A refresh attempt that other readers waited on failed.
    #[error("Feature catalog unavailable (shared refresh attempt): {message}")]
    Unavailable { cause: &'static str, message: String },
}

impl CatalogError {
    /// Upstream failure label, as in [`UpstreamError::cause`].
    #[must_use]
    pub const fn cause(&self) -> &'static str {
        match self {
            Self::Fetch { source, .. } => source.cause(),
            Self::Unavailable { cause, .. } => *cause,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_rendered_on_wrapped_errors() {
        let result: Result<(), UpstreamError> = Err(UpstreamError::EmptyBody);
        let err = result.context("fetching catalog").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Feature catalog unavailable (fetching catalog): Upstream returned an empty body"
        );
        assert_eq!(err.cause(), "empty-body");
    }
}
