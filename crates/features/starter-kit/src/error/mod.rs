mod catalog;
mod dispatch;
mod rejection;
mod upstream;

pub use catalog::{CatalogError, CatalogErrorExt};
pub use dispatch::{DispatchError, DispatchErrorExt};
pub use rejection::{Rejection, RejectionExt};
pub use upstream::{UpstreamError, UpstreamErrorExt};

use initium_domain::starter_kit::StarterKitType;
use std::borrow::Cow;

/// Everything a starter-kit operation can fail with.
#[initium_derive::initium_error]
pub enum StarterKitError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: Cow<'static, str> },

    #[error("Request rejected{}: {source}", format_context(context))]
    Rejected { source: Rejection, context: Option<Cow<'static, str>> },

    #[error("Upstream unavailable{}: {source}", format_context(context))]
    UpstreamUnavailable { source: CatalogError, context: Option<Cow<'static, str>> },

    #[error("Generation failed{}: {source}", format_context(context))]
    GenerationFailed { source: DispatchError, context: Option<Cow<'static, str>> },

    #[error("Starter-kit setup failed{}: {source}", format_context(context))]
    Setup { source: UpstreamError, context: Option<Cow<'static, str>> },

    #[error("Library generation is not available for {kind}")]
    LibraryGenerationUnavailable { kind: StarterKitType },

    #[cfg(feature = "server")]
    #[error("Slice state error{}: {source}", format_context(context))]
    State {
        source: initium_kernel::server::state::ApiStateError,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal starter-kit error{}: {message}", format_context(context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl StarterKitError {
    pub(crate) fn invalid_request(message: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidRequest { message: message.into() }
    }

    /// The rejection to report, whether it came from validation or dispatch.
    #[must_use]
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Self::Rejected { source, .. } => Some(source.clone()),
            Self::GenerationFailed { source: DispatchError::Unsupported { kind }, .. } => {
                Some(Rejection::UnsupportedType { kind: *kind })
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_dispatch_reads_as_a_rejection() {
        let err = StarterKitError::from(DispatchError::Unsupported { kind: StarterKitType::Human });
        assert_eq!(err.rejection(), Some(Rejection::UnsupportedType { kind: StarterKitType::Human }));
        assert_eq!(err.rejection().map(|r| r.code()), Some("UnsupportedType"));
    }

    #[test]
    fn sources_convert_into_the_slice_error() {
        let err: StarterKitError = Rejection::NoFeaturesAvailable.into();
        assert_eq!(
            err.to_string(),
            "Request rejected: No features are available from the upstream generator"
        );
    }
}
