use super::UpstreamError;
use initium_domain::starter_kit::StarterKitType;
use std::borrow::Cow;

#[initium_derive::initium_error]
pub enum DispatchError {
    #[error("Starter kit {kind} has no generator")]
    Unsupported { kind: StarterKitType },

    #[error("Generation failed{}: {source}", format_context(context))]
    Upstream { source: UpstreamError, context: Option<Cow<'static, str>> },
}
