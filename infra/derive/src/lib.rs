#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every Initium crate.
//!
//! * [`macro@initium_error`] wires an error enum into `thiserror` plus the context/`From` helpers.
//! * [`macro@initium_slice`] turns a struct into a registrable feature slice.
//! * [`macro@api_model`] and [`macro@api_handler`] keep DTOs and handlers consistent with `OpenAPI`.
//! * [`macro@main`] boots the Tokio runtime from a named profile.
//!
//! Examples are `ignore`d here because they need the consuming crates to compile.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Attribute macro that replaces `async fn main` with a synchronous entry point
/// running on a runtime built by `initium_runtime`.
///
/// # Arguments
///
/// * `server` - Multi-threaded profile sized for the HTTP server.
/// * `compact` - Fewer workers and smaller stacks for tooling and tests.
/// * `default` (or no argument) - `RuntimeConfig::default()`.
///
/// # Examples
///
/// ```rust,ignore
/// #[initium_runtime::main(server)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Defines an API data transfer object.
///
/// Adds `Debug`, `Serialize` and `Deserialize` when they are not derived yet,
/// `utoipa::ToSchema` behind the consumer's `server` feature, and the serde
/// policy `rename_all = "camelCase"` + `deny_unknown_fields`.
///
/// # Arguments
///
/// * `rename_all = "..."` - Overrides the serde rename policy.
/// * `deny_unknown_fields = false` - Accepts unknown fields.
///
/// # Example
///
/// ```rust,ignore
/// #[initium_derive::api_model]
/// pub struct ComponentBody {
///     pub product_name: String,
///     pub application_code: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Registers an axum handler with `utoipa::path` (behind the consumer's
/// `server` feature) and silences `clippy::unused_async`.
///
/// # Example
///
/// ```rust,ignore
/// #[initium_derive::api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> impl IntoResponse { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Declares a domain error enum.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * `<Name>Ext` trait with `.context(...)` for `Result<T, Name>`, and for
///   `Result<T, Source>` of every variant that wraps a source error.
/// * `From<Source>` for every variant with a `source` field (or a field marked
///   `#[source]`/`#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal { message, context }`
///   variant exists.
/// * A module-private `format_context` helper for `#[error(...)]` strings.
///
/// # Requirements
///
/// Variants use named fields or no fields at all. A variant with a source
/// must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use std::borrow::Cow;
///
/// #[initium_derive::initium_error]
/// pub enum CatalogError {
///     #[error("Catalog fetch failed{}: {source}", format_context(.context))]
///     Fetch { source: UpstreamError, context: Option<Cow<'static, str>> },
///
///     #[error("Internal catalog error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn initium_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Declares a vertical-slice handle.
///
/// The annotated struct becomes `<Name>Inner`; `<Name>` is an `Arc` wrapper that
/// derefs to it and implements `initium_kernel::registry::FeatureSlice`.
///
/// # Example
/// ```rust,ignore
/// #[initium_derive::initium_slice]
/// pub struct StarterKit {
///     pub service: StarterKitService,
/// }
///
/// let slice = StarterKit::new(StarterKitInner { service });
/// ```
#[proc_macro_attribute]
pub fn initium_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
