use proc_macro2::TokenStream;
use quote::quote;
use syn::{Error, Ident, ItemFn, ReturnType, Type};

/// Expands `#[initium_runtime::main]`.
#[must_use]
pub fn expand_main(args: TokenStream, input: ItemFn) -> TokenStream {
    if input.sig.asyncness.is_none() {
        return Error::new_spanned(
            input.sig.fn_token,
            "#[initium_runtime::main] can only be used on async functions",
        )
        .to_compile_error();
    }

    if !returns_result(&input.sig.output) {
        return Error::new_spanned(
            &input.sig.output,
            "#[initium_runtime::main] requires a Result return type",
        )
        .to_compile_error();
    }

    let profile = match profile_variant(args) {
        Ok(profile) => profile,
        Err(err) => return err.to_compile_error(),
    };

    let ItemFn { attrs, vis, sig, block, .. } = &input;
    let name = &sig.ident;
    let output = &sig.output;

    quote! {
        #(#attrs)*
        #vis fn #name() #output {
            let config = ::initium_runtime::RuntimeConfig::for_profile(
                ::initium_runtime::RuntimeProfile::#profile,
            );
            let runtime = ::initium_runtime::build_runtime(&config)?;
            runtime.block_on(async move #block)
        }
    }
}

fn profile_variant(args: TokenStream) -> syn::Result<Ident> {
    if args.is_empty() {
        return Ok(Ident::new("Default", proc_macro2::Span::call_site()));
    }

    let ident: Ident = syn::parse2(args)?;
    let variant = match ident.to_string().as_str() {
        "server" => "Server",
        "compact" => "Compact",
        "default" => "Default",
        _ => {
            return Err(Error::new_spanned(
                ident,
                "unknown runtime profile, expected one of: server, compact, default",
            ));
        },
    };

    Ok(Ident::new(variant, ident.span()))
}

fn returns_result(output: &ReturnType) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };
    path.path.segments.last().is_some_and(|seg| seg.ident == "Result")
}
