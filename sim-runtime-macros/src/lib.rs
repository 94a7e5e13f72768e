//! Attribute macros that turn async functions into tests on the simulated-time runtime

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Error, ItemFn};

/// Runs an async test on a fresh simulated-time runtime
///
/// Meant for crates depending on `sim-runtime`.
#[proc_macro_attribute]
pub fn test(_args: TokenStream, body: TokenStream) -> TokenStream {
    wrap_in_runtime(body.into(), quote!(::sim_runtime::rt::Rt)).into()
}

/// Same as [`test`], for use inside `sim-runtime` itself
#[proc_macro_attribute]
pub fn test_priv(_args: TokenStream, body: TokenStream) -> TokenStream {
    wrap_in_runtime(body.into(), quote!(crate::rt::Rt)).into()
}

fn wrap_in_runtime(body: TokenStream2, runtime: TokenStream2) -> TokenStream2 {
    let test_fn: ItemFn = match syn::parse2(body) {
        Ok(test_fn) => test_fn,
        Err(e) => return e.to_compile_error(),
    };

    if test_fn.sig.asyncness.is_none() {
        return Error::new_spanned(&test_fn.sig.fn_token, "simulated tests must be `async fn`")
            .to_compile_error();
    }

    let ItemFn {
        attrs,
        vis,
        sig,
        block,
    } = test_fn;
    let name = &sig.ident;

    quote! {
        #(#attrs)*
        #[test]
        #vis fn #name() {
            <#runtime>::default().block_on(async move #block)
        }
    }
}
