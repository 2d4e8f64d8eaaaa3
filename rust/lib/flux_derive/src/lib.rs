//! Flux attribute macros for socialbook state and request types.
//!
//! - `#[state("path")]`: a value published at a well-known state path
//! - `#[request("path")]`: a payload emitted to a request path
//!
//! Both add `impl Name { pub const PATH: &'static str = "the/path"; }`.
//! `#[state]` derives `Debug, Clone, PartialEq`; `#[request]` derives
//! `Debug, Clone`. Derives the struct already lists are not repeated.

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod expand;

use expand::Kind;

/// Define a Flux state type.
///
/// ```ignore
/// #[state("auth/state")]
/// pub struct AuthState {
///     pub phase: AuthPhase,
///     pub identity: Option<Identity>,
/// }
/// ```
#[proc_macro_attribute]
pub fn state(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as syn::ItemStruct);
    expand::expand(Kind::State, attr.into(), item)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Define a Flux request type.
///
/// ```ignore
/// #[request("post/toggle-like")]
/// pub struct ToggleLikeReq {
///     pub post_id: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn request(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as syn::ItemStruct);
    expand::expand(Kind::Request, attr.into(), item)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
