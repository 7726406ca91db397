//! Paths used by generated code.

use proc_macro2::TokenStream;
use quote::quote;

/// Get the access path of the `veil_schema` crate.
///
/// 1. For crates that depend on `veil_schema`, `::veil_schema` is returned.
/// 2. For crates that depend on `veil`, `::veil::schema` is returned.
/// 3. Otherwise `::veil_schema` is returned, which may be incorrect.
///
/// This reads the caller's manifest, so it is called once per derive.
pub(crate) fn veil_schema() -> syn::Path {
    veil_macro_utils::Manifest::shared(|manifest| manifest.get_crate_path("veil_schema"))
}

#[inline(always)]
pub(crate) fn info_(veil_schema_path: &syn::Path) -> TokenStream {
    quote!(#veil_schema_path::info)
}

#[inline(always)]
pub(crate) fn describe_(veil_schema_path: &syn::Path) -> TokenStream {
    quote!(#veil_schema_path::Describe)
}

#[inline(always)]
pub(crate) fn introspect_(veil_schema_path: &syn::Path) -> TokenStream {
    quote!(#veil_schema_path::Introspect)
}

#[inline(always)]
pub(crate) fn from_value_(veil_schema_path: &syn::Path) -> TokenStream {
    quote!(#veil_schema_path::FromValue)
}
