//! Code generation.

// -----------------------------------------------------------------------------
// Modules

mod trait_describe;
mod trait_from_value;
mod trait_introspect;

use proc_macro::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::derive_data::IntrospectDerive;

/// Provided for `#[derive(Introspect)]`.
pub(crate) fn match_introspect_impls(ast: DeriveInput) -> TokenStream {
    let derive = match IntrospectDerive::from_input(&ast) {
        Ok(val) => val,
        Err(err) => return err.into_compile_error().into(),
    };

    let impls: proc_macro2::TokenStream = match &derive {
        IntrospectDerive::Struct(meta, fields) => {
            let describe = trait_describe::impl_struct(meta, fields);
            let introspect = trait_introspect::impl_struct(meta, fields);
            let from_value = meta
                .attrs()
                .impl_from_value
                .then(|| trait_from_value::impl_struct(meta, fields));
            quote!(#describe #introspect #from_value)
        }
        IntrospectDerive::Enum(meta, variants) => {
            let describe = trait_describe::impl_enum(meta, variants);
            let introspect = trait_introspect::impl_enum(meta, variants);
            let from_value = meta
                .attrs()
                .impl_from_value
                .then(|| trait_from_value::impl_enum(meta, variants));
            quote!(#describe #introspect #from_value)
        }
    };

    TokenStream::from(quote! {
        const _: () = {
            #impls
        };
    })
}
