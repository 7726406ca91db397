use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

use crate::derive_data::{EnumVariant, StructField, TypeMeta};
use crate::path::{describe_, info_, introspect_};

fn impl_introspect(meta: &TypeMeta, field_types: &[&Type], inspect: TokenStream) -> TokenStream {
    let veil_schema_path = meta.veil_schema_path();
    let info_ = info_(veil_schema_path);
    let describe_ = describe_(veil_schema_path);
    let introspect_ = introspect_(veil_schema_path);

    let ident = meta.ident();
    let (impl_generics, ty_generics, where_clause) = meta.split_generics_with(
        quote!(#describe_ + ::core::marker::Send + ::core::marker::Sync),
        field_types,
        quote!(#describe_ + #introspect_),
    );

    quote! {
        impl #impl_generics #introspect_ for #ident #ty_generics #where_clause {
            #[inline]
            fn descriptor(&self) -> &'static #info_::TypeDescriptor {
                <Self as #describe_>::type_descriptor()
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn inspect(&self) -> #veil_schema_path::Inspect<'_> {
                #inspect
            }
        }
    }
}

pub(crate) fn impl_struct(meta: &TypeMeta, fields: &[StructField]) -> TokenStream {
    let veil_schema_path = meta.veil_schema_path();
    let field_types: Vec<&Type> = fields.iter().map(|f| f.ty).collect();

    impl_introspect(
        meta,
        &field_types,
        quote!(#veil_schema_path::Inspect::Object(#veil_schema_path::ObjectRef::new(self))),
    )
}

pub(crate) fn impl_enum(meta: &TypeMeta, variants: &[EnumVariant]) -> TokenStream {
    let veil_schema_path = meta.veil_schema_path();
    let arms = variants.iter().map(|variant| {
        let ident = variant.ident;
        let name = variant.name();
        quote!(Self::#ident => #name,)
    });

    impl_introspect(
        meta,
        &[],
        quote!(#veil_schema_path::Inspect::Str(match *self { #(#arms)* })),
    )
}
