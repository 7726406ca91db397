use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

use crate::derive_data::{EnumVariant, StructField, TypeMeta};
use crate::path::{describe_, from_value_};

fn impl_from_value(meta: &TypeMeta, field_types: &[&Type], body: TokenStream) -> TokenStream {
    let veil_schema_path = meta.veil_schema_path();
    let describe_ = describe_(veil_schema_path);
    let from_value_ = from_value_(veil_schema_path);

    let ident = meta.ident();
    let (impl_generics, ty_generics, where_clause) = meta.split_generics_with(
        quote!(#describe_),
        field_types,
        quote!(#from_value_ + ::core::default::Default),
    );

    quote! {
        impl #impl_generics #from_value_ for #ident #ty_generics #where_clause {
            fn from_value(
                value: #veil_schema_path::Value,
            ) -> ::core::result::Result<Self, #veil_schema_path::FromValueError> {
                #body
            }
        }
    }
}

pub(crate) fn impl_struct(meta: &TypeMeta, fields: &[StructField]) -> TokenStream {
    // Fields never read take their default and need no `FromValue`.
    let read: Vec<&StructField> = fields.iter().filter(|f| !f.attrs.skip_deserializing).collect();
    let field_types: Vec<&Type> = read.iter().map(|f| f.ty).collect();

    let inits = fields.iter().map(|field| {
        let member = field.member;
        if field.attrs.skip_deserializing {
            quote!(#member: ::core::default::Default::default(),)
        } else {
            let name = field.name();
            quote!(#member: __map.take_field(#name)?,)
        }
    });

    let body = if read.is_empty() {
        quote! {
            value.into_object::<Self>()?;
            ::core::result::Result::Ok(Self { #(#inits)* })
        }
    } else {
        quote! {
            let mut __map = value.into_object::<Self>()?;
            ::core::result::Result::Ok(Self { #(#inits)* })
        }
    };

    impl_from_value(meta, &field_types, body)
}

pub(crate) fn impl_enum(meta: &TypeMeta, variants: &[EnumVariant]) -> TokenStream {
    let veil_schema_path = meta.veil_schema_path();
    let describe_ = describe_(veil_schema_path);
    let arms = variants.iter().map(|variant| {
        let ident = variant.ident;
        let name = variant.name();
        quote!(#name => ::core::result::Result::Ok(Self::#ident),)
    });

    let body = quote! {
        let __name = value.into_variant::<Self>()?;
        match __name.as_str() {
            #(#arms)*
            other => ::core::result::Result::Err(#veil_schema_path::FromValueError::new(
                <Self as #describe_>::type_descriptor().path().to_owned(),
                ::std::format!("unknown variant `{other}`"),
            )),
        }
    };

    impl_from_value(meta, &[], body)
}
