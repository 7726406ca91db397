use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

use crate::derive_data::{EnumVariant, StructField, TypeMeta};
use crate::path::{describe_, info_};

/// `fn type_descriptor()` wrapped around `descriptor`, an expression building
/// the `TypeDescriptor` from `__path` and `__name`.
fn impl_describe(meta: &TypeMeta, field_types: &[&Type], shape: TokenStream) -> TokenStream {
    let veil_schema_path = meta.veil_schema_path();
    let info_ = info_(veil_schema_path);
    let describe_ = describe_(veil_schema_path);

    let ident = meta.ident();
    let type_name = meta.type_name();
    let type_path = meta.type_path_expression();
    let (impl_generics, ty_generics, where_clause) =
        meta.split_generics_with(quote!(#describe_), field_types, quote!(#describe_));

    let body = if meta.is_generic() {
        let params = meta.type_params();
        quote! {
            static CELL: #info_::GenericDescriptorCell = #info_::GenericDescriptorCell::new();
            CELL.get_or_insert::<Self>(|| {
                let (__path, __name) = #veil_schema_path::impls::generic_names(
                    #type_path,
                    #type_name,
                    &[#(<#params as #describe_>::type_descriptor(),)*],
                );
                #info_::TypeDescriptor::new::<Self>(__path, __name, #type_name, #shape)
            })
        }
    } else {
        quote! {
            static CELL: #info_::DescriptorCell = #info_::DescriptorCell::new();
            CELL.get_or_init(|| {
                #info_::TypeDescriptor::new::<Self>(#type_path, #type_name, #type_name, #shape)
            })
        }
    };

    quote! {
        impl #impl_generics #describe_ for #ident #ty_generics #where_clause {
            fn type_descriptor() -> &'static #info_::TypeDescriptor {
                #body
            }
        }
    }
}

pub(crate) fn impl_struct(meta: &TypeMeta, fields: &[StructField]) -> TokenStream {
    let veil_schema_path = meta.veil_schema_path();
    let info_ = info_(veil_schema_path);
    let introspect_ = crate::path::introspect_(veil_schema_path);

    let field_types: Vec<&Type> = fields.iter().map(|f| f.ty).collect();
    let descriptors = fields.iter().map(|field| {
        let ty = field.ty;
        let member = field.member;
        let name = field.name();
        let flags = match (field.attrs.skip_serializing, field.attrs.skip_deserializing) {
            (false, false) => quote!(#info_::FieldFlags::empty()),
            (true, false) => quote!(#info_::FieldFlags::SKIP_SERIALIZING),
            (false, true) => quote!(#info_::FieldFlags::SKIP_DESERIALIZING),
            (true, true) => quote!(#info_::FieldFlags::SKIP),
        };
        quote! {
            #info_::FieldDescriptor::new::<#ty>(#name, |owner| {
                owner
                    .downcast_ref::<Self>()
                    .map(|this| &this.#member as &dyn #introspect_)
            })
            .with_flags(#flags)
        }
    });

    let shape = quote! {
        #info_::Shape::Struct(#info_::StructShape::new(::std::vec![#(#descriptors,)*]))
    };

    impl_describe(meta, &field_types, shape)
}

pub(crate) fn impl_enum(meta: &TypeMeta, variants: &[EnumVariant]) -> TokenStream {
    let info_ = info_(meta.veil_schema_path());
    let names = variants.iter().map(EnumVariant::name);

    let shape = quote! {
        #info_::Shape::Enum(#info_::EnumShape::new(&[#(#names,)*]))
    };

    impl_describe(meta, &[], shape)
}
