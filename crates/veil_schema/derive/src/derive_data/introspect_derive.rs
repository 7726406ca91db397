use syn::{Data, DeriveInput, Fields, Ident, Type};

use super::{FieldAttributes, TypeAttributes, TypeMeta};

/// A named struct field.
#[derive(Debug)]
pub(crate) struct StructField<'a> {
    pub member: &'a Ident,
    pub ty: &'a Type,
    pub attrs: FieldAttributes,
}

impl StructField<'_> {
    /// The name in the token stream.
    pub fn name(&self) -> String {
        self.attrs
            .rename
            .clone()
            .unwrap_or_else(|| self.member.to_string())
    }
}

/// A unit enum variant.
#[derive(Debug)]
pub(crate) struct EnumVariant<'a> {
    pub ident: &'a Ident,
    pub attrs: FieldAttributes,
}

impl EnumVariant<'_> {
    /// The name in the token stream.
    pub fn name(&self) -> String {
        self.attrs
            .rename
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }
}

/// A parsed derive input.
pub(crate) enum IntrospectDerive<'a> {
    /// Named fields; unit structs have none.
    Struct(TypeMeta<'a>, Vec<StructField<'a>>),
    /// Unit-only enum.
    Enum(TypeMeta<'a>, Vec<EnumVariant<'a>>),
}

impl<'a> IntrospectDerive<'a> {
    pub fn from_input(input: &'a DeriveInput) -> syn::Result<Self> {
        let attrs = TypeAttributes::parse_attrs(&input.attrs)?;
        let meta = TypeMeta::new(&input.ident, &input.generics, attrs)?;

        match &input.data {
            Data::Struct(data) => {
                let fields = match &data.fields {
                    Fields::Named(named) => named
                        .named
                        .iter()
                        .map(|field| {
                            Ok(StructField {
                                // named fields always carry an ident
                                member: field.ident.as_ref().ok_or_else(|| {
                                    syn::Error::new_spanned(field, "expected a named field")
                                })?,
                                ty: &field.ty,
                                attrs: FieldAttributes::parse_attrs(&field.attrs)?,
                            })
                        })
                        .collect::<syn::Result<Vec<_>>>()?,
                    Fields::Unit => Vec::new(),
                    Fields::Unnamed(unnamed) => {
                        return Err(syn::Error::new_spanned(
                            unnamed,
                            "tuple structs are not supported, use named fields",
                        ));
                    }
                };

                let mut seen = std::collections::BTreeSet::new();
                for field in &fields {
                    if !seen.insert(field.name()) {
                        return Err(syn::Error::new_spanned(
                            field.member,
                            format!("duplicate field name `{}`", field.name()),
                        ));
                    }
                }
                Ok(Self::Struct(meta, fields))
            }
            Data::Enum(data) => {
                let variants = data
                    .variants
                    .iter()
                    .map(|variant| {
                        if !matches!(variant.fields, Fields::Unit) {
                            return Err(syn::Error::new_spanned(
                                &variant.fields,
                                "only unit variants are supported",
                            ));
                        }
                        Ok(EnumVariant {
                            ident: &variant.ident,
                            attrs: FieldAttributes::parse_variant_attrs(&variant.attrs)?,
                        })
                    })
                    .collect::<syn::Result<Vec<_>>>()?;
                Ok(Self::Enum(meta, variants))
            }
            Data::Union(data) => Err(syn::Error::new_spanned(
                data.union_token,
                "unions are not supported",
            )),
        }
    }
}
