//! `#[veil(...)]` attributes.

use syn::meta::ParseNestedMeta;
use syn::{Attribute, LitBool, LitStr};

use crate::VEIL_ATTRIBUTE_NAME;

fn parse_veil_attrs(
    attrs: &[Attribute],
    mut f: impl FnMut(&ParseNestedMeta<'_>) -> syn::Result<()>,
) -> syn::Result<()> {
    for attr in attrs {
        if attr.path().is_ident(VEIL_ATTRIBUTE_NAME) {
            attr.parse_nested_meta(|meta| f(&meta))?;
        }
    }
    Ok(())
}

fn parse_rename(meta: &ParseNestedMeta<'_>, slot: &mut Option<String>) -> syn::Result<()> {
    let lit: LitStr = meta.value()?.parse()?;
    let name = lit.value();
    if name.is_empty() {
        return Err(syn::Error::new(lit.span(), "`rename` expects a non-empty name"));
    }
    if slot.replace(name).is_some() {
        return Err(meta.error("duplicate `rename`"));
    }
    Ok(())
}

// -----------------------------------------------------------------------------
// TypeAttributes

/// Attributes on the type itself.
#[derive(Debug)]
pub(crate) struct TypeAttributes {
    pub rename: Option<String>,
    /// Default is `true`, use `#[veil(from_value = false)]` to disable it.
    pub impl_from_value: bool,
}

impl TypeAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self {
            rename: None,
            impl_from_value: true,
        };
        parse_veil_attrs(attrs, |meta| {
            if meta.path.is_ident("rename") {
                parse_rename(meta, &mut this.rename)
            } else if meta.path.is_ident("from_value") {
                let lit: LitBool = meta.value()?.parse()?;
                if lit.value() {
                    return Err(syn::Error::new(
                        lit.span(),
                        "Explicit `true` is invalid, it's the default value.",
                    ));
                }
                this.impl_from_value = false;
                Ok(())
            } else {
                Err(meta.error("unknown type attribute, expected `rename` or `from_value`"))
            }
        })?;
        Ok(this)
    }
}

// -----------------------------------------------------------------------------
// FieldAttributes

/// Attributes on a field or a variant.
#[derive(Debug, Default)]
pub(crate) struct FieldAttributes {
    pub rename: Option<String>,
    pub skip_serializing: bool,
    pub skip_deserializing: bool,
}

impl FieldAttributes {
    pub fn parse_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        parse_veil_attrs(attrs, |meta| {
            if meta.path.is_ident("rename") {
                parse_rename(meta, &mut this.rename)
            } else if meta.path.is_ident("skip") {
                this.skip_serializing = true;
                this.skip_deserializing = true;
                Ok(())
            } else if meta.path.is_ident("skip_serializing") {
                this.skip_serializing = true;
                Ok(())
            } else if meta.path.is_ident("skip_deserializing") {
                this.skip_deserializing = true;
                Ok(())
            } else {
                Err(meta.error(
                    "unknown field attribute, expected `rename`, `skip`, `skip_serializing` or `skip_deserializing`",
                ))
            }
        })?;
        Ok(this)
    }

    /// Variants accept `rename` only.
    pub fn parse_variant_attrs(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut this = Self::default();
        parse_veil_attrs(attrs, |meta| {
            if meta.path.is_ident("rename") {
                parse_rename(meta, &mut this.rename)
            } else {
                Err(meta.error("unknown variant attribute, expected `rename`"))
            }
        })?;
        Ok(this)
    }
}
