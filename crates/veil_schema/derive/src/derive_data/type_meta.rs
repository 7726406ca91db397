use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{GenericParam, Generics, Ident, Path, Type, WherePredicate, parse_quote};

use super::TypeAttributes;

/// The part of a derive input shared by all impls.
pub(crate) struct TypeMeta<'a> {
    veil_schema_path: Path,
    ident: &'a Ident,
    generics: &'a Generics,
    attrs: TypeAttributes,
}

impl core::fmt::Debug for TypeMeta<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeMeta")
            .field("veil_schema_path", &self.veil_schema_path.to_token_stream())
            .field("ident", &self.ident)
            .field("attrs", &self.attrs)
            .finish()
    }
}

impl<'a> TypeMeta<'a> {
    pub fn new(ident: &'a Ident, generics: &'a Generics, attrs: TypeAttributes) -> syn::Result<Self> {
        for param in &generics.params {
            match param {
                GenericParam::Type(_) => {}
                GenericParam::Lifetime(p) => {
                    return Err(syn::Error::new_spanned(p, "lifetime parameters are not supported"));
                }
                GenericParam::Const(p) => {
                    return Err(syn::Error::new_spanned(p, "const parameters are not supported"));
                }
            }
        }
        Ok(Self {
            veil_schema_path: crate::path::veil_schema(),
            ident,
            generics,
            attrs,
        })
    }

    #[inline]
    pub fn veil_schema_path(&self) -> &Path {
        &self.veil_schema_path
    }

    #[inline]
    pub fn ident(&self) -> &Ident {
        self.ident
    }

    #[inline]
    pub fn attrs(&self) -> &TypeAttributes {
        &self.attrs
    }

    #[inline]
    pub fn is_generic(&self) -> bool {
        !self.generics.params.is_empty()
    }

    /// The type name: the `rename` attribute or the ident.
    pub fn type_name(&self) -> String {
        self.attrs
            .rename
            .clone()
            .unwrap_or_else(|| self.ident.to_string())
    }

    /// `concat!(module_path!(), "::", "Ident")`
    pub fn type_path_expression(&self) -> TokenStream {
        let ident = self.ident.to_string();
        quote!(::core::concat!(::core::module_path!(), "::", #ident))
    }

    pub fn type_params(&self) -> impl Iterator<Item = &Ident> {
        self.generics.type_params().map(|p| &p.ident)
    }

    /// Splits the generics, adding `bounds` to every type parameter and
    /// `field_bounds` to every type in `field_types`.
    pub fn split_generics_with(
        &self,
        bounds: TokenStream,
        field_types: &[&Type],
        field_bounds: TokenStream,
    ) -> (TokenStream, TokenStream, TokenStream) {
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let mut predicates: Vec<WherePredicate> = where_clause
            .map(|w| w.predicates.iter().cloned().collect())
            .unwrap_or_default();
        for param in self.type_params() {
            predicates.push(parse_quote!(#param: #bounds));
        }
        if self.is_generic() {
            for ty in field_types {
                predicates.push(parse_quote!(#ty: #field_bounds));
            }
        }

        let where_tokens = if predicates.is_empty() {
            TokenStream::new()
        } else {
            quote!(where #(#predicates,)*)
        };
        (
            impl_generics.to_token_stream(),
            ty_generics.to_token_stream(),
            where_tokens,
        )
    }
}
