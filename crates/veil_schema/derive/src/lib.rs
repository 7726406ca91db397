//! See [`Introspect`](derive_introspect).

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static VEIL_ATTRIBUTE_NAME: &str = "veil";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;
mod path;

// -----------------------------------------------------------------------------
// Macros

/// # Introspection Derivation
///
/// `#[derive(Introspect)]` implements:
///
/// - `Describe`: a static `TypeDescriptor` with the type's shape.
/// - `Introspect`: the runtime view walked by the serialization engine.
/// - `FromValue`: construction from an untyped value tree.
///
/// Supported inputs are structs with named fields, unit structs and enums
/// whose variants carry no data. Tuple structs and data-carrying variants are
/// rejected.
///
/// ## Type Attributes
///
/// ```rust, ignore
/// #[derive(Introspect)]
/// #[veil(rename = "bean", from_value = false)]
/// struct Bean { /* ... */ }
/// ```
///
/// - `rename`: the type name, used when wrapping root values.
/// - `from_value = false`: `FromValue` is not implemented.
///
/// ## Field Attributes
///
/// ```rust, ignore
/// #[derive(Introspect, Default)]
/// struct Bean {
///     #[veil(rename = "fullName")]
///     name: String,
///     #[veil(skip)]
///     cache: Vec<u8>,
///     #[veil(skip_serializing)]
///     password: String,
///     #[veil(skip_deserializing)]
///     id: u64,
/// }
/// ```
///
/// Fields that are skipped on input, or absent or `null` in it, take their
/// `Default` value.
///
/// ## Variant Attributes
///
/// `rename` changes the name a unit variant is written and read as.
///
/// ## Generics
///
/// Type parameters must implement `Describe` (and `Introspect`, `FromValue`
/// and `Default` where a field needs them). Lifetime and const parameters are
/// not supported.
#[proc_macro_derive(Introspect, attributes(veil))]
pub fn derive_introspect(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    impls::match_introspect_impls(ast)
}
