//! Built-in implementations of [`Describe`], [`Introspect`] and [`FromValue`].
//!
//! ## Implemented Menu
//!
//! - scalars: `i8`-`i64`, `u8`-`u64`, `isize`, `usize`, `f32`, `f64`, `bool`, `String`
//! - dates (`chrono`): `NaiveDateTime`, `NaiveDate`, `DateTime<Utc>`
//! - optionals: `Option<T>`, `OnceLock<T>`
//! - sequences: `Vec<T>`, `VecDeque<T>`
//! - mappings with `String` keys: `std` `HashMap`, `BTreeMap`, `hashbrown::HashMap`
//! - pointers: `Box<T>`, `Arc<T>` (transparent), `Box<dyn Introspect>` (untyped)
//! - the untyped tree: [`Value`], [`ValueMap`]
//!
//! [`Describe`]: crate::Describe
//! [`Introspect`]: crate::Introspect
//! [`FromValue`]: crate::FromValue
//! [`Value`]: crate::Value
//! [`ValueMap`]: crate::ValueMap

// -----------------------------------------------------------------------------
// Modules

mod collections;
mod date;
mod pointers;
mod primitives;
mod value;

// -----------------------------------------------------------------------------
// Helpers

use crate::info::TypeDescriptor;

/// An efficient string concatenation function.
///
/// # Example
///
/// ```
/// use veil_schema::impls;
///
/// let s = impls::concat(&["module", "::", "name", "<", "T", ">"]);
///
/// assert_eq!(s, "module::name<T>");
/// assert_eq!(s.capacity(), 15);
/// ```
#[inline(never)]
pub fn concat(arr: &[&str]) -> String {
    let len = arr.iter().map(|s| s.len()).sum();
    let mut res = String::with_capacity(len);
    for &item in arr {
        res.push_str(item);
    }
    res
}

/// Builds the `(path, name)` pair of a generic type from its parameters.
///
/// ```
/// use veil_schema::{Describe, impls};
///
/// let (path, name) = impls::generic_names("my_crate::Pair", "Pair", &[
///     i32::type_descriptor(),
///     String::type_descriptor(),
/// ]);
/// assert_eq!(path, "my_crate::Pair<i32, String>");
/// assert_eq!(name, "Pair<i32, String>");
/// ```
pub fn generic_names(path: &str, ident: &str, params: &[&TypeDescriptor]) -> (String, String) {
    let mut full_path = concat(&[path, "<"]);
    let mut name = concat(&[ident, "<"]);
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            full_path.push_str(", ");
            name.push_str(", ");
        }
        full_path.push_str(param.path());
        name.push_str(param.name());
    }
    full_path.push('>');
    name.push('>');
    (full_path, name)
}
