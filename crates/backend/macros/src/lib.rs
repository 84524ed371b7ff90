//! # Keystone Backend Macros
//!
//! `#[derive(Backend)]` for structs of resource descriptors. Use it through
//! the `keystone-backend` re-export.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

extern crate proc_macro;

use proc_macro::TokenStream;

mod backend;
mod support;

/// Derive macro for the `Backend` trait.
///
/// Every named field is one resource: the field name is its key, the field
/// type its descriptor (which must be `Clone`). The derive generates:
///
/// - a realized struct, `<Name>Resources` by default, with one public field
///   per resource holding `<Descriptor as Descriptor>::Realized`;
/// - an inherent `KEYS` constant listing the keys in declaration order;
/// - the `Backend` impl converting to and from the registry form.
///
/// # Attributes
///
/// ## Container attributes (`#[backend(...)]` on the struct)
///
/// - `realized = Name` - Name of the generated realized struct
///
/// ## Field attributes
///
/// - `#[backend(rename = "key")]` - Use `key` instead of the field name
///
/// Two fields resolving to the same key, an invalid key, generic
/// parameters and non-struct or non-named-field inputs are compile errors.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, Backend)]
/// pub struct Config {
///     auth: AuthDescriptor,
///     #[backend(rename = "fileStorage")]
///     storage: StorageDescriptor,
/// }
///
/// // generated:
/// // pub struct ConfigResources { pub auth: AuthResources, pub storage: StorageResources }
/// ```
#[proc_macro_derive(Backend, attributes(backend))]
pub fn derive_backend(input: TokenStream) -> TokenStream {
    backend::derive(input)
}
