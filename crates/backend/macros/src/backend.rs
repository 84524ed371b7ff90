use std::collections::HashMap;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{DeriveInput, Ident, Type, parse_macro_input};

use crate::support::{attrs, utils};

pub fn derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(ts) => ts.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

struct Resource<'a> {
    ident: &'a Ident,
    ty: &'a Type,
    key: String,
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    utils::require_no_generics(input)?;
    let fields = utils::require_named_fields(input)?;

    let container = attrs::parse_attrs(&input.attrs, "backend")?;
    container.deny_unknown("backend", &["realized"])?;

    let name = &input.ident;
    let vis = &input.vis;
    let realized = container
        .get_ident("realized")?
        .unwrap_or_else(|| format_ident!("{}Resources", name));

    let mut resources = Vec::with_capacity(fields.named.len());
    let mut seen: HashMap<String, &Ident> = HashMap::new();
    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_attrs = attrs::parse_attrs(&field.attrs, "backend")?;
        field_attrs.deny_unknown("backend", &["rename"])?;

        let key = match field_attrs.get_string("rename")? {
            Some(key) => key,
            None => ident.unraw().to_string(),
        };
        if let Err(reason) = check_key(&key) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("invalid resource key `{key}`: {reason}"),
            ));
        }
        if let Some(first) = seen.insert(key.clone(), ident) {
            return Err(syn::Error::new_spanned(
                ident,
                format!("duplicate resource key `{key}`, already used by field `{first}`"),
            ));
        }

        resources.push(Resource {
            ident,
            ty: &field.ty,
            key,
        });
    }

    let idents: Vec<_> = resources.iter().map(|r| r.ident).collect();
    let keys: Vec<_> = resources.iter().map(|r| r.key.as_str()).collect();
    let realized_tys: Vec<_> = resources
        .iter()
        .map(|r| {
            let ty = r.ty;
            quote!(<#ty as ::keystone_backend::Descriptor>::Realized)
        })
        .collect();
    let field_docs: Vec<_> = keys
        .iter()
        .map(|key| format!("Realized `{key}` resource."))
        .collect();
    let struct_doc = format!("Realized resources of [`{name}`], one field per resource key.");

    Ok(quote! {
        #[doc = #struct_doc]
        #[derive(Debug)]
        #vis struct #realized {
            #(
                #[doc = #field_docs]
                pub #idents: #realized_tys,
            )*
        }

        impl #name {
            /// Resource keys, in declaration order.
            pub const KEYS: &'static [&'static str] = &[#(#keys),*];
        }

        impl ::keystone_backend::Backend for #name {
            type Realized = #realized;

            fn registry(&self) -> ::keystone_backend::Result<::keystone_backend::Registry> {
                ::keystone_backend::Registry::builder()
                    #( .with(#keys, ::core::clone::Clone::clone(&self.#idents)) )*
                    .build()
            }

            #[allow(unused_mut)]
            fn realize(
                &self,
                mut realized: ::keystone_backend::RealizedRegistry,
            ) -> ::keystone_backend::Result<Self::Realized> {
                realized.expect_keys(Self::KEYS)?;
                ::core::result::Result::Ok(#realized {
                    #( #idents: realized.take::<#realized_tys>(#keys)?, )*
                })
            }
        }
    })
}

/// Same rule as `ResourceKey`, checked at compile time.
fn check_key(key: &str) -> Result<(), &'static str> {
    let mut chars = key.chars();
    match chars.next() {
        None => return Err("key cannot be empty"),
        Some(c) if !c.is_ascii_alphabetic() => return Err("key must start with an ASCII letter"),
        Some(_) => {}
    }
    if chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err("key may only contain ASCII letters, digits and `_`")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand_str(tokens: TokenStream2) -> syn::Result<String> {
        let input: DeriveInput = syn::parse2(tokens)?;
        expand(&input).map(|ts| ts.to_string())
    }

    #[test]
    fn generates_realized_struct_and_keys() {
        let out = expand_str(quote! {
            struct Config {
                auth: AuthDescriptor,
                #[backend(rename = "fileStorage")]
                storage: StorageDescriptor,
            }
        })
        .unwrap();

        assert!(out.contains("struct ConfigResources"));
        assert!(out.contains("\"auth\" , \"fileStorage\""));
        assert!(out.contains("impl :: keystone_backend :: Backend for Config"));
    }

    #[test]
    fn realized_name_can_be_overridden() {
        let out = expand_str(quote! {
            #[backend(realized = Provisioned)]
            pub struct Config { auth: AuthDescriptor }
        })
        .unwrap();
        assert!(out.contains("pub struct Provisioned"));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let err = expand_str(quote! {
            struct Config {
                data: DataDescriptor,
                #[backend(rename = "data")]
                other: DataDescriptor,
            }
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "duplicate resource key `data`, already used by field `data`"
        );
    }

    #[test]
    fn invalid_rename_is_rejected() {
        let err = expand_str(quote! {
            struct Config {
                #[backend(rename = "file-storage")]
                storage: StorageDescriptor,
            }
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid resource key `file-storage`"));
    }

    #[test]
    fn unsupported_shapes_are_rejected() {
        assert!(expand_str(quote!(struct Config<D> { auth: D })).is_err());
        assert!(expand_str(quote!(struct Config(AuthDescriptor);)).is_err());
        assert!(expand_str(quote!(struct Config;)).is_err());
        assert!(expand_str(quote!(enum Config { Auth })).is_err());
    }

    #[test]
    fn raw_identifiers_use_the_plain_name() {
        let out = expand_str(quote!(struct Config { r#type: DataDescriptor })).unwrap();
        assert!(out.contains("\"type\""));
    }
}
