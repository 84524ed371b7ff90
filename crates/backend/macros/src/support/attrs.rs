use proc_macro2::TokenStream as TokenStream2;
use syn::{
    Attribute, Ident, Lit, Meta, Result, Token,
    parse::{Parse, ParseStream},
    punctuated::Punctuated,
};

/// Parsed `key = value` arguments of one helper attribute.
#[derive(Debug, Clone, Default)]
pub struct AttrArgs {
    pub items: Vec<AttrItem>,
}

/// A single `key = value` pair.
#[derive(Debug, Clone)]
pub struct AttrItem {
    pub key: Ident,
    pub value: AttrValue,
}

/// Right-hand side of a pair.
#[derive(Debug, Clone)]
pub enum AttrValue {
    Ident(Ident),
    Lit(Lit),
    Tokens(TokenStream2),
}

impl AttrArgs {
    /// Find a value by key.
    pub fn get_value(&self, key: &str) -> Option<&AttrValue> {
        self.items
            .iter()
            .find(|item| item.key == key)
            .map(|item| &item.value)
    }

    /// Get a string value by key; anything but a string literal is an error.
    pub fn get_string(&self, key: &str) -> Result<Option<String>> {
        match self.get_value(key) {
            None => Ok(None),
            Some(AttrValue::Lit(Lit::Str(s))) => Ok(Some(s.value())),
            Some(other) => Err(syn::Error::new_spanned(
                other,
                format!("expected a string literal for `{key}`"),
            )),
        }
    }

    /// Get an identifier value by key, accepting `key = Name` or `key = "Name"`.
    pub fn get_ident(&self, key: &str) -> Result<Option<Ident>> {
        match self.get_value(key) {
            None => Ok(None),
            Some(AttrValue::Ident(i)) => Ok(Some(i.clone())),
            Some(AttrValue::Lit(Lit::Str(s))) => s.parse::<Ident>().map(Some).map_err(|e| {
                syn::Error::new_spanned(s, format!("invalid identifier for `{key}`: {e}"))
            }),
            Some(other) => Err(syn::Error::new_spanned(
                other,
                format!("expected an identifier for `{key}`"),
            )),
        }
    }

    /// Fail on the first key outside `known` or the first repeated key.
    pub fn deny_unknown(&self, attr: &str, known: &[&str]) -> Result<()> {
        for (i, item) in self.items.iter().enumerate() {
            if !known.iter().any(|k| item.key == k) {
                return Err(syn::Error::new_spanned(
                    &item.key,
                    format!(
                        "unknown `{attr}` attribute `{}`, expected one of: {}",
                        item.key,
                        known.join(", ")
                    ),
                ));
            }
            if self.items[..i].iter().any(|prev| prev.key == item.key) {
                return Err(syn::Error::new_spanned(
                    &item.key,
                    format!("`{}` is set more than once", item.key),
                ));
            }
        }
        Ok(())
    }
}

impl quote::ToTokens for AttrValue {
    fn to_tokens(&self, tokens: &mut TokenStream2) {
        match self {
            Self::Ident(i) => i.to_tokens(tokens),
            Self::Lit(l) => l.to_tokens(tokens),
            Self::Tokens(t) => t.to_tokens(tokens),
        }
    }
}

/// Parse attribute like `#[backend(...)]` (the whole Attribute, not only args).
pub fn parse_attr(attr: &Attribute, expected: &str) -> Result<Option<AttrArgs>> {
    if !attr.path().is_ident(expected) {
        return Ok(None);
    }

    match &attr.meta {
        Meta::Path(_) => Ok(Some(AttrArgs::default())),
        Meta::List(list) => {
            let args = syn::parse2::<AttrArgsParser>(list.tokens.clone())?;
            Ok(Some(args.0))
        }
        Meta::NameValue(nv) => Err(syn::Error::new_spanned(
            nv,
            format!("#[{expected}] must be #[{expected}(...)] (not name-value)"),
        )),
    }
}

/// Parse all attributes of a given name and merge them.
pub fn parse_attrs(attrs: &[Attribute], name: &str) -> Result<AttrArgs> {
    let mut result = AttrArgs::default();

    for attr in attrs {
        if let Some(args) = parse_attr(attr, name)? {
            result.items.extend(args.items);
        }
    }

    Ok(result)
}

struct AttrArgsParser(AttrArgs);

impl Parse for AttrArgsParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let items = Punctuated::<AttrItemParser, Token![,]>::parse_terminated(input)?
            .into_iter()
            .map(|x| x.0)
            .collect();
        Ok(Self(AttrArgs { items }))
    }
}

struct AttrItemParser(AttrItem);

impl Parse for AttrItemParser {
    fn parse(input: ParseStream) -> Result<Self> {
        let key: Ident = input.parse()?;
        input.parse::<Token![=]>()?;

        let value = if input.peek(Lit) {
            AttrValue::Lit(input.parse()?)
        } else if input.peek(Ident) && (input.peek2(Token![,]) || is_last(input)) {
            AttrValue::Ident(input.parse()?)
        } else {
            let mut tokens = TokenStream2::new();
            while !input.is_empty() && !input.peek(Token![,]) {
                let tt: proc_macro2::TokenTree = input.parse()?;
                tokens.extend(std::iter::once(tt));
            }
            AttrValue::Tokens(tokens)
        };

        Ok(Self(AttrItem { key, value }))
    }
}

fn is_last(input: ParseStream) -> bool {
    let fork = input.fork();
    fork.parse::<proc_macro2::TokenTree>().is_ok() && fork.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn parse(tokens: TokenStream2) -> AttrArgs {
        syn::parse2::<AttrArgsParser>(tokens).unwrap().0
    }

    #[test]
    fn parses_string_and_ident_values() {
        let args = parse(quote!(rename = "fileStorage", realized = Resources));

        assert_eq!(args.items.len(), 2);
        assert_eq!(args.get_string("rename").unwrap().as_deref(), Some("fileStorage"));
        assert_eq!(args.get_ident("realized").unwrap().unwrap(), "Resources");
    }

    #[test]
    fn ident_may_be_quoted() {
        let args = parse(quote!(realized = "Resources"));
        assert_eq!(args.get_ident("realized").unwrap().unwrap(), "Resources");
    }

    #[test]
    fn wrong_value_kind_is_an_error() {
        let args = parse(quote!(rename = storage));
        assert!(args.get_string("rename").is_err());
    }

    #[test]
    fn unknown_and_repeated_keys_are_rejected() {
        let args = parse(quote!(renam = "x"));
        let err = args.deny_unknown("backend", &["rename"]).unwrap_err();
        assert!(err.to_string().contains("unknown `backend` attribute `renam`"));

        let args = parse(quote!(rename = "a", rename = "b"));
        let err = args.deny_unknown("backend", &["rename"]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn missing_value_is_a_parse_error() {
        assert!(syn::parse2::<AttrArgsParser>(quote!(rename)).is_err());
    }
}
