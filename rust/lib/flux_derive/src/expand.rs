use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{parse_quote, Attribute, Ident, ItemStruct, LitStr};

#[derive(Clone, Copy)]
pub enum Kind {
    State,
    Request,
}

impl Kind {
    fn required_derives(self) -> &'static [&'static str] {
        match self {
            Kind::State => &["Debug", "Clone", "PartialEq"],
            Kind::Request => &["Debug", "Clone"],
        }
    }

    fn label(self) -> &'static str {
        match self {
            Kind::State => "state",
            Kind::Request => "request",
        }
    }
}

pub fn expand(kind: Kind, attr: TokenStream, mut item: ItemStruct) -> syn::Result<TokenStream> {
    let lit: LitStr = syn::parse2(attr)?;
    let path = lit.value();
    if path.is_empty() {
        return Err(syn::Error::new(
            lit.span(),
            format!("{} path cannot be empty", kind.label()),
        ));
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Err(syn::Error::new(
            lit.span(),
            format!("{} path must not start or end with '/'", kind.label()),
        ));
    }

    let present = existing_derives(&item.attrs);
    let missing: Vec<Ident> = kind
        .required_derives()
        .iter()
        .filter(|d| !present.iter().any(|p| p == *d))
        .map(|d| Ident::new(d, Span::call_site()))
        .collect();
    if !missing.is_empty() {
        let derive: Attribute = parse_quote!(#[derive(#(#missing),*)]);
        item.attrs.insert(0, derive);
    }

    let name = &item.ident;
    let (impl_generics, ty_generics, where_clause) = item.generics.split_for_impl();
    let doc = format!("The Flux {} path.", kind.label());

    Ok(quote! {
        #item

        impl #impl_generics #name #ty_generics #where_clause {
            #[doc = #doc]
            pub const PATH: &'static str = #path;
        }
    })
}

/// Last path segment of every derive already on the struct, so both
/// `Clone` and `std::clone::Clone` count as present.
fn existing_derives(attrs: &[Attribute]) -> Vec<String> {
    let mut derives = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
        let parsed = attr.parse_args_with(
            syn::punctuated::Punctuated::<syn::Path, syn::Token![,]>::parse_terminated,
        );
        if let Ok(paths) = parsed {
            derives.extend(
                paths
                    .iter()
                    .filter_map(|p| p.segments.last().map(|s| s.ident.to_string())),
            );
        }
    }
    derives
}
