//! Derive macros for the `ambipack` marshaling traits.
//!
//! Both derives operate on record (struct) types only and emit field
//! accesses in declaration order, so the derived wire layout is exactly the
//! sequence of the struct's fields. Enums have no positional encoding and
//! are rejected with a compile error.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse_macro_input;
use syn::Data;
use syn::DeriveInput;
use syn::Error;
use syn::Fields;
use syn::GenericParam;
use syn::Index;
use syn::Result;

/// Derives `ambipack::Marshal`: writes each field in declaration order and
/// sums the exact encoded size the same way.
#[proc_macro_derive(Marshal)]
pub fn derive_marshal(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_marshal(input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

/// Derives `ambipack::Unmarshal`: reads each field in declaration order.
#[proc_macro_derive(Unmarshal)]
pub fn derive_unmarshal(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_unmarshal(input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}

fn record_fields(input: &DeriveInput) -> Result<&Fields> {
    match &input.data {
        Data::Struct(data) => Ok(&data.fields),
        Data::Enum(_) => Err(Error::new_spanned(
            &input.ident,
            "Marshal/Unmarshal can only be derived for record (struct) types, not enums",
        )),
        Data::Union(_) => Err(Error::new_spanned(
            &input.ident,
            "Marshal/Unmarshal can only be derived for record (struct) types, not unions",
        )),
    }
}

/// Member access expressions for each field, in declaration order.
fn field_accessors(fields: &Fields) -> Vec<TokenStream2> {
    match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(|f| {
                let ident = f.ident.as_ref().unwrap();
                quote!(self.#ident)
            })
            .collect(),
        Fields::Unnamed(unnamed) => unnamed
            .unnamed
            .iter()
            .enumerate()
            .map(|(i, _)| {
                let idx = Index::from(i);
                quote!(self.#idx)
            })
            .collect(),
        Fields::Unit => Vec::new(),
    }
}

/// Adds the given trait bound to every type parameter.
fn bound_generics(mut generics: syn::Generics, bound: TokenStream2) -> syn::Generics {
    for param in generics.params.iter_mut() {
        if let GenericParam::Type(ty) = param {
            ty.bounds.push(syn::parse_quote!(#bound));
        }
    }
    generics
}

fn expand_marshal(input: DeriveInput) -> Result<TokenStream2> {
    let fields = record_fields(&input)?;
    let accessors = field_accessors(fields);

    let name = &input.ident;
    let generics = bound_generics(input.generics.clone(), quote!(::ambipack::Marshal));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::ambipack::Marshal for #name #ty_generics #where_clause {
            fn marshal(&self, enc: &mut ::ambipack::Encoder) {
                #( ::ambipack::Marshal::marshal(&#accessors, enc); )*
            }

            fn size(&self) -> usize {
                0 #( + ::ambipack::Marshal::size(&#accessors) )*
            }
        }
    })
}

fn expand_unmarshal(input: DeriveInput) -> Result<TokenStream2> {
    let fields = record_fields(&input)?;

    let body = match fields {
        Fields::Named(named) => {
            let inits = named.named.iter().map(|f| {
                let ident = f.ident.as_ref().unwrap();
                quote!(#ident: ::ambipack::Unmarshal::unmarshal(dec)?)
            });
            quote!(Ok(Self { #( #inits, )* }))
        }
        Fields::Unnamed(unnamed) => {
            let inits = unnamed
                .unnamed
                .iter()
                .map(|_| quote!(::ambipack::Unmarshal::unmarshal(dec)?));
            quote!(Ok(Self( #( #inits, )* )))
        }
        Fields::Unit => quote!(Ok(Self)),
    };

    let name = &input.ident;
    let generics = bound_generics(input.generics.clone(), quote!(::ambipack::Unmarshal));
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::ambipack::Unmarshal for #name #ty_generics #where_clause {
            fn unmarshal(dec: &mut ::ambipack::Decoder<'_>) -> ::ambipack::Result<Self> {
                #body
            }
        }
    })
}
