//! Implementation of the `#[component]` attribute macro.

use proc_macro2::TokenStream;
use quote::format_ident;
use quote::quote;
use syn::parse2;
use syn::Error;
use syn::FnArg;
use syn::ItemTrait;
use syn::Lit;
use syn::Meta;
use syn::Pat;
use syn::Result;
use syn::ReturnType;
use syn::TraitItem;
use syn::TraitItemFn;
use syn::Type;

/// Parsed macro attributes.
struct ComponentAttrs {
    name: Option<String>,
}

fn parse_attrs(attr: TokenStream) -> Result<ComponentAttrs> {
    let mut attrs = ComponentAttrs { name: None };

    if attr.is_empty() {
        return Ok(attrs);
    }

    let meta: Meta = parse2(attr)?;
    match &meta {
        Meta::NameValue(nv) if nv.path.is_ident("name") => {
            if let syn::Expr::Lit(syn::ExprLit { lit: Lit::Str(lit), .. }) = &nv.value {
                attrs.name = Some(lit.value());
            } else {
                return Err(Error::new_spanned(&nv.value, "name must be a string literal"));
            }
        }
        _ => {
            return Err(Error::new_spanned(
                &meta,
                "Unknown attribute. Expected: name = \"fully/qualified/Name\"",
            ));
        }
    }

    Ok(attrs)
}

/// One validated component method.
struct Method {
    ident: syn::Ident,
    /// Wire name; with the ordinal table, part of the component's contract.
    name: String,
    arg_idents: Vec<syn::Ident>,
    arg_types: Vec<Type>,
    output: ReturnType,
}

fn parse_method(item: &TraitItemFn) -> Result<Method> {
    let sig = &item.sig;

    if sig.asyncness.is_none() {
        return Err(Error::new_spanned(sig, "component methods must be async"));
    }
    if item.default.is_some() {
        return Err(Error::new_spanned(
            item,
            "component methods cannot have default bodies; every method is dispatched to the implementation",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &sig.generics,
            "component methods cannot be generic; argument types are fixed by the wire contract",
        ));
    }

    let mut inputs = sig.inputs.iter();
    match inputs.next() {
        Some(FnArg::Receiver(recv)) if recv.reference.is_some() && recv.mutability.is_none() => {}
        _ => {
            return Err(Error::new_spanned(
                &sig.inputs,
                "component methods must take &self as their first parameter",
            ));
        }
    }

    let mut arg_idents = Vec::new();
    let mut arg_types = Vec::new();
    for arg in inputs {
        let FnArg::Typed(pat_ty) = arg else {
            return Err(Error::new_spanned(arg, "unexpected receiver"));
        };
        let Pat::Ident(pat) = &*pat_ty.pat else {
            return Err(Error::new_spanned(
                &pat_ty.pat,
                "component method parameters must be plain identifiers",
            ));
        };
        if matches!(&*pat_ty.ty, Type::Reference(_)) {
            return Err(Error::new_spanned(
                &pat_ty.ty,
                "component method parameters must be owned types; arguments cross a serialization boundary",
            ));
        }
        arg_idents.push(pat.ident.clone());
        arg_types.push((*pat_ty.ty).clone());
    }

    // The method must return Result<T, CallError>; the exact Result path is
    // left to the caller's scope, but a bare return type cannot carry an
    // application error.
    let returns_result = match &sig.output {
        ReturnType::Type(_, ty) => match ty.as_ref() {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .is_some_and(|seg| seg.ident == "Result"),
            _ => false,
        },
        ReturnType::Default => false,
    };
    if !returns_result {
        return Err(Error::new_spanned(
            &sig.output,
            "component methods must return Result<T, CallError>",
        ));
    }

    Ok(Method {
        ident: sig.ident.clone(),
        name: sig.ident.to_string(),
        arg_idents,
        arg_types,
        output: sig.output.clone(),
    })
}

fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn expand(attr: TokenStream, item: TokenStream) -> Result<TokenStream> {
    let attrs = parse_attrs(attr)?;
    let mut trait_item: ItemTrait = parse2(item)?;

    if !trait_item.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &trait_item.generics,
            "component traits cannot be generic; a component has one concrete method surface",
        ));
    }

    let mut methods = Vec::new();
    for item in &trait_item.items {
        match item {
            TraitItem::Fn(f) => methods.push(parse_method(f)?),
            other => {
                return Err(Error::new_spanned(
                    other,
                    "component traits may only contain methods",
                ));
            }
        }
    }
    if methods.is_empty() {
        return Err(Error::new_spanned(
            &trait_item.ident,
            "component trait declares no methods",
        ));
    }

    // The method surface is shared across tasks and stored type-erased.
    trait_item.supertraits.push(syn::parse_quote!(::core::marker::Send));
    trait_item.supertraits.push(syn::parse_quote!(::core::marker::Sync));
    trait_item.supertraits.push(syn::parse_quote!('static));

    let vis = trait_item.vis.clone();
    let trait_ident = trait_item.ident.clone();
    let trait_name_str = trait_ident.to_string();

    let mod_ident = format_ident!("{}", snake_case(&trait_name_str));
    let client_ident = format_ident!("{}Client", trait_ident);
    let local_ident = format_ident!("{}Local", trait_ident);
    let server_ident = format_ident!("{}Server", trait_ident);

    let name_expr = match &attrs.name {
        Some(name) => quote!(#name),
        None => quote!(::core::concat!(::core::module_path!(), "::", #trait_name_str)),
    };

    let method_names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();

    let client_methods = methods.iter().enumerate().map(|(ordinal, m)| {
        let Method { ident, arg_idents, arg_types, output, .. } = m;
        quote! {
            async fn #ident(&self, #( #arg_idents: #arg_types ),*) #output {
                self.stub.call(#ordinal, &( #( #arg_idents, )* ), 0).await
            }
        }
    });

    let local_methods = methods.iter().map(|m| {
        let Method { ident, name, arg_idents, arg_types, output, .. } = m;
        quote! {
            async fn #ident(&self, #( #arg_idents: #arg_types ),*) #output {
                ::ambirpc::local::call(
                    #mod_ident::NAME,
                    #name,
                    self.inner.#ident(#( #arg_idents ),*),
                )
                .await
            }
        }
    });

    let server_arms = methods.iter().map(|m| {
        let Method { ident, name, arg_idents, arg_types, .. } = m;
        quote! {
            #name => ::ambirpc::server::unary(
                payload,
                |( #( #arg_idents, )* ): ( #( #arg_types, )* )| async move {
                    self.inner.#ident(#( #arg_idents ),*).await
                },
            )
            .await,
        }
    });

    let local_mismatch = format!("{} local stub: implementation type mismatch", trait_name_str);
    let server_mismatch = format!("{} server stub: implementation type mismatch", trait_name_str);

    let client_doc = format!("Remote-calling stub for [`{}`].", trait_name_str);
    let local_doc = format!("Colocated stub for [`{}`].", trait_name_str);
    let server_doc = format!("Callee-side dispatch adapter for [`{}`].", trait_name_str);
    let mod_doc = format!("Registration surface for the [`{}`] component.", trait_name_str);

    Ok(quote! {
        #[::ambirpc::async_trait::async_trait]
        #trait_item

        #[doc = #client_doc]
        #vis struct #client_ident {
            stub: ::ambirpc::client::ClientStub,
        }

        impl #client_ident {
            /// Builds the stub over a transport, on behalf of `caller`.
            pub fn new(
                transport: ::std::sync::Arc<dyn ::ambirpc::transport::Transport>,
                caller: &str,
            ) -> Self {
                Self {
                    stub: ::ambirpc::client::ClientStub::new(
                        #mod_ident::NAME,
                        #mod_ident::METHODS,
                        transport,
                        caller,
                    ),
                }
            }
        }

        #[::ambirpc::async_trait::async_trait]
        impl #trait_ident for #client_ident {
            #( #client_methods )*
        }

        #[doc = #local_doc]
        #vis struct #local_ident {
            inner: ::std::sync::Arc<dyn #trait_ident>,
        }

        impl #local_ident {
            /// Wraps a colocated implementation.
            pub fn new(inner: ::std::sync::Arc<dyn #trait_ident>) -> Self {
                Self { inner }
            }
        }

        #[::ambirpc::async_trait::async_trait]
        impl #trait_ident for #local_ident {
            #( #local_methods )*
        }

        #[doc = #server_doc]
        #vis struct #server_ident {
            inner: ::std::sync::Arc<dyn #trait_ident>,
            /// Load-reporting hook for sharded placements; unused until the
            /// component declares a routed method.
            #[allow(dead_code)]
            load: ::std::option::Option<::ambirpc::registry::LoadFn>,
        }

        impl #server_ident {
            /// Wraps an implementation for callee-side dispatch.
            pub fn new(
                inner: ::std::sync::Arc<dyn #trait_ident>,
                load: ::std::option::Option<::ambirpc::registry::LoadFn>,
            ) -> Self {
                Self { inner, load }
            }
        }

        #[::ambirpc::async_trait::async_trait]
        impl ::ambirpc::server::Server for #server_ident {
            async fn handle(
                &self,
                method: &str,
                payload: &[u8],
            ) -> ::std::result::Result<::std::vec::Vec<u8>, ::ambirpc::server::DispatchError> {
                match method {
                    #( #server_arms )*
                    _ => ::std::result::Result::Err(
                        ::ambirpc::server::DispatchError::UnknownMethod(method.to_string()),
                    ),
                }
            }
        }

        #[doc = #mod_doc]
        #vis mod #mod_ident {
            /// Fully-qualified component name.
            pub const NAME: &'static str = #name_expr;

            /// Method names in declaration order; the index of a name is
            /// its wire ordinal.
            pub const METHODS: &'static [&'static str] = &[ #( #method_names ),* ];

            /// Builds the process-wide registration for this component.
            ///
            /// `I` is the implementation type, constructed via `Default`
            /// when the placement layer instantiates the component.
            pub fn registration<I>() -> ::ambirpc::registry::Registration
            where
                I: super::#trait_ident + ::core::default::Default,
            {
                ::ambirpc::registry::Registration {
                    name: NAME,
                    methods: METHODS,
                    new_impl: || {
                        ::std::boxed::Box::new(
                            ::std::sync::Arc::new(I::default())
                                as ::std::sync::Arc<dyn super::#trait_ident>,
                        )
                    },
                    config: ::core::option::Option::None,
                    local_stub: |inner| {
                        let inner = inner
                            .downcast::<::std::sync::Arc<dyn super::#trait_ident>>()
                            .expect(#local_mismatch);
                        ::std::boxed::Box::new(
                            ::std::sync::Arc::new(super::#local_ident::new(*inner))
                                as ::std::sync::Arc<dyn super::#trait_ident>,
                        )
                    },
                    client_stub: |transport, caller| {
                        ::std::boxed::Box::new(
                            ::std::sync::Arc::new(super::#client_ident::new(transport, caller))
                                as ::std::sync::Arc<dyn super::#trait_ident>,
                        )
                    },
                    server_stub: |inner, load| {
                        let inner = inner
                            .downcast::<::std::sync::Arc<dyn super::#trait_ident>>()
                            .expect(#server_mismatch);
                        ::std::sync::Arc::new(super::#server_ident::new(*inner, load))
                    },
                }
            }
        }
    })
}
