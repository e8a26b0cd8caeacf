//! Proc macros for the `ambirpc` component call layer.

use proc_macro::TokenStream;

mod component;

/// Declares a component: an async trait whose methods can be invoked
/// in-process or across a transport, interchangeably.
///
/// Generates, next to the trait:
/// - `<Trait>Client`: encodes arguments, calls the transport under the
///   method's wire ordinal, decodes the reply.
/// - `<Trait>Local`: invokes the implementation directly, adding only the
///   child span a remote call would also record.
/// - `<Trait>Server`: the callee-side dispatch adapter.
/// - a `snake_case` companion module with `NAME`, the declaration-ordered
///   `METHODS` table (the index of a name is its wire ordinal), and
///   `registration::<Impl>()` for the process registry.
///
/// Every method must be `async fn name(&self, owned_args...) ->
/// Result<T, CallError>` with `T: Marshal + Unmarshal + Default`.
///
/// The component name defaults to `module_path!()` plus the trait name;
/// override it with `#[component(name = "my/fully/qualified/Name")]`.
#[proc_macro_attribute]
pub fn component(attr: TokenStream, item: TokenStream) -> TokenStream {
    component::expand(attr.into(), item.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
