use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{ItemFn, ReturnType, parse_macro_input, parse_quote};

/// Turns `fn f(args) -> T` into `fn f(args) -> tether::TaskFuture<T>`.
///
/// The body becomes the task; arguments are moved into it, so they must be
/// `Send + 'static`.
#[proc_macro_attribute]
pub fn task(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input_fn = parse_macro_input!(item as ItemFn);

    if let Some(asyncness) = &input_fn.sig.asyncness {
        return syn::Error::new_spanned(
            asyncness,
            "#[tether::task] wraps blocking functions; use `tether::wait_for` for futures",
        )
        .to_compile_error()
        .into();
    }

    let fn_attrs = &input_fn.attrs;
    let fn_vis = &input_fn.vis;
    let fn_body = &input_fn.block;

    let output_type: TokenStream2 = match &input_fn.sig.output {
        ReturnType::Type(_, ty) => quote! { #ty },
        ReturnType::Default => quote! { () },
    };

    let mut sig = input_fn.sig.clone();
    sig.output = parse_quote! { -> ::tether::TaskFuture<#output_type> };

    let expanded: TokenStream2 = quote! {
        #(#fn_attrs)*
        #fn_vis #sig {
            ::tether::run(move || -> #output_type #fn_body)
        }
    };

    TokenStream::from(expanded)
}
