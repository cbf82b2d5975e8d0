//! Procedural macros for the lambdo function runtime.
//!
//! This crate provides the `#[lambdo_function]` attribute macro, which turns
//! an async fn into a named handler type that can define itself in a
//! registry.
//!
//! # Example
//!
//! ```ignore
//! use lambdo::prelude::*;
//!
//! #[lambdo_function(name = "hello-world")]
//! async fn hello(req: LambdoRequest) -> Result<String, LambdoError> {
//!     Ok("Hello, World!".to_string())
//! }
//!
//! let mut registry = FunctionRegistry::new();
//! HelloFunction::define(&mut registry)?;
//! ```

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{parse_macro_input, punctuated::Punctuated, Expr, ExprLit, ItemFn, Lit, Meta, Token};

/// Attributes for the `#[lambdo_function]` macro.
#[derive(Default, Debug)]
struct LambdoFunctionAttrs {
    /// Registered function name.
    name: Option<String>,
}

impl LambdoFunctionAttrs {
    fn parse_meta_list(metas: Punctuated<Meta, Token![,]>) -> syn::Result<Self> {
        let mut attrs = LambdoFunctionAttrs::default();

        for meta in metas {
            match meta {
                Meta::NameValue(nv) => {
                    let ident = nv
                        .path
                        .get_ident()
                        .ok_or_else(|| syn::Error::new_spanned(&nv.path, "expected identifier"))?
                        .to_string();

                    let lit = match &nv.value {
                        Expr::Lit(ExprLit { lit, .. }) => lit.clone(),
                        _ => return Err(syn::Error::new_spanned(&nv.value, "expected literal")),
                    };

                    match ident.as_str() {
                        "name" => match lit {
                            Lit::Str(lit_str) => attrs.name = Some(lit_str.value()),
                            other => {
                                return Err(syn::Error::new_spanned(
                                    other,
                                    "expected string literal",
                                ))
                            }
                        },
                        _ => {
                            return Err(syn::Error::new_spanned(
                                nv.path,
                                format!("unknown attribute: {}", ident),
                            ));
                        }
                    }
                }
                _ => {
                    return Err(syn::Error::new_spanned(meta, "expected name = value"));
                }
            }
        }

        Ok(attrs)
    }
}

/// The `#[lambdo_function]` attribute macro.
///
/// Keeps the annotated fn as written and generates a unit struct named
/// `<PascalCaseFnName>Function` that implements `lambdo::Handler` by calling
/// it. The struct exposes `NAME` and `define(&mut FunctionRegistry)`.
///
/// # Attributes
///
/// - `name` (optional): registered function name (default: the fn name)
///
/// The fn must be `async`, take a single `LambdoRequest`, and return
/// `Result<R, LambdoError>` where `R: Responder`.
#[proc_macro_attribute]
pub fn lambdo_function(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args with Punctuated::<Meta, Token![,]>::parse_terminated);
    let input_fn = parse_macro_input!(input as ItemFn);

    match generate_lambdo_function(args, input_fn) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_lambdo_function(
    args: Punctuated<Meta, Token![,]>,
    input_fn: ItemFn,
) -> syn::Result<proc_macro2::TokenStream> {
    let attrs = LambdoFunctionAttrs::parse_meta_list(args)?;

    if input_fn.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(
            &input_fn.sig,
            "lambdo_function must be async",
        ));
    }

    if input_fn.sig.inputs.len() != 1 {
        return Err(syn::Error::new_spanned(
            &input_fn.sig.inputs,
            "lambdo_function takes exactly one LambdoRequest argument",
        ));
    }

    let fn_name = &input_fn.sig.ident;
    let function_name = attrs.name.unwrap_or_else(|| fn_name.to_string());
    let struct_name = format_ident!("{}Function", to_pascal_case(&fn_name.to_string()));
    let fn_vis = &input_fn.vis;

    let expanded = quote! {
        #input_fn

        /// Generated handler type.
        #[derive(Debug, Default, Clone, Copy)]
        #fn_vis struct #struct_name;

        impl #struct_name {
            /// Registered function name.
            pub const NAME: &'static str = #function_name;

            /// Define this function in `registry` under [`Self::NAME`].
            pub fn define(
                registry: &mut ::lambdo::FunctionRegistry,
            ) -> ::std::result::Result<(), ::lambdo::RegistryError> {
                registry.define(Self::NAME, Self)
            }
        }

        #[lambdo::prelude::async_trait]
        impl ::lambdo::Handler for #struct_name {
            async fn handle(
                &self,
                request: ::lambdo::LambdoRequest,
            ) -> ::std::result::Result<::lambdo::LambdoResponse, ::lambdo::LambdoError> {
                #fn_name(request)
                    .await
                    .map(::lambdo::Responder::into_response)
            }
        }
    };

    Ok(expanded)
}

/// Convert a snake_case string to PascalCase.
fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().chain(chars).collect(),
            }
        })
        .collect()
}
