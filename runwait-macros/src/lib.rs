//! Attribute macros for the `runwait` runtime.
//!
//! - `#[runwait::main]` turns an `async fn main` into a synchronous entry
//!   point that builds a runtime and blocks on the body.
//! - `#[runwait::test]` does the same for `async` test functions and adds
//!   the `#[test]` attribute.
//!
//! Both accept an optional `worker_threads = N` argument.

mod utils;

use proc_macro::{TokenStream, TokenTree};

#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let worker_threads = match utils::parse_worker_threads(&attr) {
        Ok(n) => n,
        Err(message) => return utils::compile_error(&message),
    };

    let mut tokens: Vec<TokenTree> = item.into_iter().collect();
    utils::strip_async(&mut tokens);

    let runtime = utils::runtime_expr(worker_threads);
    let found = utils::replace_body(&mut tokens, |body| {
        format!(
            "{{
                let runtime = {runtime};
                runtime.block_on(async move {{ {body} }})
            }}"
        )
    });

    if !found {
        return utils::compile_error("#[runwait::main] expects a function with a body");
    }

    tokens.into_iter().collect()
}

#[proc_macro_attribute]
pub fn test(attr: TokenStream, item: TokenStream) -> TokenStream {
    let worker_threads = match utils::parse_worker_threads(&attr) {
        Ok(n) => n,
        Err(message) => return utils::compile_error(&message),
    };

    let mut tokens: Vec<TokenTree> = item.into_iter().collect();
    utils::strip_async(&mut tokens);

    let runtime = utils::runtime_expr(worker_threads);
    let found = utils::replace_body(&mut tokens, |body| {
        format!(
            "{{
                let runtime = {runtime};
                runtime.block_on(async move {{ {body} }});
            }}"
        )
    });

    if !found {
        return utils::compile_error("#[runwait::test] expects a function with a body");
    }

    let mut output: Vec<TokenTree> = "#[::core::prelude::v1::test]"
        .parse::<TokenStream>()
        .unwrap_or_default()
        .into_iter()
        .collect();
    output.extend(tokens);

    output.into_iter().collect()
}
