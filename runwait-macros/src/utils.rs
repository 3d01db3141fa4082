use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Reads `worker_threads = N` out of an attribute argument list.
pub(crate) fn parse_worker_threads(attr: &TokenStream) -> Result<Option<usize>, String> {
    parse_args(&attr.to_string())
}

/// Parses the textual form of the attribute arguments.
///
/// Keys are matched exactly; unknown keys are ignored. A missing or
/// non-`usize` value is reported as an error message.
fn parse_args(attr: &str) -> Result<Option<usize>, String> {
    let mut worker_threads = None;

    for part in attr.split(',') {
        let (key, value) = match part.split_once('=') {
            Some((key, value)) => (key.trim(), Some(value.trim())),
            None => (part.trim(), None),
        };

        if key != "worker_threads" {
            continue;
        }

        let Some(value) = value else {
            return Err("expected `worker_threads = N`".to_string());
        };

        match value.parse::<usize>() {
            Ok(0) => return Err("worker_threads must be > 0".to_string()),
            Ok(n) => worker_threads = Some(n),
            Err(_) => return Err(format!("invalid worker_threads value `{value}`")),
        }
    }

    Ok(worker_threads)
}

/// Builds the runtime constructor expression used by the generated code.
pub(crate) fn runtime_expr(worker_threads: Option<usize>) -> String {
    let mut builder = String::from("::runwait::RuntimeBuilder::new()");

    if let Some(n) = worker_threads {
        builder.push_str(&format!(".worker_threads({n})"));
    }

    builder.push_str(".build()");
    builder
}

/// Removes the `async` keyword from a function signature.
pub(crate) fn strip_async(tokens: &mut Vec<TokenTree>) {
    if let Some(pos) = tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        tokens.remove(pos);
    }
}

/// Replaces the function body (the last brace group) with `wrap(body)`.
///
/// Returns `false` when the item has no body.
pub(crate) fn replace_body(tokens: &mut [TokenTree], wrap: impl FnOnce(String) -> String) -> bool {
    let Some(pos) = tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
    else {
        return false;
    };

    let body = match &tokens[pos] {
        TokenTree::Group(g) => g.stream().to_string(),
        _ => return false,
    };

    let stream = match wrap(body).parse::<TokenStream>() {
        Ok(stream) => stream,
        Err(err) => compile_error(&format!("runwait macro error: {err}")),
    };

    tokens[pos] = TokenTree::Group(Group::new(Delimiter::Brace, stream));
    true
}

/// Produces a `compile_error!` invocation carrying `message`.
pub(crate) fn compile_error(message: &str) -> TokenStream {
    format!("::core::compile_error!({message:?});")
        .parse()
        .unwrap_or_default()
}
