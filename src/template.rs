//! The named-variable template formatter used throughout `emit` to build
//! generated source text out of reusable snippets.
//!
//! `format` takes any number of string parts, interpolates `${name}` and
//! `${name|filter}` tokens against a shared variable map, re-indents any
//! part whose interpolation produced extra lines, and joins the parts with
//! a single newline. See `interpolate` and `reindent` for the two steps;
//! the order they run in (interpolate, then reindent) is what makes a
//! caller's inline `${x}` expansion line up under the part's own leading
//! whitespace even when `x`'s value spans multiple lines.

use std::collections::HashMap;

use crate::emit::strings::quote;
use crate::error::TemplateError;

pub type Vars = HashMap<String, String>;

/// Render and join `parts`, looking up `${name}` / `${name|filter}` tokens
/// in `vars`. A part with no variables to interpolate is unaffected by an
/// empty `vars` map.
pub fn format(parts: &[&str], vars: &Vars) -> Result<String, TemplateError> {
    let mut rendered = Vec::with_capacity(parts.len());
    for part in parts {
        rendered.push(reindent(&interpolate(part, vars)?));
    }
    Ok(rendered.join("\n"))
}

/// Convenience for the common case of no variables at all.
pub fn format_plain(parts: &[&str]) -> String {
    format(parts, &Vars::new()).expect("parts with no ${...} tokens cannot fail to interpolate")
}

fn interpolate(input: &str, vars: &Vars) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after_marker = &rest[start + 2..];
        let end = after_marker
            .find('}')
            .expect("template literals are compiler-authored and always well-formed");
        let token = &after_marker[..end];
        let (name, filter) = match token.split_once('|') {
            Some((name, filter)) => (name, Some(filter)),
            None => (token, None),
        };

        let value = vars
            .get(name)
            .ok_or_else(|| TemplateError::UndefinedVariable(name.to_string()))?;
        let rendered = match filter {
            None => value.clone(),
            Some("string") => quote(value),
            Some(other) => return Err(TemplateError::UnknownFilter(other.to_string())),
        };
        out.push_str(&rendered);

        rest = &after_marker[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

/// If `s` spans more than one line, prefix every line after the first with
/// the leading `[ \t]*` run of the first line.
fn reindent(s: &str) -> String {
    let Some(first_newline) = s.find('\n') else {
        return s.to_string();
    };
    let first_line = &s[..first_newline];
    let indent_len = first_line
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    let indent = &first_line[..indent_len];

    let mut out = String::with_capacity(s.len() + indent.len() * s.matches('\n').count());
    for (i, line) in s.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
            out.push_str(indent);
        }
        out.push_str(line);
    }
    out
}
