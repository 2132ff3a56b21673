//! Turns a grammar whose passes have already run (`passes::proxy`,
//! `passes::stack_depth`) into the source text of a standalone Rust
//! packrat parser.
//!
//! `operators::Emitter` handles one expression node at a time;
//! `rule::emit_rule` wraps a rule's emitted body in memoization and
//! display-name bookkeeping; `runtime::scaffold_prelude` supplies the fixed
//! `PegValue` / `SyntaxError` / `Parser` machinery every generated parser
//! needs regardless of the grammar. `emit` here stitches the three
//! together and adds the top-level `parse` entry points.

pub mod context;
pub mod operators;
pub mod rule;
pub mod runtime;
pub mod strings;

use smol_str::SmolStr;

use crate::ast::Grammar;
use crate::emit::operators::{rule_method_name, Emitter};
use crate::error::TemplateError;

/// Render the full parser source for `grammar`. `start_rules` must be
/// non-empty and every name in it must exist in `grammar.rules` — callers
/// (`compile::compile`) are responsible for resolving `CompileOptions` down
/// to this list and raising `CompileError::NoStartRule` before calling in.
pub fn emit(grammar: &Grammar, start_rules: &[SmolStr], self_parsing: bool) -> Result<String, TemplateError> {
    let mut emitter = Emitter::new();

    let mut rule_names: Vec<&SmolStr> = grammar.rules.keys().collect();
    rule_names.sort();

    let mut methods = String::new();
    for name in &rule_names {
        let rule = &grammar.rules[*name];
        methods.push_str(&rule::emit_rule(&mut emitter, rule, grammar)?);
        methods.push('\n');
    }

    let mut dispatch_arms = String::new();
    for name in start_rules {
        dispatch_arms.push_str(&format!(
            "        {:?} => parser.parse_{}(),\n",
            name.as_str(),
            rule_method_name(name)
        ));
    }
    let default_start = start_rules[0].as_str();

    let initializer = grammar
        .initializer
        .as_ref()
        .map(|i| i.code.clone())
        .unwrap_or_default();

    Ok(format!(
        r#"// Generated by packrat. Do not edit by hand.
#![allow(dead_code, unused_mut, unused_variables)]

{initializer}

{prelude}
impl<'a> Parser<'a> {{
    pub fn parse(input: &'a str) -> Result<PegValue, SyntaxError> {{
        Self::parse_rule(input, {default_start:?})
    }}

    pub fn parse_rule(input: &'a str, start_rule: &str) -> Result<PegValue, SyntaxError> {{
        let mut parser = Parser::new(input);
        let result = match start_rule {{
{dispatch_arms}            other => panic!("no such start rule: {{other}}"),
        }};
        match result {{
            Some(value) if parser.pos == parser.input.len() => Ok(value),
            Some(_) => {{
                parser.match_failed("end of input");
                Err(parser.syntax_error_at_rightmost_failure())
            }}
            None => Err(parser.syntax_error_at_rightmost_failure()),
        }}
    }}

{methods}}}
"#,
        initializer = initializer,
        prelude = runtime::scaffold_prelude(self_parsing),
        default_start = default_start,
        dispatch_arms = dispatch_arms,
        methods = methods,
    ))
}
