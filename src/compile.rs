//! The top-level entry point: `proxyRules(AST) -> stackDepths(AST) ->
//! emit(AST) -> parser source string`.

use smol_str::SmolStr;

use crate::ast::Grammar;
use crate::emit;
use crate::error::CompileError;
use crate::passes::{proxy, stack_depth};

/// Compilation knobs external to the grammar itself.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Rules the generated parser's `parse`/`parse_rule` entry points may be
    /// called with. Empty means "use the grammar's own `start_rule`".
    pub start_rules: Vec<String>,
    /// Skip emitting a textual copy of the character-quoting helpers and
    /// import this crate's real implementation instead. Only meaningful
    /// when the generated parser is linked back into a binary that already
    /// depends on `packrat` — the usual bootstrap case where this crate
    /// compiles its own grammar.
    pub self_parsing: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            start_rules: Vec::new(),
            self_parsing: false,
        }
    }
}

/// Run the full pipeline and return the generated parser's Rust source.
///
/// `grammar` is mutated in place by the two passes, matching how
/// `passes::proxy` and `passes::stack_depth` are designed to run directly
/// against the AST a front end handed in.
pub fn compile(grammar: &mut Grammar, options: &CompileOptions) -> Result<String, CompileError> {
    proxy::eliminate(grammar);
    stack_depth::annotate(grammar);

    let start_rules = resolve_start_rules(grammar, options)?;
    Ok(emit::emit(grammar, &start_rules, options.self_parsing)?)
}

/// `start_rules` is validated against the grammar *after* the passes have
/// run, which is what actually gets emitted: proxy elimination can rename a
/// rule out from under a caller (if it turns out to be itself a proxy), and
/// the only set of names guaranteed to still exist is whatever
/// `passes::proxy` left behind. A caller naming a rule that was eliminated
/// as a proxy should name its resolved target instead.
fn resolve_start_rules(grammar: &Grammar, options: &CompileOptions) -> Result<Vec<SmolStr>, CompileError> {
    if options.start_rules.is_empty() {
        return Ok(vec![grammar.start_rule.clone()]);
    }
    let resolved: Vec<SmolStr> = options
        .start_rules
        .iter()
        .filter(|name| grammar.rules.contains_key(name.as_str()))
        .map(|name| SmolStr::from(name.as_str()))
        .collect();
    if resolved.is_empty() {
        return Err(CompileError::NoStartRule {
            requested: options.start_rules.clone(),
        });
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Rule};
    use indexmap::IndexMap;

    fn grammar(start: &str, rules: Vec<(&str, Expr)>) -> Grammar {
        let mut map = IndexMap::new();
        for (name, expr) in rules {
            map.insert(SmolStr::from(name), Rule::new(name, expr));
        }
        Grammar::new(start, map)
    }

    #[test]
    fn compiles_a_trivial_grammar_into_parser_source() {
        let mut g = grammar("start", vec![("start", Expr::literal("x"))]);
        let out = compile(&mut g, &CompileOptions::default()).unwrap();
        assert!(out.contains("fn parse_start"));
    }

    #[test]
    fn unknown_start_rule_is_an_error() {
        let mut g = grammar("start", vec![("start", Expr::literal("x"))]);
        let options = CompileOptions {
            start_rules: vec!["nonexistent".to_string()],
            ..CompileOptions::default()
        };
        let err = compile(&mut g, &options).unwrap_err();
        assert!(matches!(err, CompileError::NoStartRule { .. }));
    }

    #[test]
    fn proxy_elimination_runs_before_emission() {
        // "start" is a pure proxy for "real"; compiling should still work
        // and should emit a method for "real", not "start".
        let mut g = grammar(
            "start",
            vec![("start", Expr::rule_ref("real")), ("real", Expr::literal("x"))],
        );
        let out = compile(&mut g, &CompileOptions::default()).unwrap();
        assert!(out.contains("fn parse_real"));
        assert!(!out.contains("fn parse_start"));
    }
}
