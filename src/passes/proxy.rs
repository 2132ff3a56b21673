//! Proxy-rule elimination.
//!
//! A rule is a proxy iff its body is exactly a `rule_ref` (`Expr::is_bare_rule_ref`).
//! We rewrite every reference to a proxy's name to its target and drop the
//! proxy from the rule table.
//!
//! Rule names are visited in sorted order for reproducible builds (rather
//! than relying on `IndexMap` insertion order, which §3.1 calls out as not
//! semantically significant). Each proxy's target is read live, at the
//! moment that rule is visited, and every rewrite is applied to the whole
//! grammar immediately — including rules not yet visited and rules already
//! queued for removal. That means a rule discovered to be a proxy later in
//! the pass may already have had its target rewritten by an earlier step
//! (e.g. in a chain `a -> b -> c`, visiting `b` before `a` updates `a`'s
//! body to point straight at `c`'s resolved target before `a` is ever
//! visited). Removal itself is deferred to the end of the pass so that a
//! rule already marked for deletion is still a valid rewrite target for
//! anything that still points at it mid-pass.
//!
//! This is deliberately stronger than the minimum the reference behavior
//! requires: §4.2 only promises that a chain *may* need more than one
//! traversal to collapse fully, not that it must. Deferred removal plus
//! live target lookup means every `rule_ref` left in the AST after this
//! pass names a rule that still exists — chains fully collapse in a single
//! call regardless of rule declaration order, which is the stronger
//! invariant (§3.2) worth keeping.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use crate::ast::{Expr, ExprKind, Grammar};

pub fn eliminate(grammar: &mut Grammar) {
    let mut names: Vec<SmolStr> = grammar.rules.keys().cloned().collect();
    names.sort();

    let mut to_remove: FxHashSet<SmolStr> = FxHashSet::default();

    for name in &names {
        let target = match grammar.rules.get(name) {
            Some(rule) => match &rule.expression.kind {
                ExprKind::RuleRef { name: target } => target.clone(),
                _ => continue,
            },
            None => continue,
        };

        tracing::debug!(rule = %name, target = %target, "eliminating proxy rule");

        for rule in grammar.rules.values_mut() {
            rewrite_rule_ref(&mut rule.expression, name, &target);
        }
        if grammar.start_rule == *name {
            grammar.start_rule = target.clone();
        }
        to_remove.insert(name.clone());
    }

    for name in &to_remove {
        grammar.rules.shift_remove(name);
    }
}

fn rewrite_rule_ref(expr: &mut Expr, from: &str, to: &str) {
    match &mut expr.kind {
        ExprKind::RuleRef { name } => {
            if name.as_str() == from {
                *name = to.into();
            }
        }
        ExprKind::Literal { .. }
        | ExprKind::Any
        | ExprKind::Class { .. }
        | ExprKind::SemanticAnd { .. }
        | ExprKind::SemanticNot { .. } => {}
        ExprKind::Choice(alternatives) => {
            for alt in alternatives {
                rewrite_rule_ref(alt, from, to);
            }
        }
        ExprKind::Sequence(elements) => {
            for el in elements {
                rewrite_rule_ref(el, from, to);
            }
        }
        ExprKind::Labeled { expression, .. }
        | ExprKind::SimpleAnd(expression)
        | ExprKind::SimpleNot(expression)
        | ExprKind::Optional(expression)
        | ExprKind::ZeroOrMore(expression)
        | ExprKind::OneOrMore(expression)
        | ExprKind::Action { expression, .. } => rewrite_rule_ref(expression, from, to),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Rule;
    use indexmap::IndexMap;

    fn grammar(start: &str, rules: Vec<(&str, Expr)>) -> Grammar {
        let mut map = IndexMap::new();
        for (name, expr) in rules {
            map.insert(SmolStr::from(name), Rule::new(name, expr));
        }
        Grammar::new(start, map)
    }

    #[test]
    fn single_proxy_is_removed_and_start_rule_rewritten() {
        let mut g = grammar(
            "start",
            vec![
                ("start", Expr::rule_ref("a")),
                ("a", Expr::literal("x")),
            ],
        );
        eliminate(&mut g);
        assert_eq!(g.start_rule, "a");
        assert!(!g.rules.contains_key("start"));
        assert!(g.rules.contains_key("a"));
    }

    #[test]
    fn proxy_chain_fully_collapses_regardless_of_name_order() {
        // z -> y -> x, sorted visitation order is x, y, z.
        let mut g = grammar(
            "z",
            vec![
                ("x", Expr::literal("lit")),
                ("y", Expr::rule_ref("x")),
                ("z", Expr::rule_ref("y")),
            ],
        );
        eliminate(&mut g);
        assert_eq!(g.rules.len(), 1);
        assert!(g.rules.contains_key("x"));
        assert_eq!(g.start_rule, "x");
    }

    #[test]
    fn no_dangling_rule_refs_survive_a_diamond_of_proxies() {
        let mut g = grammar(
            "start",
            vec![
                ("start", Expr::choice(vec![Expr::rule_ref("a"), Expr::rule_ref("c")])),
                ("a", Expr::rule_ref("b")),
                ("c", Expr::rule_ref("b")),
                ("b", Expr::literal("x")),
            ],
        );
        eliminate(&mut g);
        assert!(g.rules.contains_key("b"));
        for rule in g.rules.values() {
            assert_refs_resolve(&rule.expression, &g.rules);
        }
    }

    fn assert_refs_resolve(expr: &Expr, rules: &IndexMap<SmolStr, Rule>) {
        match &expr.kind {
            ExprKind::RuleRef { name } => assert!(rules.contains_key(name.as_str())),
            ExprKind::Choice(v) | ExprKind::Sequence(v) => {
                for e in v {
                    assert_refs_resolve(e, rules);
                }
            }
            ExprKind::Labeled { expression, .. }
            | ExprKind::SimpleAnd(expression)
            | ExprKind::SimpleNot(expression)
            | ExprKind::Optional(expression)
            | ExprKind::ZeroOrMore(expression)
            | ExprKind::OneOrMore(expression)
            | ExprKind::Action { expression, .. } => assert_refs_resolve(expression, rules),
            _ => {}
        }
    }

    #[test]
    fn non_proxy_rules_are_left_untouched() {
        let mut g = grammar(
            "start",
            vec![("start", Expr::sequence(vec![Expr::literal("a"), Expr::literal("b")]))],
        );
        let before = g.clone();
        eliminate(&mut g);
        assert_eq!(g, before);
    }
}
