//! Stack-depth annotation.
//!
//! The emitter addresses two parallel per-rule slot arrays — intermediate
//! results and saved positions — by small integer index. This pass walks
//! each rule's body bottom-up and records, on every node, how many of each
//! a correct emission of that node (and everything under it) will need.
//! See the recurrence table in the module's originating design doc for the
//! per-operator formulas; the comments below repeat the reasoning inline
//! since it's easy to get the `sequence` and `rule` cases off by one.

use crate::ast::{Expr, ExprKind, Grammar};

pub fn annotate(grammar: &mut Grammar) {
    for rule in grammar.rules.values_mut() {
        let (result, pos) = annotate_expr(&mut rule.expression);
        // A rule needs one slot above its body: one more to hold the body's
        // own result alongside the memoization bookkeeping, and the same
        // for positions (the body is evaluated after saving the entry pos).
        rule.result_stack_depth = result + 1;
        rule.pos_stack_depth = pos + 1;
    }
}

fn annotate_expr(expr: &mut Expr) -> (usize, usize) {
    let (result, pos) = match &mut expr.kind {
        ExprKind::RuleRef { .. }
        | ExprKind::Literal { .. }
        | ExprKind::Any
        | ExprKind::Class { .. }
        | ExprKind::SemanticAnd { .. }
        | ExprKind::SemanticNot { .. } => (0, 0),

        ExprKind::Labeled { expression, .. } | ExprKind::Optional(expression) => {
            annotate_expr(expression)
        }

        // Lookaheads and actions save the entry position before evaluating
        // their child, so they need one pos slot beyond whatever the child
        // needs; they don't add a result slot of their own.
        ExprKind::SimpleAnd(expression)
        | ExprKind::SimpleNot(expression)
        | ExprKind::Action { expression, .. } => {
            let (r, p) = annotate_expr(expression);
            (r, p + 1)
        }

        // Repetition accumulates into a slot one above the child's own
        // result slot, so it needs the child's depth plus one result slot;
        // positions are unaffected since the loop restores pos itself.
        ExprKind::ZeroOrMore(expression) | ExprKind::OneOrMore(expression) => {
            let (r, p) = annotate_expr(expression);
            (r + 1, p)
        }

        ExprKind::Choice(alternatives) => {
            let mut max_r = 0;
            let mut max_p = 0;
            for alt in alternatives {
                let (r, p) = annotate_expr(alt);
                max_r = max_r.max(r);
                max_p = max_p.max(p);
            }
            (max_r, max_p)
        }

        // A sequence collects its children's results into the array at
        // result[k], with child i writing result[k+i] — so it needs
        // 1 + max_i(i + e_i.result) slots. Every element shares the same
        // single saved entry position, so positions just need 1 + max(e.pos).
        ExprKind::Sequence(elements) => {
            let mut max_r = 0;
            let mut max_p = 0;
            for (i, el) in elements.iter_mut().enumerate() {
                let (r, p) = annotate_expr(el);
                max_r = max_r.max(i + r);
                max_p = max_p.max(p);
            }
            (1 + max_r, 1 + max_p)
        }
    };
    expr.result_stack_depth = result;
    expr.pos_stack_depth = pos;
    (result, pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Rule};
    use indexmap::IndexMap;
    use rstest::rstest;

    fn single_rule_grammar(expr: Expr) -> Grammar {
        let mut rules = IndexMap::new();
        rules.insert("start".into(), Rule::new("start", expr));
        Grammar::new("start", rules)
    }

    #[rstest]
    #[case::literal(Expr::literal("x"), 0, 0)]
    #[case::any(Expr::any(), 0, 0)]
    #[case::rule_ref(Expr::rule_ref("x"), 0, 0)]
    #[case::semantic_and(Expr::semantic_and("true"), 0, 0)]
    fn leaves_have_zero_depth(#[case] expr: Expr, #[case] result: usize, #[case] pos: usize) {
        let mut g = single_rule_grammar(expr);
        annotate(&mut g);
        let body = &g.rules["start"].expression;
        assert_eq!(body.result_stack_depth, result);
        assert_eq!(body.pos_stack_depth, pos);
    }

    #[test]
    fn labeled_and_optional_pass_through_child_depth() {
        let child = Expr::sequence(vec![Expr::literal("a"), Expr::literal("b")]);
        let (child_r, child_p) = {
            let mut g = single_rule_grammar(child.clone());
            annotate(&mut g);
            let b = &g.rules["start"].expression;
            (b.result_stack_depth, b.pos_stack_depth)
        };

        let mut g = single_rule_grammar(Expr::labeled("x", child.clone()));
        annotate(&mut g);
        let body = &g.rules["start"].expression;
        assert_eq!(body.result_stack_depth, child_r);
        assert_eq!(body.pos_stack_depth, child_p);

        let mut g = single_rule_grammar(Expr::optional(child));
        annotate(&mut g);
        let body = &g.rules["start"].expression;
        assert_eq!(body.result_stack_depth, child_r);
        assert_eq!(body.pos_stack_depth, child_p);
    }

    #[test]
    fn lookaheads_and_actions_add_one_pos_slot_only() {
        let child = Expr::literal("x");
        for wrap in [
            Expr::simple_and(child.clone()),
            Expr::simple_not(child.clone()),
            Expr::action(child.clone(), "code"),
        ] {
            let mut g = single_rule_grammar(wrap);
            annotate(&mut g);
            let body = &g.rules["start"].expression;
            assert_eq!(body.result_stack_depth, 0);
            assert_eq!(body.pos_stack_depth, 1);
        }
    }

    #[test]
    fn repetition_adds_one_result_slot_only() {
        let child = Expr::literal("x");
        for wrap in [Expr::zero_or_more(child.clone()), Expr::one_or_more(child)] {
            let mut g = single_rule_grammar(wrap);
            annotate(&mut g);
            let body = &g.rules["start"].expression;
            assert_eq!(body.result_stack_depth, 1);
            assert_eq!(body.pos_stack_depth, 0);
        }
    }

    #[test]
    fn choice_takes_the_max_over_alternatives() {
        let alts = vec![
            Expr::literal("a"),
            Expr::sequence(vec![Expr::literal("b"), Expr::literal("c")]),
        ];
        let mut g = single_rule_grammar(Expr::choice(alts));
        annotate(&mut g);
        let body = &g.rules["start"].expression;
        // the sequence alternative needs 1 + max(0+0, 1+0) = 2 result slots
        assert_eq!(body.result_stack_depth, 2);
        assert_eq!(body.pos_stack_depth, 1);
    }

    #[test]
    fn sequence_follows_the_index_plus_child_formula() {
        // elements: literal (0,0), one_or_more(literal) (1,0), labeled(simple_and(literal)) (0,1)
        let elements = vec![
            Expr::literal("a"),
            Expr::one_or_more(Expr::literal("b")),
            Expr::labeled("c", Expr::simple_and(Expr::literal("d"))),
        ];
        let mut g = single_rule_grammar(Expr::sequence(elements));
        annotate(&mut g);
        let body = &g.rules["start"].expression;
        // 1 + max(0+0, 1+1, 2+0) = 1 + 2 = 3
        assert_eq!(body.result_stack_depth, 3);
        // 1 + max(0, 0, 1) = 2
        assert_eq!(body.pos_stack_depth, 2);
    }

    #[test]
    fn rule_depth_is_body_depth_plus_one() {
        let mut g = single_rule_grammar(Expr::literal("x"));
        annotate(&mut g);
        let rule = &g.rules["start"];
        assert_eq!(rule.result_stack_depth, 1);
        assert_eq!(rule.pos_stack_depth, 1);
    }
}
