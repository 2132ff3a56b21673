//! The generic node visitor.
//!
//! In the reference design this is a mapping from a node's `type` tag to a
//! handler closure, with a missing handler treated as a programming fault.
//! A tagged union plus an exhaustive `match` gives us the same contract for
//! free: `NodeVisitor::dispatch` below is the only place that matches on
//! `ExprKind`, and the compiler refuses to build it unless every variant in
//! `ExprKind` has a corresponding method — there is no way to "forget" a
//! handler the way there is with a runtime map.
//!
//! `emit::operators::Emitter` implements this trait. Both passes
//! (`passes::proxy`, `passes::stack_depth`) do their own direct recursion
//! instead: `proxy` rewrites nodes in place rather than folding a result
//! back up the tree, and `stack_depth`'s per-variant formula reads more
//! directly as a plain recursive match than as a trait with fourteen
//! single-use method bodies. See each pass's module docs.

use crate::ast::{ClassPart, Expr, ExprKind};

pub trait NodeVisitor {
    type Context;
    type Output;

    /// Look up `node`'s tag and invoke the matching handler.
    fn dispatch(&mut self, node: &Expr, ctx: Self::Context) -> Self::Output {
        match &node.kind {
            ExprKind::Choice(alternatives) => self.choice(node, alternatives, ctx),
            ExprKind::Sequence(elements) => self.sequence(node, elements, ctx),
            ExprKind::Labeled { label, expression } => {
                self.labeled(node, label, expression, ctx)
            }
            ExprKind::SimpleAnd(expression) => self.simple_and(node, expression, ctx),
            ExprKind::SimpleNot(expression) => self.simple_not(node, expression, ctx),
            ExprKind::SemanticAnd { code } => self.semantic_and(node, code, ctx),
            ExprKind::SemanticNot { code } => self.semantic_not(node, code, ctx),
            ExprKind::Optional(expression) => self.optional(node, expression, ctx),
            ExprKind::ZeroOrMore(expression) => self.zero_or_more(node, expression, ctx),
            ExprKind::OneOrMore(expression) => self.one_or_more(node, expression, ctx),
            ExprKind::Action { expression, code } => self.action(node, expression, code, ctx),
            ExprKind::RuleRef { name } => self.rule_ref(node, name, ctx),
            ExprKind::Literal { value } => self.literal(node, value, ctx),
            ExprKind::Any => self.any(node, ctx),
            ExprKind::Class {
                parts,
                inverted,
                raw_text,
            } => self.class(node, parts, *inverted, raw_text, ctx),
        }
    }

    fn choice(&mut self, node: &Expr, alternatives: &[Expr], ctx: Self::Context) -> Self::Output;
    fn sequence(&mut self, node: &Expr, elements: &[Expr], ctx: Self::Context) -> Self::Output;
    fn labeled(
        &mut self,
        node: &Expr,
        label: &str,
        expression: &Expr,
        ctx: Self::Context,
    ) -> Self::Output;
    fn simple_and(&mut self, node: &Expr, expression: &Expr, ctx: Self::Context) -> Self::Output;
    fn simple_not(&mut self, node: &Expr, expression: &Expr, ctx: Self::Context) -> Self::Output;
    fn semantic_and(&mut self, node: &Expr, code: &str, ctx: Self::Context) -> Self::Output;
    fn semantic_not(&mut self, node: &Expr, code: &str, ctx: Self::Context) -> Self::Output;
    fn optional(&mut self, node: &Expr, expression: &Expr, ctx: Self::Context) -> Self::Output;
    fn zero_or_more(&mut self, node: &Expr, expression: &Expr, ctx: Self::Context) -> Self::Output;
    fn one_or_more(&mut self, node: &Expr, expression: &Expr, ctx: Self::Context) -> Self::Output;
    fn action(
        &mut self,
        node: &Expr,
        expression: &Expr,
        code: &str,
        ctx: Self::Context,
    ) -> Self::Output;
    fn rule_ref(&mut self, node: &Expr, name: &str, ctx: Self::Context) -> Self::Output;
    fn literal(&mut self, node: &Expr, value: &str, ctx: Self::Context) -> Self::Output;
    fn any(&mut self, node: &Expr, ctx: Self::Context) -> Self::Output;
    fn class(
        &mut self,
        node: &Expr,
        parts: &[ClassPart],
        inverted: bool,
        raw_text: &str,
        ctx: Self::Context,
    ) -> Self::Output;
}
