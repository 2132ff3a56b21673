//! The per-rule wrapper: memoization, entry-position bookkeeping and the
//! display-name override, wrapped around one rule's emitted body.

use crate::ast::{Grammar, Rule};
use crate::emit::context::EmitContext;
use crate::emit::operators::{rule_method_name, Emitter};
use crate::emit::strings::quote;
use crate::error::TemplateError;

/// Emit `fn parse_<rule>(&mut self) -> Option<PegValue> { ... }` for one
/// rule. The memo cache is checked first and keyed by `(rule name, entry
/// pos)`; a miss runs the body, then stores `(pos after, outcome)` before
/// returning it, so a later call at the same position is a single hash
/// lookup instead of a re-walk.
pub fn emit_rule(emitter: &mut Emitter, rule: &Rule, _grammar: &Grammar) -> Result<String, TemplateError> {
    let method = rule_method_name(&rule.name);
    let body_ctx = EmitContext {
        result_index: 0,
        pos_index: 1,
    };
    let body = emitter.emit(&rule.expression, body_ctx)?;

    let (report_inc, report_dec, record) = match &rule.display_name {
        Some(display_name) => (
            "self.report_failures += 1;\n    ",
            "self.report_failures -= 1;\n    ",
            format!(
                "if self.report_failures == 0 {{\n            self.match_failed({});\n        }}\n        ",
                quote(display_name)
            ),
        ),
        None => ("", "", String::new()),
    };

    Ok(format!(
        r#"fn parse_{method}(&mut self) -> Option<PegValue> {{
    if let Some((pos_after, cached)) = self.memo_get("{name}", self.pos) {{
        self.pos = pos_after;
        return cached;
    }}
    let entry_pos = self.pos;
    let mut result: Vec<Option<PegValue>> = vec![None; {result_depth}];
    let mut pos_stack: Vec<usize> = vec![0; {pos_depth}];
    pos_stack[0] = entry_pos;
    {report_inc}{body}
    {report_dec}let __outcome = result[0].take();
    if __outcome.is_none() {{
        self.pos = entry_pos;
        {record}}}
    self.memo_put("{name}", entry_pos, self.pos, __outcome.clone());
    __outcome
}}
"#,
        method = method,
        name = rule.name,
        result_depth = rule.result_stack_depth.max(1),
        pos_depth = rule.pos_stack_depth.max(1),
        report_inc = report_inc,
        body = body,
        report_dec = report_dec,
        record = record,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::passes::stack_depth;
    use indexmap::IndexMap;
    use smol_str::SmolStr;

    fn one_rule(rule: Rule) -> Grammar {
        let mut rules = IndexMap::new();
        rules.insert(SmolStr::from(rule.name.clone()), rule);
        Grammar::new("start", rules)
    }

    #[test]
    fn memo_is_checked_before_the_body_runs() {
        let mut g = one_rule(Rule::new("start", Expr::literal("x")));
        stack_depth::annotate(&mut g);
        let mut e = Emitter::new();
        let out = emit_rule(&mut e, &g.rules["start"], &g).unwrap();
        assert!(out.contains("self.memo_get(\"start\""));
        assert!(out.find("memo_get").unwrap() < out.find("entry_pos").unwrap());
    }

    #[test]
    fn display_name_wraps_body_in_report_failures_toggle() {
        let mut g = one_rule(Rule::new("start", Expr::literal("x")).with_display_name("thing"));
        stack_depth::annotate(&mut g);
        let mut e = Emitter::new();
        let out = emit_rule(&mut e, &g.rules["start"], &g).unwrap();
        assert!(out.contains("self.report_failures += 1;"));
        assert!(out.contains("self.report_failures -= 1;"));
        assert!(out.contains("\"thing\""));
    }

    #[test]
    fn no_display_name_means_no_report_failures_toggle() {
        let mut g = one_rule(Rule::new("start", Expr::literal("x")));
        stack_depth::annotate(&mut g);
        let mut e = Emitter::new();
        let out = emit_rule(&mut e, &g.rules["start"], &g).unwrap();
        assert!(!out.contains("report_failures += 1"));
    }
}
