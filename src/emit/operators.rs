//! Per-operator emission: one Rust snippet per `ExprKind` variant.
//!
//! Every handler below honors the slot contract from `stack_depth`: it
//! leaves `result[ctx.result_index]` holding the node's outcome (`None` on
//! failure, `Some(value)` on success) and leaves `self.pos` exactly where it
//! was on entry whenever it reports failure. Scratch slots beyond those two
//! indices are addressed at `+k` for `k >= 1`, matching what `stack_depth`
//! reserved for each node's children.
//!
//! `Emitter` implements `NodeVisitor` rather than a free recursive function
//! so that the compiler enforces exhaustiveness over `ExprKind` the same way
//! the other passes do.

use crate::ast::{ClassPart, Expr, ExprKind};
use crate::emit::context::EmitContext;
use crate::emit::strings::quote;
use crate::error::TemplateError;
use crate::template::{self, Vars};
use crate::visitor::NodeVisitor;

pub struct Emitter;

fn vars(pairs: &[(&str, &str)]) -> Vars {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Emitter {
    pub fn new() -> Self {
        Emitter
    }

    pub fn emit(&mut self, expr: &Expr, ctx: EmitContext) -> Result<String, TemplateError> {
        self.dispatch(expr, ctx)
    }
}

impl NodeVisitor for Emitter {
    type Context = EmitContext;
    type Output = Result<String, TemplateError>;

    fn choice(&mut self, _node: &Expr, alternatives: &[Expr], ctx: EmitContext) -> Self::Output {
        // Every alternative runs at the same context: only one of them ever
        // ends up contributing the node's result, so there's nothing to
        // keep distinct between attempts.
        let mut body = String::new();
        for (i, alt) in alternatives.iter().enumerate() {
            let child = self.dispatch(alt, ctx)?;
            if i == 0 {
                body = child;
            } else {
                body = template::format(
                    &[
                        "${child}",
                        "if result[${ri}].is_none() {",
                        "    ${rest}",
                        "}",
                    ],
                    &vars(&[
                        ("child", &body),
                        ("ri", &ctx.result_index.to_string()),
                        ("rest", &child),
                    ]),
                )?;
            }
        }
        Ok(template::format(&["{", "    ${body}", "}"], &vars(&[("body", &body)]))?)
    }

    fn sequence(&mut self, _node: &Expr, elements: &[Expr], ctx: EmitContext) -> Self::Output {
        let ri = ctx.result_index;
        let pi = ctx.pos_index;
        let child_ctx = EmitContext {
            result_index: ri,
            pos_index: pi + 1,
        };

        // Build the short-circuit ladder from the last element backward so
        // each later element's code sits inside an `if __seq_ok { ... }`
        // guarded by every earlier element having matched.
        let mut tail = String::new();
        for (i, el) in elements.iter().enumerate().rev() {
            let el_ctx = EmitContext {
                result_index: child_ctx.result_index + i,
                pos_index: child_ctx.pos_index,
            };
            let child = self.dispatch(el, el_ctx)?;
            let step = template::format(
                &[
                    "${child}",
                    "if result[${idx}].is_none() { __seq_ok = false; }",
                ],
                &vars(&[("child", &child), ("idx", &el_ctx.result_index.to_string())]),
            )?;
            tail = if tail.is_empty() {
                step
            } else {
                template::format(
                    &["${step}", "if __seq_ok {", "    ${tail}", "}"],
                    &vars(&[("step", &step), ("tail", &tail)]),
                )?
            };
        }

        let items: Vec<String> = (0..elements.len())
            .map(|i| format!("result[{}].take().unwrap()", child_ctx.result_index + i))
            .collect();
        let list_expr = format!("PegValue::List(vec![{}])", items.join(", "));

        template::format(
            &[
                "{",
                "    pos_stack[${pi}] = self.pos;",
                "    let mut __seq_ok = true;",
                "    ${ladder}",
                "    if __seq_ok {",
                "        result[${ri}] = Some(${list_expr});",
                "    } else {",
                "        result[${ri}] = None;",
                "        self.pos = pos_stack[${pi}];",
                "    }",
                "}",
            ],
            &vars(&[
                ("pi", &pi.to_string()),
                ("ri", &ri.to_string()),
                ("ladder", &tail),
                ("list_expr", &list_expr),
            ]),
        )
    }

    fn labeled(&mut self, _node: &Expr, _label: &str, expression: &Expr, ctx: EmitContext) -> Self::Output {
        // The label only matters to whichever action sits above this node;
        // emission itself is a straight pass-through.
        self.dispatch(expression, ctx)
    }

    fn simple_and(&mut self, _node: &Expr, expression: &Expr, ctx: EmitContext) -> Self::Output {
        let pi = ctx.pos_index;
        let ri = ctx.result_index;
        let child_ctx = EmitContext {
            result_index: ri,
            pos_index: pi + 1,
        };
        let child = self.dispatch(expression, child_ctx)?;
        template::format(
            &[
                "{",
                "    pos_stack[${pi}] = self.pos;",
                "    self.report_failures += 1;",
                "    ${child}",
                "    self.report_failures -= 1;",
                "    self.pos = pos_stack[${pi}];",
                "    result[${ri}] = if result[${ri}].is_some() {",
                "        Some(PegValue::Str(String::new()))",
                "    } else {",
                "        None",
                "    };",
                "}",
            ],
            &vars(&[("pi", &pi.to_string()), ("ri", &ri.to_string()), ("child", &child)]),
        )
    }

    fn simple_not(&mut self, _node: &Expr, expression: &Expr, ctx: EmitContext) -> Self::Output {
        let pi = ctx.pos_index;
        let ri = ctx.result_index;
        let child_ctx = EmitContext {
            result_index: ri,
            pos_index: pi + 1,
        };
        let child = self.dispatch(expression, child_ctx)?;
        template::format(
            &[
                "{",
                "    pos_stack[${pi}] = self.pos;",
                "    self.report_failures += 1;",
                "    ${child}",
                "    self.report_failures -= 1;",
                "    self.pos = pos_stack[${pi}];",
                "    result[${ri}] = if result[${ri}].is_none() {",
                "        Some(PegValue::Str(String::new()))",
                "    } else {",
                "        None",
                "    };",
                "}",
            ],
            &vars(&[("pi", &pi.to_string()), ("ri", &ri.to_string()), ("child", &child)]),
        )
    }

    fn semantic_and(&mut self, _node: &Expr, code: &str, ctx: EmitContext) -> Self::Output {
        template::format(
            &[
                "{",
                "    result[${ri}] = if { ${code} } {",
                "        Some(PegValue::Str(String::new()))",
                "    } else {",
                "        None",
                "    };",
                "}",
            ],
            &vars(&[("ri", &ctx.result_index.to_string()), ("code", code)]),
        )
    }

    fn semantic_not(&mut self, _node: &Expr, code: &str, ctx: EmitContext) -> Self::Output {
        template::format(
            &[
                "{",
                "    result[${ri}] = if !{ ${code} } {",
                "        Some(PegValue::Str(String::new()))",
                "    } else {",
                "        None",
                "    };",
                "}",
            ],
            &vars(&[("ri", &ctx.result_index.to_string()), ("code", code)]),
        )
    }

    fn optional(&mut self, _node: &Expr, expression: &Expr, ctx: EmitContext) -> Self::Output {
        let child = self.dispatch(expression, ctx)?;
        template::format(
            &[
                "{",
                "    ${child}",
                "    if result[${ri}].is_none() {",
                "        result[${ri}] = Some(PegValue::Str(String::new()));",
                "    }",
                "}",
            ],
            &vars(&[("child", &child), ("ri", &ctx.result_index.to_string())]),
        )
    }

    fn zero_or_more(&mut self, _node: &Expr, expression: &Expr, ctx: EmitContext) -> Self::Output {
        let ri = ctx.result_index;
        let child_ctx = EmitContext {
            result_index: ri + 1,
            pos_index: ctx.pos_index,
        };
        let child = self.dispatch(expression, child_ctx)?;
        template::format(
            &[
                "{",
                "    let mut __items: Vec<PegValue> = Vec::new();",
                "    loop {",
                "        ${child}",
                "        match result[${ci}].take() {",
                "            Some(v) => __items.push(v),",
                "            None => break,",
                "        }",
                "    }",
                "    result[${ri}] = Some(PegValue::List(__items));",
                "}",
            ],
            &vars(&[
                ("child", &child),
                ("ci", &child_ctx.result_index.to_string()),
                ("ri", &ri.to_string()),
            ]),
        )
    }

    fn one_or_more(&mut self, _node: &Expr, expression: &Expr, ctx: EmitContext) -> Self::Output {
        let ri = ctx.result_index;
        let child_ctx = EmitContext {
            result_index: ri + 1,
            pos_index: ctx.pos_index,
        };
        let child = self.dispatch(expression, child_ctx)?;
        template::format(
            &[
                "{",
                "    let mut __items: Vec<PegValue> = Vec::new();",
                "    loop {",
                "        ${child}",
                "        match result[${ci}].take() {",
                "            Some(v) => __items.push(v),",
                "            None => break,",
                "        }",
                "    }",
                "    result[${ri}] = if __items.is_empty() {",
                "        None",
                "    } else {",
                "        Some(PegValue::List(__items))",
                "    };",
                "}",
            ],
            &vars(&[
                ("child", &child),
                ("ci", &child_ctx.result_index.to_string()),
                ("ri", &ri.to_string()),
            ]),
        )
    }

    fn action(&mut self, _node: &Expr, expression: &Expr, code: &str, ctx: EmitContext) -> Self::Output {
        let ri = ctx.result_index;
        let pi = ctx.pos_index;
        let child_ctx = EmitContext {
            result_index: ri,
            pos_index: pi + 1,
        };
        let child = self.dispatch(expression, child_ctx)?;
        let bindings = action_bindings(expression, ri);

        template::format(
            &[
                "{",
                "    pos_stack[${pi}] = self.pos;",
                "    ${child}",
                "    if result[${ri}].is_some() {",
                "        let __outcome: Option<PegValue> = (|| -> Option<PegValue> {",
                "            ${bindings}",
                "            ${code}",
                "        })();",
                "        result[${ri}] = match __outcome {",
                "            Some(v) => Some(v),",
                "            None => {",
                "                self.pos = pos_stack[${pi}];",
                "                None",
                "            }",
                "        };",
                "    }",
                "}",
            ],
            &vars(&[
                ("pi", &pi.to_string()),
                ("ri", &ri.to_string()),
                ("child", &child),
                ("bindings", &bindings),
                ("code", code),
            ]),
        )
    }

    fn rule_ref(&mut self, _node: &Expr, name: &str, ctx: EmitContext) -> Self::Output {
        template::format(
            &["{", "    result[${ri}] = self.parse_${method}();", "}"],
            &vars(&[
                ("ri", &ctx.result_index.to_string()),
                ("method", &rule_method_name(name)),
            ]),
        )
    }

    fn literal(&mut self, _node: &Expr, value: &str, ctx: EmitContext) -> Self::Output {
        let ri = ctx.result_index;
        if value.is_empty() {
            return template::format(
                &["{", "    result[${ri}] = Some(PegValue::Str(String::new()));", "}"],
                &vars(&[("ri", &ri.to_string())]),
            );
        }
        let quoted = quote(value);
        // `match_failed` records the *quoted* form of what was expected
        // (§4.6), so the recorded token needs a second level of quoting:
        // `quoted` is the Rust source literal `"hello"`; what should show
        // up in the error message is the four-character text `"hello"`
        // (with its own quote marks), so we quote `quoted` again.
        let double_quoted = quote(&quoted);
        template::format(
            &[
                "{",
                "    if self.input[self.pos..].starts_with(${quoted}) {",
                "        result[${ri}] = Some(PegValue::Str(${quoted}.to_string()));",
                "        self.pos += ${len};",
                "    } else {",
                "        result[${ri}] = None;",
                "        self.match_failed(${double_quoted});",
                "    }",
                "}",
            ],
            &vars(&[
                ("ri", &ri.to_string()),
                ("quoted", &quoted),
                ("double_quoted", &double_quoted),
                ("len", &value.len().to_string()),
            ]),
        )
    }

    fn any(&mut self, _node: &Expr, ctx: EmitContext) -> Self::Output {
        template::format(
            &[
                "{",
                "    match self.input[self.pos..].chars().next() {",
                "        Some(ch) => {",
                "            result[${ri}] = Some(PegValue::Char(ch));",
                "            self.pos += ch.len_utf8();",
                "        }",
                "        None => {",
                "            result[${ri}] = None;",
                "            self.match_failed(\"any character\");",
                "        }",
                "    }",
                "}",
            ],
            &vars(&[("ri", &ctx.result_index.to_string())]),
        )
    }

    fn class(&mut self, _node: &Expr, parts: &[ClassPart], inverted: bool, raw_text: &str, ctx: EmitContext) -> Self::Output {
        let predicate = class_predicate(parts, inverted);
        let quoted_desc = quote(raw_text);
        template::format(
            &[
                "{",
                "    match self.input[self.pos..].chars().next() {",
                "        Some(ch) if ${predicate} => {",
                "            result[${ri}] = Some(PegValue::Char(ch));",
                "            self.pos += ch.len_utf8();",
                "        }",
                "        _ => {",
                "            result[${ri}] = None;",
                "            self.match_failed(${quoted});",
                "        }",
                "    }",
                "}",
            ],
            &vars(&[
                ("predicate", &predicate),
                ("ri", &ctx.result_index.to_string()),
                ("quoted", &quoted_desc),
            ]),
        )
    }
}

/// Build the `let <label> = ...;` bindings an action's code block sees, per
/// the positional-derivation rule: a `Sequence` body binds each `Labeled`
/// element by its position in the collected array; a single `Labeled` body
/// binds directly to the child's own value; anything else binds nothing.
fn action_bindings(expression: &Expr, result_index: usize) -> String {
    match &expression.kind {
        ExprKind::Sequence(elements) => {
            let mut out = String::new();
            for (i, el) in elements.iter().enumerate() {
                if let ExprKind::Labeled { label, .. } = &el.kind {
                    out.push_str(&format!(
                        "let {label} = match &result[{result_index}] {{ Some(PegValue::List(items)) => items[{i}].clone(), _ => unreachable!() }};\n            "
                    ));
                }
            }
            out
        }
        ExprKind::Labeled { label, .. } => {
            format!("let {label} = result[{result_index}].clone().unwrap();\n            ")
        }
        _ => String::new(),
    }
}

fn class_predicate(parts: &[ClassPart], inverted: bool) -> String {
    if parts.is_empty() {
        return if inverted { "true".to_string() } else { "false".to_string() };
    }
    let mut terms = Vec::with_capacity(parts.len());
    for part in parts {
        match part {
            ClassPart::Char(c) => terms.push(format!("ch == {}", quote_char(*c))),
            ClassPart::Range(lo, hi) => {
                terms.push(format!("({}..={}).contains(&ch)", quote_char(*lo), quote_char(*hi)))
            }
        }
    }
    let joined = terms.join(" || ");
    if inverted {
        format!("!({joined})")
    } else {
        format!("({joined})")
    }
}

fn quote_char(c: char) -> String {
    // reuse the same escaping rules as string quoting, just with single
    // quotes around a one-character body; `quote` never escapes `'` since
    // it's meant for a double-quoted context, so a lone single quote needs
    // its own case here or it would close the char literal early.
    if c == '\'' {
        return "'\\''".to_string();
    }
    let escaped = quote(&c.to_string());
    format!("'{}'", &escaped[1..escaped.len() - 1])
}

/// Rule names are grammar identifiers but aren't guaranteed to be valid Rust
/// identifiers on their own (e.g. a leading digit); sanitize defensively.
pub fn rule_method_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        if c.is_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
        if i == 0 && c.is_ascii_digit() {
            out.insert(0, '_');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    #[test]
    fn literal_snippet_contains_quoted_value_and_advance_length() {
        let mut e = Emitter::new();
        let out = e.emit(&Expr::literal("ab"), EmitContext::root()).unwrap();
        assert!(out.contains("\"ab\""));
        assert!(out.contains("self.pos += 2"));
    }

    #[test]
    fn literal_failure_records_the_quoted_form_not_the_bare_value() {
        // §4.6: "record the quoted form of v as an expected alternative" —
        // `match_failed` must see the token `"ab"` (with its own quote
        // marks), not the bare text `ab`.
        let mut e = Emitter::new();
        let out = e.emit(&Expr::literal("ab"), EmitContext::root()).unwrap();
        assert!(out.contains("self.match_failed(\"\\\"ab\\\"\")"));
        assert!(!out.contains("self.match_failed(\"ab\")"));
    }

    #[test]
    fn zero_length_literal_always_matches() {
        let mut e = Emitter::new();
        let out = e.emit(&Expr::literal(""), EmitContext::root()).unwrap();
        assert!(out.contains("Some(PegValue::Str(String::new()))"));
        assert!(!out.contains("match_failed"));
    }

    #[test]
    fn rule_ref_calls_sanitized_method_name() {
        let mut e = Emitter::new();
        let out = e.emit(&Expr::rule_ref("my-rule"), EmitContext::root()).unwrap();
        assert!(out.contains("self.parse_my_rule()"));
    }

    #[test]
    fn sequence_short_circuits_and_restores_pos_on_failure() {
        let mut e = Emitter::new();
        let expr = Expr::sequence(vec![Expr::literal("a"), Expr::literal("b")]);
        let out = e.emit(&expr, EmitContext::root()).unwrap();
        assert!(out.contains("__seq_ok"));
        assert!(out.contains("self.pos = pos_stack[0]"));
    }

    #[test]
    fn action_over_single_labeled_child_binds_directly() {
        let mut e = Emitter::new();
        let expr = Expr::action(Expr::labeled("x", Expr::literal("a")), "Some(x)");
        let out = e.emit(&expr, EmitContext::root()).unwrap();
        assert!(out.contains("let x = result[0].clone().unwrap();"));
    }

    #[test]
    fn action_over_sequence_binds_positionally() {
        let mut e = Emitter::new();
        let expr = Expr::action(
            Expr::sequence(vec![
                Expr::labeled("a", Expr::literal("x")),
                Expr::literal("y"),
                Expr::labeled("b", Expr::literal("z")),
            ]),
            "Some(a)",
        );
        let out = e.emit(&expr, EmitContext::root()).unwrap();
        assert!(out.contains("items[0].clone()"));
        assert!(out.contains("items[2].clone()"));
        assert!(!out.contains("items[1].clone()"));
    }

    #[test]
    fn class_predicate_combines_chars_and_ranges() {
        let parts = vec![ClassPart::Char('_'), ClassPart::Range('a', 'z')];
        let pred = class_predicate(&parts, false);
        assert!(pred.contains("ch == '_'"));
        assert!(pred.contains("('a'..='z').contains(&ch)"));
    }

    #[test]
    fn inverted_class_negates_the_predicate() {
        let parts = vec![ClassPart::Char('x')];
        let pred = class_predicate(&parts, true);
        assert!(pred.starts_with("!("));
    }

    #[test]
    fn class_predicate_escapes_a_literal_single_quote() {
        let parts = vec![ClassPart::Char('\'')];
        let pred = class_predicate(&parts, false);
        assert!(pred.contains("ch == '\\''"));
    }

    #[test]
    fn class_predicate_escapes_non_ascii_chars_with_a_braced_unicode_literal() {
        let parts = vec![ClassPart::Char('\u{e9}')];
        let pred = class_predicate(&parts, false);
        assert!(pred.contains("ch == '\\u{E9}'"));
    }
}
