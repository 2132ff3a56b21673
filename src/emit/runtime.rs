//! The grammar-level scaffold: everything in a generated parser that isn't a
//! rule body. `compile::compile` splices rule methods (`emit::rule::emit_rule`)
//! into the `impl Parser` block this module builds around them.
//!
//! Three things live here: the `PegValue`/`SyntaxError` types the rule
//! bodies and actions are written against, the `Parser` struct with its
//! memoization cache and rightmost-failure tracking, and — unless the
//! grammar being compiled is the self-parsing bootstrap grammar — a textual
//! copy of the character-quoting helper from `emit::strings`, since the
//! generated parser is a standalone source file with no dependency on this
//! crate.

/// Rust source for the quoting helper the generated parser needs at its own
/// runtime (to describe the token it found at the point of failure). This
/// is a hand-written transliteration of `emit::strings`, not a call into
/// it — the two copies are verified to agree on every codepoint by
/// `emit::strings`'s own round-trip test, not by sharing code, because the
/// generated source can't depend on this crate.
pub const HELPERS_SOURCE: &str = r#"fn runtime_pad_left(s: &str, pad: char, width: usize) -> String {
    let current = s.chars().count();
    if current >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(width);
    for _ in 0..(width - current) {
        out.push(pad);
    }
    out.push_str(s);
    out
}

fn runtime_escape_char(c: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '"' => "\\\"".to_string(),
        '\r' => "\\r".to_string(),
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        c if (c as u32) < 0x20 || (c as u32) > 0x7E => {
            let code = c as u32;
            if code <= 0x7F {
                format!("\\x{}", runtime_pad_left(&format!("{code:X}"), '0', 2))
            } else {
                format!("\\u{{{code:X}}}")
            }
        }
        c => c.to_string(),
    }
}

fn runtime_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        out.push_str(&runtime_escape_char(c));
    }
    out.push('"');
    out
}"#;

/// Import used instead of `HELPERS_SOURCE` when `CompileOptions::self_parsing`
/// is set: the generated parser is being linked straight back into this
/// crate (the bootstrap case), so it can call the real implementation.
pub const SELF_PARSING_IMPORT: &str = "use packrat::emit::strings::quote as runtime_quote;";

/// `PegValue`, `SyntaxError` and the `Parser` struct's fixed machinery:
/// memoization, rightmost-failure bookkeeping, line/column computation and
/// message synthesis. `rule_count` sizes nothing here — each rule method
/// allocates its own `result`/`pos_stack` arrays — but it's threaded through
/// so the memo key space and any future per-rule bookkeeping stay obviously
/// bounded.
pub fn scaffold_prelude(self_parsing: bool) -> String {
    let helpers = if self_parsing {
        SELF_PARSING_IMPORT.to_string()
    } else {
        HELPERS_SOURCE.to_string()
    };

    format!(
        r#"{helpers}

#[derive(Debug, Clone)]
pub enum PegValue {{
    Str(String),
    Char(char),
    List(Vec<PegValue>),
}}

#[derive(Debug, Clone)]
pub struct SyntaxError {{
    pub name: String,
    pub message: String,
    pub line: usize,
    pub column: usize,
}}

impl std::fmt::Display for SyntaxError {{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {{
        write!(f, "{{}} (line {{}}, column {{}}): {{}}", self.name, self.line, self.column, self.message)
    }}
}}

impl std::error::Error for SyntaxError {{}}

#[derive(Debug, Clone)]
struct MemoEntry {{
    pos_after: usize,
    result: Option<PegValue>,
}}

pub struct Parser<'a> {{
    input: &'a str,
    pos: usize,
    report_failures: i32,
    rightmost_failures_pos: usize,
    rightmost_failures_expected: Vec<String>,
    memo: std::collections::HashMap<(&'static str, usize), MemoEntry>,
}}

impl<'a> Parser<'a> {{
    fn new(input: &'a str) -> Self {{
        Parser {{
            input,
            pos: 0,
            report_failures: 0,
            rightmost_failures_pos: 0,
            rightmost_failures_expected: Vec::new(),
            memo: std::collections::HashMap::new(),
        }}
    }}

    fn match_failed(&mut self, expected: &str) {{
        if self.report_failures > 0 {{
            return;
        }}
        if self.pos < self.rightmost_failures_pos {{
            return;
        }}
        if self.pos > self.rightmost_failures_pos {{
            self.rightmost_failures_pos = self.pos;
            self.rightmost_failures_expected.clear();
        }}
        self.rightmost_failures_expected.push(expected.to_string());
    }}

    fn memo_get(&self, rule: &'static str, pos: usize) -> Option<(usize, Option<PegValue>)> {{
        self.memo.get(&(rule, pos)).map(|e| (e.pos_after, e.result.clone()))
    }}

    fn memo_put(&mut self, rule: &'static str, pos: usize, pos_after: usize, result: Option<PegValue>) {{
        self.memo.insert((rule, pos), MemoEntry {{ pos_after, result }});
    }}

    // \n only starts a new line when it wasn't already accounted for by a
    // preceding \r (so CRLF counts as one line break); \r, U+2028 and
    // U+2029 each start a new line on their own.
    fn line_and_column(&self, offset: usize) -> (usize, usize) {{
        let mut line = 1usize;
        let mut column = 1usize;
        let mut seen_cr = false;
        for c in self.input[..offset.min(self.input.len())].chars() {{
            match c {{
                '\n' => {{
                    if !seen_cr {{
                        line += 1;
                        column = 1;
                    }}
                    seen_cr = false;
                }}
                '\r' | '\u{{2028}}' | '\u{{2029}}' => {{
                    line += 1;
                    column = 1;
                    seen_cr = true;
                }}
                _ => {{
                    column += 1;
                    seen_cr = false;
                }}
            }}
        }}
        (line, column)
    }}

    /// The joined noun phrase naming what was expected, with no leading
    /// "expected" — zero alternatives collapses to "end of input" rather
    /// than an empty phrase (this is what a clean parse with leftover input
    /// reports, since the entry point records that expectation itself).
    fn describe_expected(&self) -> String {{
        let mut expected = self.rightmost_failures_expected.clone();
        expected.sort();
        expected.dedup();
        match expected.len() {{
            0 => "end of input".to_string(),
            1 => expected[0].clone(),
            2 => format!("{{}} or {{}}", expected[0], expected[1]),
            _ => {{
                let (last, rest) = expected.split_last().expect("len > 2");
                format!("{{}} or {{}}", rest.join(", "), last)
            }}
        }}
    }}

    fn describe_found(&self, offset: usize) -> String {{
        match self.input[offset.min(self.input.len())..].chars().next() {{
            Some(c) => runtime_quote(&c.to_string()),
            None => "end of input".to_string(),
        }}
    }}

    fn syntax_error_at_rightmost_failure(&self) -> SyntaxError {{
        let (line, column) = self.line_and_column(self.rightmost_failures_pos);
        SyntaxError {{
            name: "SyntaxError".to_string(),
            message: format!(
                "expected {{}} but {{}} found.",
                self.describe_expected(),
                self.describe_found(self.rightmost_failures_pos)
            ),
            line,
            column,
        }}
    }}
}}
"#
    )
}
