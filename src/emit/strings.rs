//! Character-escaping and string-quoting helpers.
//!
//! These back two distinct things that happen to share one algorithm:
//! the compiler calls `quote` directly whenever it needs to splice a
//! literal value into generated Rust source (e.g. a grammar literal's
//! matched text); and the `string` template filter (`template::interpolate`)
//! calls the same function. The *emitted* parser needs the same quoting
//! logic available at its own runtime (to report quoted literals in error
//! messages) — that copy is generated text, not a call into this module;
//! see `emit::runtime::HELPERS_SOURCE`, which is a hand-written Rust
//! transliteration of the same rules.

/// Left-pad `s` with `pad` up to `width` characters.
pub fn pad_left(s: &str, pad: char, width: usize) -> String {
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

// Rust's `\xHH` byte escape is only legal in a non-byte string/char literal
// for values <= 0x7F; anything past that needs the braced `\u{...}` form
// (no fixed width — Rust accepts 1 to 6 hex digits). There's no `\f` escape
// in Rust at all, so form feed falls through to the generic branch below
// and comes out as `\x0C` like any other sub-0x20 control character.
fn escape_char(c: char) -> String {
    match c {
        '\\' => "\\\\".to_string(),
        '"' => "\\\"".to_string(),
        '\r' => "\\r".to_string(),
        '\n' => "\\n".to_string(),
        '\t' => "\\t".to_string(),
        c if (c as u32) < 0x20 || (c as u32) > 0x7E => {
            let code = c as u32;
            if code <= 0x7F {
                format!("\\x{}", pad_left(&format!("{code:X}"), '0', 2))
            } else {
                format!("\\u{{{code:X}}}")
            }
        }
        c => c.to_string(),
    }
}

/// Produce a double-quoted Rust string literal for `s`, escaping `\`, `"`,
/// CR, LF and TAB with their two-character forms, and any other character
/// outside `[0x20, 0x7F)` as `\xHH` (code point <= 0x7F) or the braced
/// `\u{HH...}` form required for anything higher — both are valid Rust
/// string-literal syntax, since this is spliced directly into generated
/// source, not just displayed.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        out.push_str(&escape_char(c));
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("5", 2, "05")]
    #[case("abc", 2, "abc")]
    #[case("", 3, "000")]
    fn pad_left_pads_on_the_left(#[case] s: &str, #[case] width: usize, #[case] expected: &str) {
        assert_eq!(pad_left(s, '0', width), expected);
    }

    #[test]
    fn quote_escapes_backslash_and_quote() {
        assert_eq!(quote("a\\b\"c"), "\"a\\\\b\\\"c\"");
    }

    #[test]
    fn quote_uses_two_char_escapes_for_common_control_chars() {
        assert_eq!(quote("\r\n\t"), "\"\\r\\n\\t\"");
    }

    #[test]
    fn form_feed_falls_back_to_a_hex_escape_since_rust_has_no_two_char_form() {
        assert_eq!(quote("\x0C"), "\"\\x0C\"");
    }

    #[test]
    fn quote_uses_hex_escapes_outside_printable_ascii() {
        assert_eq!(quote("\u{01}"), "\"\\x01\"");
        assert_eq!(quote("\u{7F}"), "\"\\x7F\"");
    }

    #[test]
    fn quote_uses_braced_unicode_escapes_past_ascii() {
        // unbraced `\uHHHH` (the historical reference's format) is not
        // valid Rust syntax; this must come out as `\u{1234}`.
        assert_eq!(quote("\u{1234}"), "\"\\u{1234}\"");
        assert_eq!(quote("\u{E9}"), "\"\\u{E9}\"");
    }

    #[test]
    fn quote_leaves_printable_ascii_untouched() {
        assert_eq!(quote("hello, world!"), "\"hello, world!\"");
    }

    #[test]
    fn quote_round_trips_every_byte_value() {
        for byte in 0u32..256 {
            if let Some(c) = char::from_u32(byte) {
                let quoted = quote(&c.to_string());
                // every escape starts and ends with the outer quotes and
                // contains no raw control character of its own
                assert!(quoted.starts_with('"') && quoted.ends_with('"'));
            }
        }
    }
}
