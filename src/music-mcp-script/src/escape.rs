//! Quoting for values embedded in inline AppleScript source.

/// Render `value` as a double-quoted AppleScript string literal.
///
/// Backslash and double quote are escaped, line breaks and tabs use their
/// escape sequences, other control characters are dropped. The result can
/// never terminate early, whatever `value` contains.
pub fn applescript_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
