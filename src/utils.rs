//! Escaping helpers for rendering character codes.

/// Escape a single character code for display.
///
/// ```text
/// '\n' -> \n     0x07 -> \x07     0x3A3 -> Σ
/// ```
pub fn escape_char(code: u32) -> String {
    match code {
        0x0A => "\\n".to_string(),
        0x09 => "\\t".to_string(),
        0x0D => "\\r".to_string(),
        0x0C => "\\f".to_string(),
        0x0B => "\\v".to_string(),
        0x00 => "\\0".to_string(),
        0x20..=0x7E => (code as u8 as char).to_string(),
        0..=0xFF => format!("\\x{:02X}", code),
        _ => format!("\\u{:04X}", code),
    }
}

/// Escape a character code appearing inside a bracketed class.
pub fn escape_class_char(code: u32) -> String {
    match char::from_u32(code) {
        Some(c @ ('\\' | ']' | '[' | '^' | '-')) => format!("\\{}", c),
        _ => escape_char(code),
    }
}

/// Escape a string for use inside a double-quoted DOT label.
pub fn escape_dot_label(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => res.push_str("\\\""),
            '\\' => res.push_str("\\\\"),
            _ => res.push(c),
        }
    }
    res
}
