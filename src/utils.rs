/// Make a field value printable in a single table cell: ANSI color codes are
/// stripped, tabs become spaces up to the next multiple of 8, newlines show
/// as a literal `\n`, any other control character is dropped.
pub fn sanitize_text(orig: &str) -> String {
    let mut text = String::new();
    let mut width = 0;
    let mut in_ansi_escape = false;
    for c in orig.chars() {
        if in_ansi_escape {
            if c == 'm' {
                in_ansi_escape = false;
            }
        } else if c == '\t' {
            let spaces = 8 - width % 8;
            for _ in 0..spaces {
                text.push(' ');
            }
            width += spaces;
        } else if c == '\n' {
            text.push_str("\\n");
            width += 2;
        } else if c == 0o33 as char {
            in_ansi_escape = true;
        } else if c.is_control() {
            // includes \r
        } else {
            text.push(c);
            width += 1;
        }
    }
    text
}

/// Cut to `width` characters and pad with spaces to exactly `width`.
pub fn truncate_pad(text: &str, width: usize) -> String {
    let mut out: String = text.chars().take(width).collect();
    let used = out.chars().count();
    for _ in used..width {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_ansi_codes() {
        assert_eq!(sanitize_text("\x1b[31mred\x1b[0m text"), "red text");
    }

    #[test]
    fn test_sanitize_expands_tabs_to_eight() {
        assert_eq!(sanitize_text("ab\tc"), "ab      c");
        assert_eq!(sanitize_text("\tc"), "        c");
    }

    #[test]
    fn test_sanitize_escapes_newlines_and_drops_controls() {
        assert_eq!(sanitize_text("one\ntwo\r"), "one\\ntwo");
        assert_eq!(sanitize_text("a\x07b"), "ab");
    }

    #[test]
    fn test_truncate_pad_is_exact_width() {
        assert_eq!(truncate_pad("hello", 3), "hel");
        assert_eq!(truncate_pad("hi", 4), "hi  ");
        assert_eq!(truncate_pad("", 2), "  ");
        // counts characters, not bytes
        assert_eq!(truncate_pad("añejo", 4), "añej");
    }
}
