//! LaTeX escaping for untrusted cell and header text.

/// Escape LaTeX special characters so `text` prints literally.
///
/// Works one character at a time, so the braces of an inserted
/// `\textbackslash{}` are never escaped again.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reserved_characters() {
        assert_eq!(escape_latex("a_b"), "a\\_b");
        assert_eq!(escape_latex("50% & more"), "50\\% \\& more");
        assert_eq!(escape_latex("#1 {x} $y$"), "\\#1 \\{x\\} \\$y\\$");
        assert_eq!(escape_latex("~^"), "\\textasciitilde{}\\textasciicircum{}");
    }

    #[test]
    fn test_escape_backslash_keeps_its_braces() {
        assert_eq!(escape_latex("a\\b"), "a\\textbackslash{}b");
        assert_eq!(escape_latex("\\{"), "\\textbackslash{}\\{");
    }

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape_latex("GPT-4 (base)"), "GPT-4 (base)");
        assert_eq!(escape_latex(""), "");
    }
}
