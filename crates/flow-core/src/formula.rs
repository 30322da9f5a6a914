//! Recognition of math formulas embedded in node text.
//!
//! Only detection lives here; typesetting belongs to the renderer.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaMode {
    Inline,
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Formula<'a> {
    pub mode: FormulaMode,
    /// Trimmed expression between the delimiters.
    pub expr: &'a str,
}

/// Recognize text whose whole (trimmed) content is a delimited formula:
/// `$$…$$`, `\[…\]` (display), `$…$`, `\(…\)`, or a `tex:` prefix
/// (inline). Empty expressions are not formulas.
pub fn detect(text: &str) -> Option<Formula<'_>> {
    let t = text.trim();
    let (mode, inner) = if let Some(rest) = t.strip_prefix("tex:") {
        (FormulaMode::Inline, rest)
    } else if let Some(inner) = wrapped(t, "$$", "$$") {
        (FormulaMode::Display, inner)
    } else if let Some(inner) = wrapped(t, "\\[", "\\]") {
        (FormulaMode::Display, inner)
    } else if let Some(inner) = wrapped(t, "\\(", "\\)") {
        (FormulaMode::Inline, inner)
    } else if let Some(inner) = wrapped(t, "$", "$") {
        (FormulaMode::Inline, inner)
    } else {
        return None;
    };
    let expr = inner.trim();
    if expr.is_empty() {
        return None;
    }
    Some(Formula { mode, expr })
}

fn wrapped<'a>(t: &'a str, open: &str, close: &str) -> Option<&'a str> {
    if t.len() < open.len() + close.len() {
        return None;
    }
    t.strip_prefix(open)?.strip_suffix(close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_each_delimiter() {
        let cases = [
            ("$x^2$", FormulaMode::Inline, "x^2"),
            ("$$ \\frac{a}{b} $$", FormulaMode::Display, "\\frac{a}{b}"),
            ("\\(a+b\\)", FormulaMode::Inline, "a+b"),
            ("\\[ \\sum_i i \\]", FormulaMode::Display, "\\sum_i i"),
            ("tex: E=mc^2", FormulaMode::Inline, "E=mc^2"),
            ("  $y$  ", FormulaMode::Inline, "y"),
        ];
        for (text, mode, expr) in cases {
            assert_eq!(detect(text), Some(Formula { mode, expr }), "{text}");
        }
    }

    #[test]
    fn plain_text_and_empty_formulas_rejected() {
        assert_eq!(detect("Process order"), None);
        assert_eq!(detect("costs $5 and $6 more"), None);
        assert_eq!(detect("$$"), None);
        assert_eq!(detect("$ $"), None);
        assert_eq!(detect("tex:"), None);
        assert_eq!(detect("$"), None);
    }
}
