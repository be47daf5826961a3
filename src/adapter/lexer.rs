//! Splits stripped source into lexemes.

use crate::core::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Lexeme {
    Ident(String),
    Number(String),
    Punct(String),
    /// A literal already emptied by the stripper.
    Str,
    /// First lexeme of a non-blank line, with its indentation width.
    LineStart(usize),
}

impl Lexeme {
    pub(crate) fn is_punct(&self, p: &str) -> bool {
        matches!(self, Lexeme::Punct(s) if s == p)
    }

    pub(crate) fn is_ident(&self, name: &str) -> bool {
        matches!(self, Lexeme::Ident(s) if s == name)
    }

    pub(crate) fn ident(&self) -> Option<&str> {
        match self {
            Lexeme::Ident(s) => Some(s),
            _ => None,
        }
    }
}

/// Longest operators first so that maximal munch picks them.
const OPERATORS: &[&str] = &[
    ">>>=", "...", ">>>", "<<=", ">>=", "//=", "===", "!==", "**=", "==", "!=", "<=", ">=", "&&",
    "||", "++", "--", "+=", "-=", "*=", "/=", "%=", "->", "=>", "::", ":=", "<<", ">>", "//",
    "**", "?.", "??",
];

const TAB_WIDTH: usize = 4;

pub(crate) fn lex(text: &str, language: Language) -> Vec<Lexeme> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len() / 3);
    let mut i = 0;
    let mut line_start = true;
    let mut indent = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '\n' {
            line_start = true;
            indent = 0;
            i += 1;
            continue;
        }

        // Explicit line continuation keeps the logical line going.
        if c == '\\' && chars.get(i + 1) == Some(&'\n') {
            i += 2;
            continue;
        }

        if c.is_whitespace() {
            if line_start {
                indent += if c == '\t' { TAB_WIDTH } else { 1 };
            }
            i += 1;
            continue;
        }

        if line_start {
            out.push(Lexeme::LineStart(indent));
            line_start = false;
        }

        if c == '"' && chars.get(i + 1) == Some(&'"') {
            out.push(Lexeme::Str);
            i += 2;
            continue;
        }

        if is_ident_start(c) {
            let start = i;
            while i < chars.len() && is_ident_continue(chars[i]) {
                i += 1;
            }
            out.push(Lexeme::Ident(chars[start..i].iter().collect()));
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            // Fractional part, but not a range like `0..n`.
            if chars.get(i) == Some(&'.') && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit())
            {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_alphanumeric() {
                    i += 1;
                }
            }
            out.push(Lexeme::Number(chars[start..i].iter().collect()));
            continue;
        }

        let op = OPERATORS
            .iter()
            .find(|op| op.chars().enumerate().all(|(k, o)| chars.get(i + k) == Some(&o)));
        match op {
            // `//` is floor division only in Python; elsewhere the stripper
            // already removed comments, so split it defensively.
            Some(&"//") | Some(&"//=") if language != Language::Python => {
                out.push(Lexeme::Punct("/".to_string()));
                i += 1;
            }
            Some(op) => {
                out.push(Lexeme::Punct((*op).to_string()));
                i += op.len();
            }
            None => {
                out.push(Lexeme::Punct(c.to_string()));
                i += 1;
            }
        }
    }

    out
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c == '$' || c.is_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_numeric()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn punct(s: &str) -> Lexeme {
        Lexeme::Punct(s.to_string())
    }

    fn ident(s: &str) -> Lexeme {
        Lexeme::Ident(s.to_string())
    }

    #[test]
    fn test_line_starts_carry_indentation() {
        let lexemes = lex("def f():\n\n    return 1\n", Language::Python);
        assert_eq!(
            lexemes,
            vec![
                Lexeme::LineStart(0),
                ident("def"),
                ident("f"),
                punct("("),
                punct(")"),
                punct(":"),
                Lexeme::LineStart(4),
                ident("return"),
                Lexeme::Number("1".into()),
            ]
        );
    }

    #[test]
    fn test_maximal_munch_operators() {
        let lexemes = lex("a >>>= 1; b //= 2", Language::JavaScript);
        assert!(lexemes.contains(&punct(">>>=")));
        let py = lex("b //= 2", Language::Python);
        assert!(py.contains(&punct("//=")));
    }

    #[test]
    fn test_ranges_are_not_fractions() {
        let lexemes = lex("0..n", Language::Rust);
        assert_eq!(lexemes[1], Lexeme::Number("0".into()));
        assert_eq!(lexemes[2], punct("."));
    }

    #[test]
    fn test_tabs_count_as_four_columns() {
        let lexemes = lex("\tx", Language::Python);
        assert_eq!(lexemes[0], Lexeme::LineStart(4));
    }

    #[test]
    fn test_emptied_literals_become_str() {
        let lexemes = lex("x = \"\"", Language::Go);
        assert_eq!(lexemes.last(), Some(&Lexeme::Str));
    }
}
