//! Comment and literal stripping.

use crate::core::Language;

/// Lexical conventions that decide what counts as a comment or a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexicalRules {
    pub line_comments: &'static [&'static str],
    pub block_comment: Option<(&'static str, &'static str)>,
    /// Rust and Swift allow `/* /* */ */`.
    pub nested_block_comments: bool,
    /// `"""` (and `'''` when single quotes are strings) open multi-line literals.
    pub triple_quotes: bool,
    /// `'...'` is a string rather than a char literal.
    pub single_quote_strings: bool,
    /// Backtick template strings (JS/TS) or raw strings (Go).
    pub backtick_strings: bool,
    /// `'a` may be a lifetime or label rather than a char literal.
    pub lifetimes: bool,
    /// Lines starting with `#` are preprocessor directives.
    pub preprocessor: bool,
}

const SLASH_COMMENTS: &[&str] = &["//"];

pub fn lexical_rules(language: Language) -> LexicalRules {
    let c_family = LexicalRules {
        line_comments: SLASH_COMMENTS,
        block_comment: Some(("/*", "*/")),
        nested_block_comments: false,
        triple_quotes: false,
        single_quote_strings: false,
        backtick_strings: false,
        lifetimes: false,
        preprocessor: false,
    };

    match language {
        Language::Python => LexicalRules {
            line_comments: &["#"],
            block_comment: None,
            triple_quotes: true,
            single_quote_strings: true,
            ..c_family
        },
        Language::JavaScript | Language::TypeScript => LexicalRules {
            single_quote_strings: true,
            backtick_strings: true,
            ..c_family
        },
        Language::Java => LexicalRules {
            triple_quotes: true,
            ..c_family
        },
        Language::Cpp => LexicalRules {
            preprocessor: true,
            ..c_family
        },
        Language::Rust => LexicalRules {
            nested_block_comments: true,
            lifetimes: true,
            ..c_family
        },
        Language::Go => LexicalRules {
            backtick_strings: true,
            ..c_family
        },
        Language::Swift => LexicalRules {
            nested_block_comments: true,
            triple_quotes: true,
            ..c_family
        },
    }
}

/// Cleaned text plus how much was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stripped {
    /// Source with comments replaced by whitespace and every literal replaced
    /// by an empty `""`.
    pub text: String,
    pub comments: usize,
    pub literals: usize,
}

pub fn strip(source: &str, rules: &LexicalRules) -> Stripped {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut comments = 0;
    let mut literals = 0;
    let mut at_line_start = true;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if rules.preprocessor && at_line_start && c == '#' {
            i = skip_to_newline(&chars, i);
            comments += 1;
            continue;
        }

        if let Some(marker) = rules
            .line_comments
            .iter()
            .find(|m| starts_with(&chars, i, m))
        {
            i = skip_to_newline(&chars, i + marker.len());
            comments += 1;
            continue;
        }

        if let Some((open, close)) = rules.block_comment {
            if starts_with(&chars, i, open) {
                i = skip_block_comment(&chars, i, open, close, rules.nested_block_comments, &mut out);
                out.push(' ');
                comments += 1;
                continue;
            }
        }

        if let Some(end) = literal_end(&chars, i, rules) {
            out.push_str("\"\"");
            literals += 1;
            i = end;
            at_line_start = false;
            continue;
        }

        if c == '\n' {
            at_line_start = true;
        } else if !c.is_whitespace() {
            at_line_start = false;
        }
        out.push(c);
        i += 1;
    }

    Stripped {
        text: out,
        comments,
        literals,
    }
}

fn starts_with(chars: &[char], at: usize, marker: &str) -> bool {
    let mut idx = at;
    for m in marker.chars() {
        if chars.get(idx) != Some(&m) {
            return false;
        }
        idx += 1;
    }
    true
}

fn skip_to_newline(chars: &[char], from: usize) -> usize {
    chars[from..]
        .iter()
        .position(|&c| c == '\n')
        .map(|p| from + p)
        .unwrap_or(chars.len())
}

/// Skips a block comment, keeping its newlines so line structure survives.
/// An unterminated comment runs to end-of-input.
fn skip_block_comment(
    chars: &[char],
    start: usize,
    open: &str,
    close: &str,
    nested: bool,
    out: &mut String,
) -> usize {
    let mut depth = 1;
    let mut i = start + open.chars().count();
    while i < chars.len() {
        if nested && starts_with(chars, i, open) {
            depth += 1;
            i += open.chars().count();
        } else if starts_with(chars, i, close) {
            depth -= 1;
            i += close.chars().count();
            if depth == 0 {
                return i;
            }
        } else {
            if chars[i] == '\n' {
                out.push('\n');
            }
            i += 1;
        }
    }
    chars.len()
}

/// If a literal starts at `i`, returns the index just past it.
fn literal_end(chars: &[char], i: usize, rules: &LexicalRules) -> Option<usize> {
    let c = chars[i];
    match c {
        '"' | '\'' if rules.triple_quotes && triple_at(chars, i, c, rules) => {
            let delim: String = std::iter::repeat_n(c, 3).collect();
            let body = i + 3;
            Some(find_closing(chars, body, &delim).unwrap_or(chars.len()))
        }
        '"' => Some(quoted_end(chars, i, '"')),
        '\'' if rules.single_quote_strings => Some(quoted_end(chars, i, '\'')),
        '\'' => char_literal_end(chars, i, rules.lifetimes),
        '`' if rules.backtick_strings => {
            Some(find_closing(chars, i + 1, "`").unwrap_or(chars.len()))
        }
        _ => None,
    }
}

fn triple_at(chars: &[char], i: usize, quote: char, rules: &LexicalRules) -> bool {
    if quote == '\'' && !rules.single_quote_strings {
        return false;
    }
    chars.get(i + 1) == Some(&quote) && chars.get(i + 2) == Some(&quote)
}

/// Finds `delim` honouring backslash escapes, returning the index past it.
fn find_closing(chars: &[char], from: usize, delim: &str) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        if chars[i] == '\\' {
            i += 2;
            continue;
        }
        if starts_with(chars, i, delim) {
            return Some(i + delim.chars().count());
        }
        i += 1;
    }
    None
}

/// Single-line quoted literal; an unterminated one stops at the newline.
fn quoted_end(chars: &[char], start: usize, quote: char) -> usize {
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '\n' => return i,
            c if c == quote => return i + 1,
            _ => i += 1,
        }
    }
    chars.len()
}

/// Char literals are short; anything else starting with `'` (Rust lifetimes,
/// loop labels, stray quotes) is left in place.
fn char_literal_end(chars: &[char], start: usize, lifetimes: bool) -> Option<usize> {
    match (chars.get(start + 1), chars.get(start + 2)) {
        (Some('\\'), _) => {
            let close = chars[start + 2..]
                .iter()
                .take(10)
                .position(|&c| c == '\'')?;
            Some(start + 2 + close + 1)
        }
        (Some(_), Some('\'')) => Some(start + 3),
        _ if lifetimes => None,
        _ => {
            let close = chars[start + 1..]
                .iter()
                .take(6)
                .position(|&c| c == '\'' || c == '\n')?;
            (chars[start + 1 + close] == '\'').then_some(start + 1 + close + 1)
        }
    }
}
