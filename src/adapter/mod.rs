//! Per-language lexical normalization.
//!
//! `tokenize` turns raw source text into a [`TokenStream`] of canonical
//! structural tokens. The work happens in three passes:
//!
//! 1. [`strip`] removes comments and string/char literals using the
//!    language's [`LexicalRules`], so keywords inside them never produce
//!    features.
//! 2. [`lexer`] splits the cleaned text into identifiers, numbers,
//!    punctuation and line-start markers (indentation is kept for Python).
//! 3. [`scanner`] walks the lexemes once, tracking block delimiters for the
//!    language, and emits loop/function/call/branch/data-structure tokens.
//!
//! Malformed input never fails here: unmatched blocks are closed at
//! end-of-input. The only error is [`AnalysisError::EmptyInput`].

pub mod keywords;
pub(crate) mod lexer;
pub(crate) mod scanner;
pub mod strip;

use crate::core::Language;
use crate::errors::AnalysisError;
use serde::Serialize;

pub use keywords::{keyword_table, KeywordTable};
pub use strip::{lexical_rules, LexicalRules};

/// Shape of a loop construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LoopKind {
    /// for-each, for-in, for-of, range loops, iterator combinators and
    /// comprehensions: the trip count is fixed by the collection.
    Iteration,
    /// C-style three-clause `for`.
    Counted,
    /// `while`, `do/while`, `loop`, `repeat`, clause-less Go `for`.
    Conditional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BranchKind {
    If,
    Else,
    Switch,
    Match,
    Guard,
}

/// Families of data structures tallied by the feature extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StructureKind {
    HashMap,
    Set,
    Stack,
    Queue,
    /// Sorted or balanced structures: tree maps, heaps, priority queues.
    Sorted,
    Array,
}

impl StructureKind {
    pub fn is_hashed(self) -> bool {
        matches!(self, StructureKind::HashMap | StructureKind::Set)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StructureOp {
    Construct,
    /// Keyed lookup (`get`, `has`, `containsKey`, ...).
    Lookup,
    Insert,
    Remove,
    /// Linear search (`indexOf`, `includes`, ...).
    Search,
    /// Membership test whose cost depends on the receiver (`in`,
    /// `contains`, `count`, `find`); resolved by the feature extractor.
    Membership,
    /// Indexing into a table named like a cache (`memo[n]`, `dp[i][j]`).
    TableAccess,
}

/// Canonical structural token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Token {
    /// `name` is `None` for anonymous functions and unnamed closures.
    FunctionOpen { name: Option<String> },
    FunctionClose,
    LoopOpen(LoopKind),
    LoopClose,
    /// A value halved or doubled (`/ 2`, `>> 1`, `*= 2`). `in_header` is set
    /// when it appears inside a loop header.
    Halving { in_header: bool },
    /// Unit increment or decrement of a named variable.
    Step { var: String, delta: i8 },
    Call { name: String },
    SortCall,
    RecursiveCall { name: String, tail: bool },
    Branch(BranchKind),
    Equality,
    Structure {
        kind: Option<StructureKind>,
        op: StructureOp,
        dims: u8,
    },
    /// Caching decorator such as `@lru_cache` or `@cache`.
    MemoDecorator,
}

/// Ordered canonical tokens for one source unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub stripped_comments: usize,
    pub stripped_literals: usize,
    /// Blocks still open at end-of-input, closed implicitly.
    pub unclosed_blocks: usize,
}

impl TokenStream {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Normalize `text` into canonical tokens using `language`'s lexical rules.
pub fn tokenize(text: &str, language: Language) -> Result<TokenStream, AnalysisError> {
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let stripped = strip::strip(text, &lexical_rules(language));
    let lexemes = lexer::lex(&stripped.text, language);
    let scanned = scanner::scan(&lexemes, language);

    if scanned.unclosed_blocks > 0 {
        tracing::warn!(
            language = %language,
            unclosed = scanned.unclosed_blocks,
            "unbalanced block delimiters closed at end of input"
        );
    }
    tracing::debug!(
        language = %language,
        tokens = scanned.tokens.len(),
        comments = stripped.comments,
        literals = stripped.literals,
        "tokenized source"
    );

    Ok(TokenStream {
        tokens: scanned.tokens,
        stripped_comments: stripped.comments,
        stripped_literals: stripped.literals,
        unclosed_blocks: scanned.unclosed_blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn loop_opens(stream: &TokenStream) -> usize {
        stream
            .iter()
            .filter(|t| matches!(t, Token::LoopOpen(_)))
            .count()
    }

    #[test]
    fn test_blank_input_is_rejected() {
        assert_eq!(
            tokenize("   \n\t ", Language::Python),
            Err(AnalysisError::EmptyInput)
        );
    }

    #[test]
    fn test_keywords_inside_comments_and_strings_are_ignored() {
        let source = indoc! {r#"
            def f(items):
                # for x in items: while True
                label = "for i in range(10)"
                """
                while True:
                    pass
                """
                return len(items)
        "#};
        let stream = tokenize(source, Language::Python).unwrap();
        assert_eq!(loop_opens(&stream), 0);
        assert_eq!(stream.stripped_comments, 1);
        assert_eq!(stream.stripped_literals, 2);
    }

    #[test]
    fn test_every_loop_open_has_a_close() {
        let source = "function f(a) { for (let i = 0; i < a.length; i++) { while (x) { x--; } }";
        let stream = tokenize(source, Language::JavaScript).unwrap();
        let opens = loop_opens(&stream);
        let closes = stream
            .iter()
            .filter(|t| matches!(t, Token::LoopClose))
            .count();
        assert_eq!(opens, 2);
        assert_eq!(opens, closes);
        assert_eq!(stream.unclosed_blocks, 1);
    }
}
