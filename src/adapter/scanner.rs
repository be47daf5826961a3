//! Structural scanner: one pass over lexemes with bounded lookahead.
//!
//! Loops and functions live on a frame stack. Each frame records what closes
//! it: the matching `}`, a dedent, the end of the bracket group it opened in,
//! or the end of a brace-less statement. Whatever is still open at
//! end-of-input is closed there.

use super::keywords::{self, ForStyle, KeywordTable};
use super::lexer::Lexeme;
use super::{BranchKind, LoopKind, StructureKind, StructureOp, Token};
use crate::core::Language;

/// Bound on every lookahead/lookback.
const LOOKAHEAD: usize = 512;

/// Associated functions that build a collection (`Vec::new`, `Array.from`).
const CONSTRUCTORS: &[&str] = &[
    "new",
    "with_capacity",
    "from",
    "from_iter",
    "default",
    "of",
    "fromkeys",
];

pub(crate) struct Scanned {
    pub tokens: Vec<Token>,
    pub unclosed_blocks: usize,
}

pub(crate) fn scan(lexemes: &[Lexeme], language: Language) -> Scanned {
    Scanner::new(lexemes, language).run()
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FrameKind {
    Loop {
        do_loop: bool,
    },
    Function {
        name: Option<String>,
        /// Go method receiver, so `s.walk(..)` inside `walk` is recursive.
        receiver: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closer {
    /// The `}` that returns the brace level to this value.
    Brace(usize),
    /// A line indented at most this far.
    Indent(usize),
    /// Bracket depth dropping below this value.
    Paren(usize),
    /// Brace-less body, ending at `;` on its own level.
    Statement {
        brace_level: usize,
        paren_depth: usize,
    },
    /// Expression-bodied arrow function.
    Expression {
        brace_level: usize,
        paren_depth: usize,
    },
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    closer: Closer,
}

/// Header seen, body not yet opened.
#[derive(Debug)]
struct Pending {
    kind: FrameKind,
    header_end: usize,
    indent: usize,
}

struct Scanner<'a> {
    lx: &'a [Lexeme],
    language: Language,
    table: KeywordTable,
    pos: usize,
    frames: Vec<Frame>,
    pending: Vec<Pending>,
    brace_level: usize,
    paren_depth: usize,
    line_indent: usize,
    expect_for_in: bool,
    swallow_while: bool,
    tokens: Vec<Token>,
}

fn is_open(p: &str) -> bool {
    matches!(p, "(" | "[" | "{")
}

fn is_close(p: &str) -> bool {
    matches!(p, ")" | "]" | "}")
}

/// Lexemes that can end an expression.
fn ends_value(lexeme: &Lexeme) -> bool {
    match lexeme {
        Lexeme::Ident(_) | Lexeme::Number(_) | Lexeme::Str => true,
        Lexeme::Punct(p) => matches!(p.as_str(), ")" | "]" | "}"),
        Lexeme::LineStart(_) => false,
    }
}

impl<'a> Scanner<'a> {
    fn new(lx: &'a [Lexeme], language: Language) -> Self {
        Self {
            lx,
            language,
            table: keywords::keyword_table(language),
            pos: 0,
            frames: Vec::new(),
            pending: Vec::new(),
            brace_level: 0,
            paren_depth: 0,
            line_indent: 0,
            expect_for_in: false,
            swallow_while: false,
            tokens: Vec::with_capacity(lx.len() / 4),
        }
    }

    fn run(mut self) -> Scanned {
        while self.pos < self.lx.len() {
            self.resolve_pending();
            let consumed = self.step();
            self.pos += consumed.max(1);
        }
        while let Some(pending) = self.pending.pop() {
            self.emit_close(&pending.kind);
        }
        while let Some(frame) = self.frames.pop() {
            self.emit_close(&frame.kind);
        }
        Scanned {
            tokens: self.tokens,
            unclosed_blocks: self.brace_level + self.paren_depth,
        }
    }

    fn step(&mut self) -> usize {
        let lx = self.lx;
        match &lx[self.pos] {
            Lexeme::LineStart(indent) => {
                self.on_line_start(*indent);
                1
            }
            lexeme => {
                let swallow = std::mem::take(&mut self.swallow_while);
                match lexeme {
                    Lexeme::Punct(p) => self.on_punct(p),
                    Lexeme::Ident(name) => self.on_ident(name, swallow),
                    _ => 1,
                }
            }
        }
    }

    // ---- frames -------------------------------------------------------

    /// Opens the body of every pending header that ended before `pos`.
    fn resolve_pending(&mut self) {
        while self.pending.last().is_some_and(|p| p.header_end < self.pos) {
            let Some(pending) = self.pending.pop() else {
                break;
            };
            let closer = if self.language.is_indentation_significant() {
                Closer::Indent(pending.indent)
            } else if self
                .next_significant(self.pos)
                .is_some_and(|j| self.lx[j].is_punct("{"))
            {
                Closer::Brace(self.brace_level)
            } else {
                Closer::Statement {
                    brace_level: self.brace_level,
                    paren_depth: self.paren_depth,
                }
            };
            if matches!(pending.kind, FrameKind::Loop { .. }) {
                self.expect_for_in = false;
            }
            self.frames.push(Frame {
                kind: pending.kind,
                closer,
            });
        }
    }

    fn emit_close(&mut self, kind: &FrameKind) {
        self.tokens.push(match kind {
            FrameKind::Loop { .. } => Token::LoopClose,
            FrameKind::Function { .. } => Token::FunctionClose,
        });
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.frames.pop() {
            if frame.kind == (FrameKind::Loop { do_loop: true }) {
                self.swallow_while = true;
            }
            self.emit_close(&frame.kind);
        }
    }

    fn close_frames_while(&mut self, mut should_close: impl FnMut(&Closer) -> bool) {
        while self.frames.last().is_some_and(|f| should_close(&f.closer)) {
            self.pop_frame();
        }
    }

    fn close_brace(&mut self) {
        self.brace_level = self.brace_level.saturating_sub(1);
        let level = self.brace_level;
        self.close_frames_while(|closer| match *closer {
            Closer::Brace(open) => open >= level,
            Closer::Statement { brace_level, .. } | Closer::Expression { brace_level, .. } => {
                brace_level > level
            }
            Closer::Indent(_) | Closer::Paren(_) => false,
        });

        // A braced block that was the whole body of a brace-less statement
        // ends that statement too, unless the statement continues.
        let continues = self.next_significant(self.pos + 1).is_some_and(|j| {
            ["else", "catch", "finally"]
                .iter()
                .any(|k| self.lx[j].is_ident(k))
        });
        if !continues {
            self.close_statements(false);
        }
    }

    fn close_bracket(&mut self) {
        self.paren_depth = self.paren_depth.saturating_sub(1);
        let depth = self.paren_depth;
        self.close_frames_while(|closer| match *closer {
            Closer::Paren(open) => depth < open,
            Closer::Statement { paren_depth, .. } | Closer::Expression { paren_depth, .. } => {
                depth < paren_depth
            }
            Closer::Brace(_) | Closer::Indent(_) => false,
        });
    }

    fn close_statements(&mut self, include_expressions: bool) {
        let (level, depth) = (self.brace_level, self.paren_depth);
        self.close_frames_while(|closer| match *closer {
            Closer::Statement {
                brace_level,
                paren_depth,
            } => brace_level == level && paren_depth == depth,
            Closer::Expression {
                brace_level,
                paren_depth,
            } => include_expressions && brace_level == level && paren_depth == depth,
            _ => false,
        });
    }

    fn on_line_start(&mut self, indent: usize) {
        self.line_indent = indent;
        if self.language.is_indentation_significant() {
            if self.paren_depth == 0 {
                self.close_frames_while(|closer| matches!(*closer, Closer::Indent(level) if level >= indent));
            }
            return;
        }

        // Automatic semicolon insertion ends an expression-bodied arrow.
        let after_value = self
            .pos
            .checked_sub(1)
            .is_some_and(|k| ends_value(&self.lx[k]));
        let continued = matches!(self.lx.get(self.pos + 1), Some(Lexeme::Punct(p)) if p != "}");
        if after_value && !continued {
            let (level, depth) = (self.brace_level, self.paren_depth);
            self.close_frames_while(|closer| {
                matches!(*closer, Closer::Expression { brace_level, paren_depth }
                    if brace_level == level && paren_depth == depth)
            });
        }
    }

    // ---- punctuation --------------------------------------------------

    fn on_punct(&mut self, p: &str) -> usize {
        let python = self.language.is_indentation_significant();
        match p {
            "{" if python => self.paren_depth += 1,
            "{" => self.brace_level += 1,
            "}" if python => self.close_bracket(),
            "}" => self.close_brace(),
            "(" | "[" => self.paren_depth += 1,
            ")" | "]" => self.close_bracket(),
            ";" => self.close_statements(true),
            "==" | "===" => self.tokens.push(Token::Equality),
            "++" | "--" => self.prefix_step(p),
            "=>" if self.table.arrow_functions => return self.on_arrow(),
            "@" => self.on_decorator(),
            "=" | ":=" => self.on_assign(),
            _ => self.check_halving(p),
        }
        1
    }

    fn check_halving(&mut self, p: &str) {
        let Some(Lexeme::Number(n)) = self.lx.get(self.pos + 1) else {
            return;
        };
        let halves = match p {
            "/" | "//" => n.as_str() == "2",
            "/=" | "//=" => n.parse::<u32>().is_ok_and(|v| v >= 2),
            ">>" | ">>>" | ">>=" | ">>>=" | "<<=" => n.as_str() == "1",
            "*=" => n.as_str() == "2",
            _ => false,
        };
        if halves {
            let in_header = self.in_loop_header();
            self.tokens.push(Token::Halving { in_header });
        }
    }

    fn prefix_step(&mut self, op: &str) {
        let prefix = self
            .pos
            .checked_sub(1)
            .is_none_or(|k| !ends_value(&self.lx[k]));
        if let (true, Some(Lexeme::Ident(var))) = (prefix, self.lx.get(self.pos + 1)) {
            self.tokens.push(Token::Step {
                var: var.clone(),
                delta: if op == "++" { 1 } else { -1 },
            });
        }
    }

    fn on_decorator(&mut self) {
        let mut j = self.pos + 1;
        let mut last = None;
        while let Some(name) = self.lx.get(j).and_then(Lexeme::ident) {
            last = Some(name);
            if self.lx.get(j + 1).is_some_and(|l| l.is_punct(".")) {
                j += 2;
            } else {
                break;
            }
        }
        if last.is_some_and(|name| keywords::MEMO_DECORATORS.contains(&name)) {
            self.tokens.push(Token::MemoDecorator);
        }
    }

    /// Collection literals on the right of an assignment.
    fn on_assign(&mut self) {
        let Some(j) = self.next_significant(self.pos + 1) else {
            return;
        };
        if self.language == Language::Go {
            if let Some(dims) = self.slice_type_dims(j) {
                self.construct(StructureKind::Array, dims);
            }
            return;
        }
        if !self.table.literal_collections {
            return;
        }
        if self.lx[j].is_punct("[") {
            let kind = if self.has_top_level_colon(j) {
                StructureKind::HashMap
            } else {
                StructureKind::Array
            };
            let dims = self.region_dims(j + 1);
            self.construct(kind, dims);
        } else if self.lx[j].is_punct("{") && self.language != Language::Swift {
            let is_set = self.language.is_indentation_significant()
                && !self.has_top_level_colon(j)
                && !self.lx.get(j + 1).is_some_and(|l| l.is_punct("}"));
            let kind = if is_set {
                StructureKind::Set
            } else {
                StructureKind::HashMap
            };
            self.construct(kind, 1);
        }
    }

    fn on_arrow(&mut self) -> usize {
        let name = self
            .arrow_params_start()
            .and_then(|start| self.assigned_name(start));
        self.tokens.push(Token::FunctionOpen { name: name.clone() });
        let kind = FrameKind::Function {
            name,
            receiver: None,
        };
        if self
            .next_significant(self.pos + 1)
            .is_some_and(|j| self.lx[j].is_punct("{"))
        {
            self.pending.push(Pending {
                kind,
                header_end: self.pos,
                indent: self.line_indent,
            });
        } else {
            self.frames.push(Frame {
                kind,
                closer: Closer::Expression {
                    brace_level: self.brace_level,
                    paren_depth: self.paren_depth,
                },
            });
        }
        1
    }

    fn arrow_params_start(&self) -> Option<usize> {
        let k = self.prev_significant(self.pos)?;
        match &self.lx[k] {
            Lexeme::Punct(p) if p == ")" => self.matching_open(k),
            Lexeme::Ident(_) => {
                // `(a): T =>` carries a return type annotation.
                let close = self
                    .prev_significant(k)
                    .filter(|&c| self.lx[c].is_punct(":"))
                    .and_then(|c| self.prev_significant(c))
                    .filter(|&c| self.lx[c].is_punct(")"));
                match close {
                    Some(c) => self.matching_open(c),
                    None => Some(k),
                }
            }
            _ => None,
        }
    }

    // ---- identifiers --------------------------------------------------

    fn on_ident(&mut self, name: &str, swallow: bool) -> usize {
        let table = self.table;
        if name == "for" {
            return self.on_for();
        }
        if table.while_keywords.contains(&name) {
            if swallow {
                return 1;
            }
            return self.open_loop(false);
        }
        if table.do_keyword == Some(name) {
            self.tokens.push(Token::LoopOpen(LoopKind::Conditional));
            self.pending.push(Pending {
                kind: FrameKind::Loop { do_loop: true },
                header_end: self.pos,
                indent: self.line_indent,
            });
            return 1;
        }
        if table.function_keywords.contains(&name) {
            return self.on_function_keyword();
        }
        if table.branch_keywords.contains(&name) {
            self.on_branch(name);
            return 1;
        }
        if name == "in" && table.in_operator {
            if !std::mem::take(&mut self.expect_for_in) {
                self.structure_op(None, StructureOp::Membership);
            }
            return 1;
        }
        if name == "new" && table.reserved.contains(&"new") {
            return self.on_new();
        }
        if self.language == Language::Go && name == "make" {
            if let Some(dims) = self.slice_type_dims(self.pos + 2) {
                self.construct(StructureKind::Array, dims);
            }
            return 1;
        }
        if table.is_reserved(name) {
            return 1;
        }

        self.check_step(name);
        let lx = self.lx;
        match lx.get(self.pos + 1) {
            Some(Lexeme::Punct(p)) => match p.as_str() {
                "(" => return self.on_call(name),
                "[" => self.on_index(name),
                "<" => self.on_generic(name),
                "::" | "." => self.on_static_constructor(name),
                "!" if self.language == Language::Rust && name == "vec" => {
                    let dims = self.region_dims(self.pos + 1);
                    self.construct(StructureKind::Array, dims);
                }
                "{" if self.language == Language::Swift => self.on_trailing_closure(name),
                _ => {}
            },
            _ => {}
        }
        1
    }

    fn on_branch(&mut self, name: &str) {
        let kind = match name {
            "if" | "elif" => BranchKind::If,
            "else" => BranchKind::Else,
            "switch" => BranchKind::Switch,
            "match" => BranchKind::Match,
            "guard" => BranchKind::Guard,
            _ => return,
        };
        if kind == BranchKind::Match && self.language.is_indentation_significant() {
            // Soft keyword: only `match subject:` at the start of a line.
            let at_line_start = self
                .pos
                .checked_sub(1)
                .is_none_or(|k| matches!(self.lx[k], Lexeme::LineStart(_)));
            let used_as_name = matches!(self.lx.get(self.pos + 1), Some(Lexeme::Punct(p)) if matches!(p.as_str(), "=" | "(" | "."));
            if !at_line_start || used_as_name {
                return;
            }
        }
        self.tokens.push(Token::Branch(kind));
    }

    fn check_step(&mut self, name: &str) {
        let at = |k: usize| self.lx.get(self.pos + k);
        let is_one = |l: Option<&Lexeme>| matches!(l, Some(Lexeme::Number(n)) if n.as_str() == "1");
        let delta = match at(1) {
            Some(Lexeme::Punct(op)) => match op.as_str() {
                "++" => Some(1),
                "--" => Some(-1),
                "+=" if is_one(at(2)) => Some(1),
                "-=" if is_one(at(2)) => Some(-1),
                "=" if at(2).is_some_and(|l| l.is_ident(name)) && is_one(at(4)) => {
                    match at(3) {
                        Some(Lexeme::Punct(sign)) if sign.as_str() == "+" => Some(1),
                        Some(Lexeme::Punct(sign)) if sign.as_str() == "-" => Some(-1),
                        _ => None,
                    }
                }
                _ => None,
            },
            _ => None,
        };
        if let Some(delta) = delta {
            self.tokens.push(Token::Step {
                var: name.to_string(),
                delta,
            });
        }
    }

    fn on_for(&mut self) -> usize {
        self.expect_for_in = true;
        if self.language.is_indentation_significant() && self.paren_depth > 0 {
            // Comprehension: lives until its bracket closes.
            self.tokens.push(Token::LoopOpen(LoopKind::Iteration));
            self.frames.push(Frame {
                kind: FrameKind::Loop { do_loop: false },
                closer: Closer::Paren(self.paren_depth),
            });
            return 1;
        }
        self.open_loop(true)
    }

    fn open_loop(&mut self, is_for: bool) -> usize {
        let header_end = self.loop_header_end();
        let header = self.lx.get(self.pos + 1..=header_end).unwrap_or(&[]);
        let has_clauses = header.iter().any(|l| l.is_punct(";"));
        let kind = match (is_for, self.table.for_style) {
            (false, _) => LoopKind::Conditional,
            (true, ForStyle::ForEach) => LoopKind::Iteration,
            (true, ForStyle::Parenthesized) if has_clauses => LoopKind::Counted,
            (true, ForStyle::Parenthesized) => LoopKind::Iteration,
            (true, ForStyle::Clauses) if has_clauses => LoopKind::Counted,
            (true, ForStyle::Clauses) if header.iter().any(|l| l.is_ident("range")) => {
                LoopKind::Iteration
            }
            (true, ForStyle::Clauses) => LoopKind::Conditional,
        };
        self.tokens.push(Token::LoopOpen(kind));
        self.pending.push(Pending {
            kind: FrameKind::Loop { do_loop: false },
            header_end,
            indent: self.line_indent,
        });
        1
    }

    fn loop_header_end(&self) -> usize {
        let last = self.lx.len().saturating_sub(1);
        if self.language.is_indentation_significant() {
            return self
                .find_at_depth(self.pos + 1, |l| l.is_punct(":"), |_| false)
                .unwrap_or(last);
        }
        if self.table.for_style == ForStyle::Parenthesized {
            // `for (...)`, `for await (...)`, `while (...)`
            let Some(open) = (self.pos + 1..(self.pos + 3).min(self.lx.len()))
                .find(|&j| self.lx[j].is_punct("("))
            else {
                return self.pos;
            };
            return self.matching_close(open).unwrap_or(last);
        }
        self.find_at_depth(self.pos + 1, |l| l.is_punct("{"), |_| false)
            .map(|j| j - 1)
            .unwrap_or(last)
    }

    fn on_function_keyword(&mut self) -> usize {
        let mut j = self.pos + 1;
        let mut receiver = None;
        if self.language == Language::Go && self.lx.get(j).is_some_and(|l| l.is_punct("(")) {
            // `func (s *Solver) name(` has a receiver; `func(x int) {` does not.
            if let Some(close) = self.matching_close(j) {
                let named = self.lx.get(close + 1).and_then(Lexeme::ident).is_some()
                    && self.lx.get(close + 2).is_some_and(|l| l.is_punct("("));
                if named {
                    receiver = self.lx.get(j + 1).and_then(Lexeme::ident).map(str::to_string);
                    j = close + 1;
                }
            }
        }
        if self.lx.get(j).is_some_and(|l| l.is_punct("*")) {
            j += 1;
        }

        let declared = self
            .lx
            .get(j)
            .and_then(Lexeme::ident)
            .filter(|n| !self.table.is_reserved(n))
            .map(str::to_string);
        let body_from = if declared.is_some() { j + 1 } else { j };
        let Some(header_end) = self.function_header_end(body_from) else {
            return 1;
        };

        let named = declared.is_some();
        let name = declared.or_else(|| self.assigned_name(self.pos));
        self.tokens.push(Token::FunctionOpen { name: name.clone() });
        self.pending.push(Pending {
            kind: FrameKind::Function { name, receiver },
            header_end,
            indent: self.line_indent,
        });
        if named {
            j + 1 - self.pos
        } else {
            1
        }
    }

    fn function_header_end(&self, from: usize) -> Option<usize> {
        if self.language.is_indentation_significant() {
            return self.find_at_depth(from, |l| l.is_punct(":"), |_| false);
        }
        let go = self.language == Language::Go;
        self.find_at_depth(
            from,
            |l| l.is_punct("{"),
            |l| l.is_punct(";") || (go && matches!(l, Lexeme::LineStart(_))),
        )
        .map(|j| j - 1)
    }

    /// `name = function(...)`, `name := func(...)`, `name: (...) =>`.
    fn assigned_name(&self, at: usize) -> Option<String> {
        let mut k = self.prev_significant(at)?;
        if self.lx[k].is_ident("async") {
            k = self.prev_significant(k)?;
        }
        let binds = matches!(&self.lx[k], Lexeme::Punct(p) if matches!(p.as_str(), "=" | ":=" | ":"));
        if !binds {
            return None;
        }
        let k = self.prev_significant(k)?;
        self.lx[k].ident().map(str::to_string)
    }

    /// `name(params) [qualifiers] {` in languages with bare method
    /// signatures. Returns the index of the body's `{`.
    fn signature_body(&self, name_at: usize) -> Option<usize> {
        if !self.table.signature_methods {
            return None;
        }
        let allowed = match self.prev_significant(name_at).map(|k| &self.lx[k]) {
            None => true,
            Some(Lexeme::Ident(w)) => !matches!(
                w.as_str(),
                "new" | "return" | "else" | "await" | "throw" | "typeof" | "case" | "yield"
            ),
            Some(Lexeme::Punct(p)) => {
                matches!(p.as_str(), ">" | "]" | "*" | "&" | "}" | ";" | "{" | "::")
            }
            _ => false,
        };
        if !allowed || !self.lx.get(name_at + 1).is_some_and(|l| l.is_punct("(")) {
            return None;
        }
        let close = self.matching_close(name_at + 1)?;
        for j in close + 1..(close + 32).min(self.lx.len()) {
            match &self.lx[j] {
                Lexeme::Punct(p) if p == "{" => return Some(j),
                Lexeme::Ident(_) | Lexeme::LineStart(_) => {}
                Lexeme::Punct(p)
                    if matches!(
                        p.as_str(),
                        "," | "." | ":" | "<" | ">" | "[" | "]" | "|" | "?" | "&" | "*" | "->" | "::"
                    ) => {}
                _ => return None,
            }
        }
        None
    }

    fn on_call(&mut self, name: &str) -> usize {
        let accessor = self.prev_significant(self.pos).filter(|&k| {
            matches!(&self.lx[k], Lexeme::Punct(p) if matches!(p.as_str(), "." | "?." | "->" | "::"))
        });
        let receiver_at = accessor.and_then(|k| self.prev_significant(k));
        let receiver = receiver_at.and_then(|k| self.lx[k].ident());
        let on_self = receiver.is_some_and(|r| self.is_self_receiver(r));
        let dotted = accessor.is_some() && !on_self;

        if !on_self {
            if let Some(brace) = self.signature_body(self.pos) {
                let name = Some(name.to_string());
                self.tokens.push(Token::FunctionOpen { name: name.clone() });
                self.pending.push(Pending {
                    kind: FrameKind::Function {
                        name,
                        receiver: None,
                    },
                    header_end: brace - 1,
                    indent: self.line_indent,
                });
                return 1;
            }
        }

        if !dotted && self.in_function_named(name) {
            let start = if on_self {
                receiver_at.unwrap_or(self.pos)
            } else {
                self.pos
            };
            let tail = self.is_tail_call(start);
            self.tokens.push(Token::RecursiveCall {
                name: name.to_string(),
                tail,
            });
            return 1;
        }

        if self.is_sort_call(name, receiver, dotted) {
            self.tokens.push(Token::SortCall);
            return 1;
        }

        if dotted
            && self.language != Language::Python
            && keywords::ITERATION_METHODS.contains(&name)
            && !self.in_loop_header()
        {
            self.tokens.push(Token::LoopOpen(LoopKind::Iteration));
            self.frames.push(Frame {
                kind: FrameKind::Loop { do_loop: false },
                closer: Closer::Paren(self.paren_depth + 1),
            });
            return 1;
        }

        if dotted || keywords::FREE_OPS.contains(&name) {
            if let Some((_, kind, op)) = keywords::METHOD_OPS.iter().find(|(n, ..)| *n == name) {
                self.structure_op(*kind, *op);
                return 1;
            }
        }

        let qualified_ok = !dotted
            || receiver == Some("collections")
            || name.starts_with(|c: char| c.is_ascii_uppercase());
        if let Some(kind) = self.table.structure(name).filter(|_| qualified_ok) {
            let dims = self.region_dims(self.pos + 1);
            self.construct(kind, dims);
            return 1;
        }

        if !dotted
            || keywords::MIN_MAX.contains(&name)
            || keywords::DIVIDE_HELPERS.contains(&name)
        {
            self.tokens.push(Token::Call {
                name: name.to_string(),
            });
        }
        1
    }

    fn is_self_receiver(&self, receiver: &str) -> bool {
        matches!(receiver, "self" | "this" | "Self")
            || self.frames.iter().any(|f| {
                matches!(&f.kind, FrameKind::Function { receiver: Some(r), .. } if r == receiver)
            })
    }

    fn in_function_named(&self, name: &str) -> bool {
        self.frames.iter().any(|f| {
            matches!(&f.kind, FrameKind::Function { name: Some(n), .. } if n == name)
        })
    }

    /// `return f(...)` with nothing after the call.
    fn is_tail_call(&self, start: usize) -> bool {
        let returned = self
            .prev_significant(start)
            .is_some_and(|k| self.lx[k].is_ident("return"));
        if !returned {
            return false;
        }
        let Some(close) = self.matching_close(self.pos + 1) else {
            return false;
        };
        match self.lx.get(close + 1) {
            None | Some(Lexeme::LineStart(_)) => true,
            Some(Lexeme::Punct(p)) => p == ";" || p == "}",
            _ => false,
        }
    }

    fn is_sort_call(&self, name: &str, receiver: Option<&str>, dotted: bool) -> bool {
        if keywords::QUALIFIED_SORT_NAMES.contains(&name) {
            return dotted && matches!(receiver, Some("sort" | "slices"));
        }
        keywords::SORT_NAMES.contains(&name)
    }

    fn on_index(&mut self, name: &str) {
        if keywords::is_memo_name(name) {
            self.structure_op(None, StructureOp::TableAccess);
            return;
        }
        if self.language == Language::Go && name == "map" {
            let allocates = self.prev_significant(self.pos).is_some_and(|k| match &self.lx[k] {
                Lexeme::Punct(p) if p == "=" || p == ":=" || p == "," => true,
                Lexeme::Punct(p) if p == "(" => k
                    .checked_sub(1)
                    .is_some_and(|m| self.lx[m].is_ident("make")),
                Lexeme::Ident(w) => w == "return",
                _ => false,
            });
            if allocates {
                self.construct(StructureKind::HashMap, 1);
            }
        }
    }

    fn on_generic(&mut self, name: &str) {
        let Some(kind) = self.table.structure(name) else {
            return;
        };
        let Some(close) = self.matching_angle(self.pos + 1) else {
            return;
        };
        let prev = self.prev_significant(self.pos);
        let constructs = match self.lx.get(close + 1) {
            // `Set<Int>()`, `vector<int>(m)`
            Some(l) if l.is_punct("(") => true,
            // `let seen: HashSet<i32> = ...`
            Some(l) if l.is_punct("=") => prev.is_some_and(|k| self.lx[k].is_punct(":")),
            // `vector<int> v(n);` but not a parameter or a return type
            Some(Lexeme::Ident(_)) if self.table.declaration_constructs => {
                let parameter = prev.is_some_and(|k| self.lx[k].is_punct("(") || self.lx[k].is_punct(","));
                !parameter && self.signature_body(close + 1).is_none()
            }
            _ => false,
        };
        if constructs {
            let dims = self.region_dims(self.pos + 1);
            self.construct(kind, dims);
        }
    }

    /// `Vec::new()`, `HashMap::with_capacity(n)`, `Array.from(...)`.
    fn on_static_constructor(&mut self, name: &str) {
        let Some(kind) = self.table.structure(name) else {
            return;
        };
        let builds = self
            .lx
            .get(self.pos + 2)
            .and_then(Lexeme::ident)
            .is_some_and(|c| CONSTRUCTORS.contains(&c));
        if builds {
            let dims = self.region_dims(self.pos + 1);
            self.construct(kind, dims);
        }
    }

    /// Swift `xs.map { ... }`.
    fn on_trailing_closure(&mut self, name: &str) {
        let dotted = self
            .prev_significant(self.pos)
            .is_some_and(|k| self.lx[k].is_punct("."));
        if dotted && keywords::ITERATION_METHODS.contains(&name) && !self.in_loop_header() {
            self.tokens.push(Token::LoopOpen(LoopKind::Iteration));
            self.pending.push(Pending {
                kind: FrameKind::Loop { do_loop: false },
                header_end: self.pos,
                indent: self.line_indent,
            });
        }
    }

    fn on_new(&mut self) -> usize {
        let j = self.pos + 1;
        let Some(type_name) = self.lx.get(j).and_then(Lexeme::ident) else {
            return 1;
        };
        if self.lx.get(j + 1).is_some_and(|l| l.is_punct("[")) {
            // `new int[n][m]`
            let mut groups = 0u8;
            let mut k = j + 1;
            while self.lx.get(k).is_some_and(|l| l.is_punct("[")) {
                let Some(close) = self.matching_close(k) else {
                    break;
                };
                groups = groups.saturating_add(1);
                k = close + 1;
            }
            self.construct(StructureKind::Array, groups.clamp(1, 3));
            return 2;
        }
        match self.table.structure(type_name) {
            Some(kind) => {
                let dims = self.region_dims(j + 1);
                self.construct(kind, dims);
                2
            }
            None => 1,
        }
    }

    // ---- emitting -----------------------------------------------------

    fn construct(&mut self, kind: StructureKind, dims: u8) {
        self.tokens.push(Token::Structure {
            kind: Some(kind),
            op: StructureOp::Construct,
            dims,
        });
    }

    fn structure_op(&mut self, kind: Option<StructureKind>, op: StructureOp) {
        self.tokens.push(Token::Structure { kind, op, dims: 0 });
    }

    // ---- lookahead helpers --------------------------------------------

    fn in_loop_header(&self) -> bool {
        self.pending
            .iter()
            .any(|p| matches!(p.kind, FrameKind::Loop { .. }) && self.pos <= p.header_end)
    }

    fn next_significant(&self, from: usize) -> Option<usize> {
        (from..self.lx.len()).find(|&j| !matches!(self.lx[j], Lexeme::LineStart(_)))
    }

    fn prev_significant(&self, before: usize) -> Option<usize> {
        (before.saturating_sub(LOOKAHEAD)..before)
            .rev()
            .find(|&j| !matches!(self.lx[j], Lexeme::LineStart(_)))
    }

    /// First lexeme at bracket depth zero matching `is_target`, giving up at
    /// `is_stop` or when the enclosing bracket closes.
    fn find_at_depth(
        &self,
        from: usize,
        is_target: impl Fn(&Lexeme) -> bool,
        is_stop: impl Fn(&Lexeme) -> bool,
    ) -> Option<usize> {
        let mut depth = 0usize;
        for (j, lexeme) in self.lx.iter().enumerate().skip(from).take(LOOKAHEAD) {
            if depth == 0 {
                if is_target(lexeme) {
                    return Some(j);
                }
                if is_stop(lexeme) {
                    return None;
                }
            }
            match lexeme {
                Lexeme::Punct(p) if is_open(p) => depth += 1,
                Lexeme::Punct(p) if is_close(p) => {
                    if depth == 0 {
                        return None;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
        None
    }

    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (j, lexeme) in self.lx.iter().enumerate().skip(open).take(LOOKAHEAD) {
            match lexeme {
                Lexeme::Punct(p) if is_open(p) => depth += 1,
                Lexeme::Punct(p) if is_close(p) => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(j);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn matching_open(&self, close: usize) -> Option<usize> {
        let mut depth = 0usize;
        for j in (close.saturating_sub(LOOKAHEAD)..=close).rev() {
            match &self.lx[j] {
                Lexeme::Punct(p) if is_close(p) => depth += 1,
                Lexeme::Punct(p) if is_open(p) => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(j);
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Closing `>` of a generic argument list, treating `>>` as two closes.
    fn matching_angle(&self, open: usize) -> Option<usize> {
        let mut depth = 0i32;
        for (j, lexeme) in self.lx.iter().enumerate().skip(open).take(32) {
            match lexeme {
                Lexeme::Punct(p) => match p.as_str() {
                    "<" => depth += 1,
                    ">" => depth -= 1,
                    ">>" => depth -= 2,
                    ">>>" => depth -= 3,
                    "," | "::" | "." | "&" | "*" | "[" | "]" | "?" | ":" => {}
                    _ => return None,
                },
                Lexeme::Ident(_) | Lexeme::Number(_) => {}
                _ => return None,
            }
            if depth <= 0 {
                return Some(j);
            }
        }
        None
    }

    fn has_top_level_colon(&self, open: usize) -> bool {
        self.find_at_depth(open + 1, |l| l.is_punct(":"), |_| false)
            .is_some()
    }

    /// `[]int`, `[][]int`: Go slice types, counting dimensions.
    fn slice_type_dims(&self, mut j: usize) -> Option<u8> {
        let mut dims = 0u8;
        while self.lx.get(j).is_some_and(|l| l.is_punct("["))
            && self.lx.get(j + 1).is_some_and(|l| l.is_punct("]"))
        {
            dims = dims.saturating_add(1);
            j += 2;
        }
        let typed = self.lx.get(j).and_then(Lexeme::ident).is_some();
        (dims > 0 && typed).then_some(dims.min(3))
    }

    /// 2 when the rest of the allocating statement builds another array,
    /// else 1.
    fn region_dims(&self, from: usize) -> u8 {
        let mut depth = 0usize;
        for (j, lexeme) in self.lx.iter().enumerate().skip(from).take(LOOKAHEAD) {
            match lexeme {
                Lexeme::Ident(name)
                    if self.table.structure(name) == Some(StructureKind::Array) =>
                {
                    return 2;
                }
                Lexeme::Punct(p) if p == "[" && self.is_literal_bracket(j) => return 2,
                Lexeme::Punct(p) if is_open(p) => depth += 1,
                Lexeme::Punct(p) if is_close(p) => {
                    if depth == 0 {
                        return 1;
                    }
                    depth -= 1;
                }
                Lexeme::Punct(p) if p == ";" && depth == 0 => return 1,
                Lexeme::LineStart(_) if depth == 0 => return 1,
                _ => {}
            }
        }
        1
    }

    /// `[` that starts a list literal rather than an index or a macro body.
    fn is_literal_bracket(&self, j: usize) -> bool {
        match j.checked_sub(1).map(|k| &self.lx[k]) {
            Some(Lexeme::Ident(_) | Lexeme::Number(_) | Lexeme::Str) => false,
            Some(Lexeme::Punct(p)) => !matches!(p.as_str(), ")" | "]" | "}" | "!"),
            _ => true,
        }
    }
}
