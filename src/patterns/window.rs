//! Per-loop token windows for the pointer-movement detectors.

use crate::adapter::{LoopKind, Token, TokenStream};

/// Unit steps made directly in one loop body (header included), plus the
/// indices of the loops nested directly inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopWindow {
    pub kind: LoopKind,
    pub steps: Vec<(String, i8)>,
    pub children: Vec<usize>,
}

impl LoopWindow {
    fn stepped(&self, positive: bool) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(move |(_, delta)| (*delta > 0) == positive)
            .map(|(var, _)| var.as_str())
    }

    /// One index moves forward while a different one moves back.
    pub fn converges(&self) -> bool {
        self.stepped(true)
            .any(|up| self.stepped(false).any(|down| down != up))
    }

    /// Two different indices both move forward in the same body.
    pub fn advances_together(&self) -> bool {
        let mut forward = self.stepped(true);
        match forward.next() {
            Some(first) => forward.any(|other| other != first),
            None => false,
        }
    }

    /// A conditional loop that only pulls an index forward: the shrinking
    /// side of a window whose other edge is driven by an enclosing loop.
    pub fn shrinks_window(&self) -> bool {
        self.kind == LoopKind::Conditional
            && self.stepped(true).next().is_some()
            && self.stepped(false).next().is_none()
    }
}

/// Windows in opening order; `children` index into the returned vector.
pub fn loop_windows(tokens: &TokenStream) -> Vec<LoopWindow> {
    let mut windows: Vec<LoopWindow> = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    for token in tokens {
        match token {
            Token::LoopOpen(kind) => {
                let index = windows.len();
                windows.push(LoopWindow {
                    kind: *kind,
                    steps: Vec::new(),
                    children: Vec::new(),
                });
                if let Some(&parent) = open.last() {
                    windows[parent].children.push(index);
                }
                open.push(index);
            }
            Token::LoopClose => {
                open.pop();
            }
            Token::Step { var, delta } => {
                if let Some(&current) = open.last() {
                    windows[current].steps.push((var.clone(), *delta));
                }
            }
            _ => {}
        }
    }
    windows
}
