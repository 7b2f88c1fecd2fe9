//! The LOOP bodies which are currently open.
//!
//! A LOOP pushes its line number and the next DO_LOOP pops it, so
//! the innermost LOOP is matched first.
use super::types::LineNumber;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct LoopStack {
    open: Vec<LineNumber>,
}

impl LoopStack {
    pub(crate) fn push(&mut self, line: LineNumber) {
        self.open.push(line);
    }

    pub(crate) fn pop(&mut self) -> Option<LineNumber> {
        self.open.pop()
    }

    /// The line of the innermost open LOOP.
    pub(crate) fn innermost(&self) -> Option<LineNumber> {
        self.open.last().copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.open.clear();
    }
}

#[test]
fn test_innermost_loop_matches_first() {
    let mut stack = LoopStack::default();
    assert!(stack.is_empty());
    stack.push(1);
    stack.push(3);
    assert_eq!(stack.innermost(), Some(3));
    assert_eq!(stack.pop(), Some(3));
    assert_eq!(stack.pop(), Some(1));
    assert_eq!(stack.pop(), None);
}

#[test]
fn test_clear() {
    let mut stack = LoopStack::default();
    stack.push(2);
    stack.clear();
    assert!(stack.is_empty());
    assert_eq!(stack.innermost(), None);
}
