//! Bracket balance analysis.
//!
//! A filtered line is scanned right to left. Closing brackets are counted
//! per kind; an opening bracket either consumes one of those counts or, if
//! none is pending, is reported as unmatched. The counter left over after a
//! full scan is carried into the analysis of the previous line.

/// Unmatched closing brackets seen so far, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BracketCounter {
    pub paren: usize,
    pub square: usize,
    pub curly: usize,
}

impl BracketCounter {
    pub fn is_zero(&self) -> bool {
        self.paren == 0 && self.square == 0 && self.curly == 0
    }

    fn slot(&mut self, kind: BracketKind) -> &mut usize {
        match kind {
            BracketKind::Paren => &mut self.paren,
            BracketKind::Square => &mut self.square,
            BracketKind::Curly => &mut self.curly,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BracketKind {
    Paren,
    Square,
    Curly,
}

/// Classify a character as an opening or closing bracket.
fn bracket(c: char) -> Option<(BracketKind, bool)> {
    match c {
        '(' => Some((BracketKind::Paren, true)),
        ')' => Some((BracketKind::Paren, false)),
        '[' => Some((BracketKind::Square, true)),
        ']' => Some((BracketKind::Square, false)),
        '{' => Some((BracketKind::Curly, true)),
        '}' => Some((BracketKind::Curly, false)),
        _ => None,
    }
}

/// Outcome of a bracket scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Balance {
    /// Every bracket on the line (and in the carried counter) is matched.
    Balanced,
    /// Column of the rightmost opening bracket with no closer after it.
    UnmatchedOpen(usize),
    /// Closing brackets whose openers must be on an earlier line.
    UnmatchedClose(BracketCounter),
}

/// Scan `line` right to left, starting from `carry_in` if given.
///
/// The scan stops at the first unmatched opening bracket, so an unmatched
/// opener always wins over closers further right on the same line.
pub fn analyze(line: &str, carry_in: Option<BracketCounter>) -> Balance {
    let mut counter = carry_in.unwrap_or_default();
    let len = line.chars().count();

    for (i, c) in line.chars().rev().enumerate() {
        let Some((kind, opening)) = bracket(c) else {
            continue;
        };
        let slot = counter.slot(kind);
        if !opening {
            *slot += 1;
        } else if *slot == 0 {
            return Balance::UnmatchedOpen(len - 1 - i);
        } else {
            *slot -= 1;
        }
    }

    if counter.is_zero() {
        Balance::Balanced
    } else {
        Balance::UnmatchedClose(counter)
    }
}
