//! Positional line diff.
//!
//! Lines are compared index by index. There is no realignment: one inserted
//! line turns every following line into a removed/added pair.

/// Kind of a diff line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum DiffKind {
    Unchanged,
    Added,
    Removed,
}

impl DiffKind {
    /// Unified-diff style prefix.
    pub const fn prefix(self) -> char {
        match self {
            DiffKind::Unchanged => ' ',
            DiffKind::Added => '+',
            DiffKind::Removed => '-',
        }
    }
}

/// One line of a diff with its 1-based position on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DiffLine {
    pub kind: DiffKind,
    pub content: String,
    pub old_line: Option<usize>,
    pub new_line: Option<usize>,
}

impl DiffLine {
    pub fn unchanged(content: &str, line: usize) -> Self {
        Self {
            kind: DiffKind::Unchanged,
            content: content.to_string(),
            old_line: Some(line),
            new_line: Some(line),
        }
    }

    pub fn added(content: &str, new_line: usize) -> Self {
        Self {
            kind: DiffKind::Added,
            content: content.to_string(),
            old_line: None,
            new_line: Some(new_line),
        }
    }

    pub fn removed(content: &str, old_line: usize) -> Self {
        Self {
            kind: DiffKind::Removed,
            content: content.to_string(),
            old_line: Some(old_line),
            new_line: None,
        }
    }
}

/// Compare two texts line by line at equal positions.
pub fn diff_lines(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old.split('\n').collect();
    let new_lines: Vec<&str> = new.split('\n').collect();
    let max = old_lines.len().max(new_lines.len());

    let mut diff = Vec::with_capacity(max);
    for i in 0..max {
        let line = i + 1;
        match (old_lines.get(i), new_lines.get(i)) {
            (Some(a), Some(b)) if a == b => diff.push(DiffLine::unchanged(a, line)),
            (Some(a), Some(b)) => {
                diff.push(DiffLine::removed(a, line));
                diff.push(DiffLine::added(b, line));
            }
            (None, Some(b)) => diff.push(DiffLine::added(b, line)),
            (Some(a), None) => diff.push(DiffLine::removed(a, line)),
            (None, None) => {}
        }
    }
    diff
}

/// A line diff with added/removed totals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LineDiff {
    pub added: usize,
    pub removed: usize,
    pub lines: Vec<DiffLine>,
}

impl LineDiff {
    pub fn compute(old: &str, new: &str) -> Self {
        let lines = diff_lines(old, new);
        let count = |kind: DiffKind| lines.iter().filter(|l| l.kind == kind).count();

        Self {
            added: count(DiffKind::Added),
            removed: count(DiffKind::Removed),
            lines,
        }
    }

    /// Whether both texts were identical.
    pub fn is_identical(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaced_middle_line() {
        assert_eq!(
            diff_lines("a\nb\nc", "a\nx\nc"),
            [
                DiffLine::unchanged("a", 1),
                DiffLine::removed("b", 2),
                DiffLine::added("x", 2),
                DiffLine::unchanged("c", 3),
            ]
        );
    }

    #[test]
    fn test_removed_line_numbers() {
        let diff = diff_lines("a\nb\nc", "a\nx\nc");
        assert_eq!((diff[1].old_line, diff[1].new_line), (Some(2), None));
        assert_eq!((diff[2].old_line, diff[2].new_line), (None, Some(2)));
    }

    #[test]
    fn test_new_shorter() {
        assert_eq!(
            diff_lines("a\nb", "a"),
            [DiffLine::unchanged("a", 1), DiffLine::removed("b", 2)]
        );
    }

    #[test]
    fn test_old_shorter() {
        assert_eq!(
            diff_lines("a", "a\nb\nc"),
            [
                DiffLine::unchanged("a", 1),
                DiffLine::added("b", 2),
                DiffLine::added("c", 3),
            ]
        );
    }

    #[test]
    fn test_insertion_shifts_everything() {
        let diff = LineDiff::compute("1\n2\n3", "0\n1\n2\n3");

        // No realignment: every line is a removed/added pair plus the tail.
        assert_eq!(diff.removed, 3);
        assert_eq!(diff.added, 4);
        assert_eq!(diff.lines.len(), 7);
        assert!(diff.lines.iter().all(|l| l.kind != DiffKind::Unchanged));
    }

    #[test]
    fn test_trailing_newline_is_a_line() {
        // "a\n" splits into ["a", ""]; the empty last line has no counterpart.
        assert_eq!(
            diff_lines("a\n", "a"),
            [DiffLine::unchanged("a", 1), DiffLine::removed("", 2)]
        );
    }

    #[test]
    fn test_identical() {
        let diff = LineDiff::compute("x\ny\n", "x\ny\n");
        assert!(diff.is_identical());
        assert_eq!(diff.lines.len(), 3);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(diff_lines("", ""), [DiffLine::unchanged("", 1)]);
        assert_eq!(
            diff_lines("", "a"),
            [DiffLine::removed("", 1), DiffLine::added("a", 1)]
        );
    }
}
