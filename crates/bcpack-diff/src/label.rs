//! Change labels.

use std::fmt;
use std::str::FromStr;

use bcpack_archive::FileDescriptor;

use crate::Error;

/// How a file changed between the base and compared versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Label {
    Unchanged,
    Added,
    Removed,
    Modified,
}

impl Label {
    pub const ALL: [Label; 4] = [Label::Unchanged, Label::Added, Label::Removed, Label::Modified];

    pub const fn as_str(self) -> &'static str {
        match self {
            Label::Unchanged => "unchanged",
            Label::Added => "added",
            Label::Removed => "removed",
            Label::Modified => "modified",
        }
    }

    /// One-character marker for listings.
    pub const fn marker(self) -> char {
        match self {
            Label::Unchanged => ' ',
            Label::Added => '+',
            Label::Removed => '-',
            Label::Modified => '~',
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownLabel(s.to_string()))
    }
}

/// A file descriptor annotated with its change classification.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LabeledFile {
    pub descriptor: FileDescriptor,
    pub label: Label,
}

impl LabeledFile {
    pub fn new(descriptor: FileDescriptor, label: Label) -> Self {
        Self { descriptor, label }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}
