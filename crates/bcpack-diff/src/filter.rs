//! Filtering of merged file lists.

use crate::{Label, LabeledFile};

/// Keyword and label filter over a labeled file list.
///
/// An empty filter keeps everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    /// Case-sensitive substring the file name must contain.
    pub keyword: Option<String>,
    /// Label the file must carry.
    pub label: Option<Label>,
}

impl ListFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.keyword = (!keyword.is_empty()).then_some(keyword);
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keyword.is_none() && self.label.is_none()
    }

    pub fn matches(&self, file: &LabeledFile) -> bool {
        let keyword_ok = self
            .keyword
            .as_deref()
            .map_or(true, |keyword| file.name().contains(keyword));
        let label_ok = self.label.map_or(true, |label| file.label == label);

        keyword_ok && label_ok
    }

    /// Matching files, in their original order.
    pub fn apply<'a>(&self, files: &'a [LabeledFile]) -> Vec<&'a LabeledFile> {
        files.iter().filter(|file| self.matches(file)).collect()
    }
}
