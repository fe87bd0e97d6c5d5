//! Archive addressing.

use std::fmt;

use bcpack_common::{Category, Locale};

/// Which half of an archive pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    List,
    Pack,
}

impl ResourceKind {
    pub const fn extension(self) -> &'static str {
        match self {
            ResourceKind::List => "list",
            ResourceKind::Pack => "pack",
        }
    }
}

/// Identifies one archive pair: `{locale}/{version}/{category}.{list,pack}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveKey {
    pub locale: Locale,
    pub version: String,
    pub category: Category,
}

impl ArchiveKey {
    pub fn new(locale: Locale, version: impl Into<String>, category: Category) -> Self {
        Self {
            locale,
            version: version.into(),
            category,
        }
    }

    /// Path of the pair without extension.
    pub fn base_path(&self) -> String {
        format!("{}/{}/{}", self.locale, self.version, self.category)
    }

    /// Relative path of one half of the pair.
    pub fn resource(&self, kind: ResourceKind) -> String {
        format!("{}.{}", self.base_path(), kind.extension())
    }
}

impl fmt::Display for ArchiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_path())
    }
}

/// Raw bytes of a fetched pair.
#[derive(Debug, Clone, Default)]
pub struct RawPair {
    pub list: Vec<u8>,
    pub pack: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_paths() {
        let key = ArchiveKey::new(Locale::Tw, "13.4.0", Category::ResLocal);
        assert_eq!(key.base_path(), "TW/13.4.0/resLocal");
        assert_eq!(key.resource(ResourceKind::List), "TW/13.4.0/resLocal.list");
        assert_eq!(key.resource(ResourceKind::Pack), "TW/13.4.0/resLocal.pack");
    }
}
