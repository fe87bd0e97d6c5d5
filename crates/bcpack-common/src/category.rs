//! Asset categories.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// The asset category a `.list`/`.pack` pair belongs to.
///
/// The display form is the exact file stem the packer uses, so it can be
/// dropped straight into archive paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    #[default]
    DataLocal,
    DownloadLocal,
    ImageDataLocal,
    ImageLocal,
    MapLocal,
    NumberLocal,
    ResLocal,
    UnitLocal,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 8] = [
        Category::DataLocal,
        Category::DownloadLocal,
        Category::ImageDataLocal,
        Category::ImageLocal,
        Category::MapLocal,
        Category::NumberLocal,
        Category::ResLocal,
        Category::UnitLocal,
    ];

    /// The file stem of this category's archive pair.
    pub const fn as_str(self) -> &'static str {
        match self {
            Category::DataLocal => "DataLocal",
            Category::DownloadLocal => "DownloadLocal",
            Category::ImageDataLocal => "ImageDataLocal",
            Category::ImageLocal => "ImageLocal",
            Category::MapLocal => "MapLocal",
            Category::NumberLocal => "NumberLocal",
            // Lower-case `res` is how the packer names it.
            Category::ResLocal => "resLocal",
            Category::UnitLocal => "UnitLocal",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
