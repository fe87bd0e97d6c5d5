//! Regional archive variants.

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// One of the four regional variants an archive is published for.
///
/// Each locale encrypts its pack segments with its own key/IV pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    /// Japan
    Jp,
    /// Taiwan
    Tw,
    /// English (global)
    En,
    /// Korea
    Kr,
}

impl Locale {
    /// All supported locales, in display order.
    pub const ALL: [Locale; 4] = [Locale::Jp, Locale::Tw, Locale::En, Locale::Kr];

    /// The two-letter code used in archive paths.
    #[inline]
    pub const fn code(self) -> &'static str {
        match self {
            Locale::Jp => "JP",
            Locale::Tw => "TW",
            Locale::En => "EN",
            Locale::Kr => "KR",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|locale| locale.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownLocale(s.to_string()))
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Locale {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.code())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Locale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <String as serde::Deserialize>::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
