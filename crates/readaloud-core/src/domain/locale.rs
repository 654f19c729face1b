//! Speech locale tags.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A normalized language tag such as `en`, `en-US` or `he-IL`.
///
/// The language subtag is stored lowercase and the region subtag uppercase,
/// so `en_us`, `EN-us` and `en-US` all compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale {
    language: String,
    region: Option<String>,
}

/// A locale tag could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid locale tag: {0:?}")]
pub struct InvalidLocale(pub String);

impl Locale {
    /// Build a locale from a language and optional region subtag.
    pub fn new(language: &str, region: Option<&str>) -> Result<Self, InvalidLocale> {
        let valid_language =
            (2..=3).contains(&language.len()) && language.chars().all(|c| c.is_ascii_alphabetic());
        let valid_region = region.is_none_or(|r| {
            (r.len() == 2 && r.chars().all(|c| c.is_ascii_alphabetic()))
                || (r.len() == 3 && r.chars().all(|c| c.is_ascii_digit()))
        });
        if !valid_language || !valid_region {
            let tag = region.map_or_else(|| language.to_string(), |r| format!("{language}-{r}"));
            return Err(InvalidLocale(tag));
        }
        Ok(Self {
            language: language.to_ascii_lowercase(),
            region: region.map(str::to_ascii_uppercase),
        })
    }

    /// Parse a tag like `en-US` or `en_US`. Extra subtags after the region
    /// (scripts, variants) are not supported.
    pub fn parse(tag: &str) -> Result<Self, InvalidLocale> {
        let tag = tag.trim();
        let mut parts = tag.split(['-', '_']);
        let language = parts.next().unwrap_or_default();
        let region = parts.next();
        if parts.next().is_some() {
            return Err(InvalidLocale(tag.to_string()));
        }
        Self::new(language, region).map_err(|_| InvalidLocale(tag.to_string()))
    }

    /// Parse a POSIX locale string such as `en_US.UTF-8` or `de_DE@euro`.
    ///
    /// Returns `None` for the `C` / `POSIX` pseudo-locales and anything that
    /// does not name a language.
    #[must_use]
    pub fn from_posix(value: &str) -> Option<Self> {
        let base = value.split(['.', '@']).next().unwrap_or_default();
        if base.is_empty() || base.eq_ignore_ascii_case("c") || base.eq_ignore_ascii_case("posix")
        {
            return None;
        }
        Self::parse(base).ok()
    }

    /// The platform's default locale, taken from `LC_ALL`, `LC_MESSAGES` or
    /// `LANG` in that order.
    #[must_use]
    pub fn system_default() -> Option<Self> {
        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.is_empty())
            .and_then(|value| Self::from_posix(&value))
    }

    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}-{region}", self.language),
            None => f.write_str(&self.language),
        }
    }
}

impl FromStr for Locale {
    type Err = InvalidLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Locale {
    type Error = InvalidLocale;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Locale> for String {
    fn from(locale: Locale) -> Self {
        locale.to_string()
    }
}
