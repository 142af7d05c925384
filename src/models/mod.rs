//! Domain models shared across the ingestion pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod agent;
pub mod batch;
pub mod payload;

pub use agent::*;
pub use batch::*;
pub use payload::*;

/// Opaque reference into the remote content API (the wiki `entry_page_id`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRef(pub String);

impl SourceRef {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of work: a wiki page to fetch and map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub source_ref: SourceRef,
    #[serde(default)]
    pub display_name: String,
}

impl Entry {
    pub fn new<I, S, N>(id: I, source_ref: S, display_name: N) -> Self
    where
        I: Into<String>,
        S: Into<String>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            source_ref: SourceRef::new(source_ref),
            display_name: display_name.into(),
        }
    }

    /// Entries with a blank id cannot be fetched, mapped or degraded
    pub fn has_valid_id(&self) -> bool {
        !self.id.trim().is_empty()
    }
}

/// Content locales understood by the wiki API
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Locale {
    #[serde(rename = "zh-cn")]
    ZhCn,
    #[default]
    #[serde(rename = "en-us")]
    EnUs,
    #[serde(rename = "ja-jp")]
    JaJp,
    #[serde(rename = "ko-kr")]
    KoKr,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::ZhCn => "zh-cn",
            Locale::EnUs => "en-us",
            Locale::JaJp => "ja-jp",
            Locale::KoKr => "ko-kr",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "zh-cn" => Ok(Locale::ZhCn),
            "en-us" | "en" => Ok(Locale::EnUs),
            "ja-jp" | "ja" => Ok(Locale::JaJp),
            "ko-kr" | "ko" => Ok(Locale::KoKr),
            other => Err(format!("unsupported locale '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_deserializes_without_display_name() {
        let entry: Entry = serde_json::from_str(r#"{"id":"1011","source_ref":"31"}"#).unwrap();
        assert_eq!(entry.id, "1011");
        assert_eq!(entry.source_ref.as_str(), "31");
        assert!(entry.display_name.is_empty());
        assert!(entry.has_valid_id());
    }

    #[test]
    fn test_blank_entry_id_is_invalid() {
        assert!(!Entry::new("  ", "31", "Anby").has_valid_id());
    }

    #[test]
    fn test_locale_round_trip_through_strings() {
        assert_eq!("EN_US".parse::<Locale>().unwrap(), Locale::EnUs);
        assert_eq!("zh-cn".parse::<Locale>().unwrap(), Locale::ZhCn);
        assert!("fr-fr".parse::<Locale>().is_err());
        assert_eq!(serde_json::to_string(&Locale::JaJp).unwrap(), "\"ja-jp\"");
    }
}
