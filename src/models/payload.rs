//! Raw page payloads as returned by the content API
//!
//! Nothing here is trusted: every field defaults when absent, and component
//! data stays an undecoded string until the mapper asks for it.

use serde::{Deserialize, Serialize};

/// A wiki page: named modules holding named components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPayload {
    #[serde(default, deserialize_with = "deserialize_string_or_int_option")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modules: Vec<PayloadModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadModule {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub components: Vec<PayloadComponent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayloadComponent {
    #[serde(default)]
    pub component_id: String,
    /// A JSON document encoded as a string
    #[serde(default)]
    pub data: Option<String>,
}

impl RawPayload {
    /// First module whose trimmed name matches any alias, case-insensitively
    pub fn find_module(&self, aliases: &[&str]) -> Option<&PayloadModule> {
        self.modules.iter().find(|module| {
            let name = module.name.trim();
            aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
        })
    }
}

impl PayloadModule {
    pub fn find_component(&self, component_id: &str) -> Option<&PayloadComponent> {
        self.components
            .iter()
            .find(|component| component.component_id.trim() == component_id)
    }
}

/// Page ids arrive as either strings or integers
fn deserialize_string_or_int_option<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct StringOrIntOptionVisitor;

    impl<'de> Visitor<'de> for StringOrIntOptionVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string, integer, or null")
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(value.to_string()))
        }
    }

    deserializer.deserialize_any(StringOrIntOptionVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_payload_deserializes() {
        let payload: RawPayload = serde_json::from_str(r#"{"name":"Anby"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("Anby"));
        assert!(payload.modules.is_empty());
    }

    #[test]
    fn test_numeric_page_id() {
        let payload: RawPayload = serde_json::from_str(r#"{"id":31,"name":"Anby"}"#).unwrap();
        assert_eq!(payload.id.as_deref(), Some("31"));
        let payload: RawPayload = serde_json::from_str(r#"{"id":null}"#).unwrap();
        assert_eq!(payload.id, None);
    }

    #[test]
    fn test_module_lookup_uses_aliases() {
        let payload: RawPayload = serde_json::from_str(
            r#"{"modules":[{"name":" 突破 ","components":[{"component_id":"ascension","data":"{}"}]}]}"#,
        )
        .unwrap();
        let module = payload.find_module(&["Ascension", "突破"]).unwrap();
        assert!(module.find_component("ascension").is_some());
        assert!(module.find_component("baseInfo").is_none());
        assert!(payload.find_module(&["Basic Info"]).is_none());
    }
}
