//! HoYoWiki entry-page client
//!
//! Pages come wrapped in a `{retcode, message, data: {page}}` envelope; a
//! non-zero return code is a remote failure even on HTTP 200.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use super::traits::ContentClient;
use crate::config::ClientConfig;
use crate::errors::{ApiError, ApiResult, IngestError, IngestResult};
use crate::models::{Locale, RawPayload, SourceRef};

/// Header selecting the content language
pub const LANGUAGE_HEADER: &str = "x-rpc-language";

const ENTRY_PAGE_PATH: &str = "entry_page";

pub struct HoyoWikiClient {
    client: Client,
    endpoint: Url,
}

impl HoyoWikiClient {
    pub fn new(config: &ClientConfig) -> IngestResult<Self> {
        let endpoint = Url::parse(&format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            ENTRY_PAGE_PATH
        ))
        .map_err(|e| {
            IngestError::configuration(format!("Invalid base_url '{}': {}", config.base_url, e))
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| IngestError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Request URL for one page
    pub fn entry_url(&self, source_ref: &SourceRef) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("entry_page_id", source_ref.as_str());
        url
    }
}

#[async_trait]
impl ContentClient for HoyoWikiClient {
    async fn fetch(&self, source_ref: &SourceRef, locale: Locale) -> ApiResult<RawPayload> {
        let url = self.entry_url(source_ref);
        debug!("Fetching entry page {} ({})", source_ref, locale);

        let response = self
            .client
            .get(url)
            .header(LANGUAGE_HEADER, locale.as_str())
            .send()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("unexpected status"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::transport(e.to_string()))?;
        decode_envelope(&body)
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(deserialize_with = "deserialize_string_or_int")]
    retcode: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: Option<EnvelopeData>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    #[serde(default)]
    page: Option<RawPayload>,
}

/// Decode a response body into its page payload
pub fn decode_envelope(body: &str) -> ApiResult<RawPayload> {
    let envelope: Envelope =
        serde_json::from_str(body).map_err(|e| ApiError::decode(e.to_string()))?;

    if envelope.retcode != 0 {
        return Err(ApiError::remote(envelope.retcode, envelope.message));
    }

    envelope
        .data
        .and_then(|data| data.page)
        .ok_or_else(|| ApiError::decode("response has no data.page"))
}

fn deserialize_string_or_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Unexpected, Visitor};

    struct StringOrIntVisitor;

    impl<'de> Visitor<'de> for StringOrIntVisitor {
        type Value = i64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or integer")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(value).map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            value
                .trim()
                .parse()
                .map_err(|_| E::invalid_value(Unexpected::Str(value), &self))
        }
    }

    deserializer.deserialize_any(StringOrIntVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_page() {
        let body = r#"{
            "retcode": 0,
            "message": "OK",
            "data": {"page": {
                "id": "31",
                "name": "Anby Demara",
                "modules": [{"name": "Basic Info", "components": [
                    {"component_id": "baseInfo", "layout": "ignored", "data": "{\"list\":[]}"}
                ]}]
            }}
        }"#;
        let page = decode_envelope(body).unwrap();
        assert_eq!(page.id.as_deref(), Some("31"));
        assert_eq!(page.modules[0].components[0].data.as_deref(), Some(r#"{"list":[]}"#));
    }

    #[test]
    fn test_nonzero_retcode_is_remote_error() {
        let body = r#"{"retcode": "-1001", "message": "entry page not found", "data": null}"#;
        assert_eq!(
            decode_envelope(body).unwrap_err(),
            ApiError::remote(-1001, "entry page not found")
        );
    }

    #[test]
    fn test_missing_page_and_garbage_are_decode_errors() {
        assert!(matches!(
            decode_envelope(r#"{"retcode":0,"message":"OK","data":{}}"#),
            Err(ApiError::Decode { .. })
        ));
        assert!(matches!(decode_envelope("<html>"), Err(ApiError::Decode { .. })));
    }

    #[test]
    fn test_entry_url_and_bad_base_url() {
        let client = HoyoWikiClient::new(&ClientConfig {
            base_url: "https://wiki.example.com/wapi/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.entry_url(&SourceRef::new("31")).as_str(),
            "https://wiki.example.com/wapi/entry_page?entry_page_id=31"
        );

        let bad = HoyoWikiClient::new(&ClientConfig {
            base_url: "not a url".to_string(),
            ..ClientConfig::default()
        });
        assert!(matches!(bad, Err(IngestError::Configuration { .. })));
    }
}
