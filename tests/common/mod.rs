#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio_util::sync::CancellationToken;

use hoyowiki_ingest::errors::{ApiError, ApiResult};
use hoyowiki_ingest::models::{Entry, Locale, PayloadComponent, PayloadModule, RawPayload, SourceRef};
use hoyowiki_ingest::sources::ContentClient;
use hoyowiki_ingest::sources::hoyowiki::decode_envelope;

pub const LEVEL_KEYS: [&str; 7] = ["1", "10", "20", "30", "40", "50", "60"];

/// The recorded Ellen Joe entry page, decoded the way the live client does
pub fn ellen_page() -> RawPayload {
    decode_envelope(include_str!("../fixtures/entry_page_ellen.json")).unwrap()
}

fn component(module: &str, id: &str, data: String) -> PayloadModule {
    PayloadModule {
        name: module.to_string(),
        components: vec![PayloadComponent {
            component_id: id.to_string(),
            data: Some(data),
        }],
    }
}

pub fn ascension_doc(hp: [&str; 7]) -> Value {
    let list: Vec<Value> = LEVEL_KEYS
        .iter()
        .zip(hp.iter())
        .map(|(key, hp)| {
            json!({
                "key": key,
                "combatList": [
                    {"key": "Base HP", "values": [hp]},
                    {"key": "Base ATK", "values": ["120"]},
                    {"key": "Base DEF", "values": ["60"]},
                    {"key": "Impact", "values": ["118"]},
                    {"key": "CRIT Rate", "values": ["5%"]},
                ]
            })
        })
        .collect();
    json!({ "list": list })
}

/// A page carrying every required field
pub fn agent_page(name: &str, attribute: &str, hp: [&str; 7]) -> RawPayload {
    RawPayload {
        id: None,
        name: Some(name.to_string()),
        modules: vec![
            component(
                "Basic Info",
                "baseInfo",
                json!({"list": [
                    {"key": "Attribute", "value": [attribute]},
                    {"key": "Specialty", "value": ["Stun"]},
                    {"key": "Attack Type", "value": ["Strike"]},
                    {"key": "Rarity", "value": ["A"]},
                    {"key": "Faction", "value": ["$[{\"name\":\"Cunning Hares\"}]$"]},
                ]})
                .to_string(),
            ),
            component("Ascension", "ascension", ascension_doc(hp).to_string()),
        ],
    }
}

pub fn simple_page(name: &str) -> RawPayload {
    agent_page(name, "Electric", ["-", "1000", "1200", "1400", "1600", "1800", "2000"])
}

/// Fetched fine, but the ascension component is not JSON
pub fn broken_page(name: &str) -> RawPayload {
    let mut page = simple_page(name);
    page.modules[1].components[0].data = Some("{\"list\": [".to_string());
    page
}

pub fn entries(count: usize) -> Vec<Entry> {
    (1..=count)
        .map(|i| Entry::new(format!("10{i:02}"), format!("{}", 30 + i), format!("Agent {i}")))
        .collect()
}

enum Script {
    Always(ApiResult<RawPayload>),
    /// Fail this many times, then succeed
    FailFirst(u32, RawPayload),
}

/// Scripted in-memory content API with per-reference call counters
#[derive(Default)]
pub struct FakeClient {
    scripts: HashMap<String, Script>,
    calls: Mutex<HashMap<String, u32>>,
    total_calls: AtomicU32,
    cancel_on_first_call: Option<CancellationToken>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serving(mut self, source_ref: &str, page: RawPayload) -> Self {
        self.scripts.insert(source_ref.to_string(), Script::Always(Ok(page)));
        self
    }

    pub fn failing(mut self, source_ref: &str, error: ApiError) -> Self {
        self.scripts.insert(source_ref.to_string(), Script::Always(Err(error)));
        self
    }

    pub fn flaky(mut self, source_ref: &str, failures: u32, page: RawPayload) -> Self {
        self.scripts
            .insert(source_ref.to_string(), Script::FailFirst(failures, page));
        self
    }

    /// Every entry in `entries` serves a valid page named after it
    pub fn serving_all(mut self, entries: &[Entry]) -> Self {
        for entry in entries {
            self = self.serving(entry.source_ref.as_str(), simple_page(&entry.display_name));
        }
        self
    }

    pub fn cancelling(mut self, token: CancellationToken) -> Self {
        self.cancel_on_first_call = Some(token);
        self
    }

    pub fn calls_for(&self, source_ref: &str) -> u32 {
        self.calls
            .lock()
            .unwrap()
            .get(source_ref)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.total_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentClient for FakeClient {
    async fn fetch(&self, source_ref: &SourceRef, _locale: Locale) -> ApiResult<RawPayload> {
        if self.total_calls.fetch_add(1, Ordering::SeqCst) == 0 {
            if let Some(token) = &self.cancel_on_first_call {
                token.cancel();
            }
        }

        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(source_ref.to_string()).or_insert(0);
            *count += 1;
            *count
        };

        match self.scripts.get(source_ref.as_str()) {
            Some(Script::Always(result)) => result.clone(),
            Some(Script::FailFirst(failures, page)) if call > *failures => Ok(page.clone()),
            Some(Script::FailFirst(..)) => Err(ApiError::status(503, "Service Unavailable")),
            None => Err(ApiError::status(404, "Not Found")),
        }
    }
}
