use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{Span, debug, warn};

use super::dictionary::{Dictionaries, Dictionary};
use super::normalize::{Scalar, key_matches, normalize_json_scalar, raw_strings, split_tokens, text_values};
use super::relations::{relation_names, resolve_relations};
use crate::errors::{MappingError, MappingFailure, MappingResult};
use crate::models::{
    ASCENSION_LEVELS, AgentRecord, AscensionCurves, AttackType, Attribute, BaseStats, CURVE_LEN, Entry,
    Locale, Rarity, RawPayload, RecordField, Specialty,
};

pub const BASE_INFO_MODULES: &[&str] = &["Basic Info", "Profile", "基础信息", "基本信息"];
pub const ASCENSION_MODULES: &[&str] = &["Ascension", "Agent Ascension", "突破", "角色突破"];
pub const BASE_INFO_COMPONENT: &str = "baseInfo";
pub const ASCENSION_COMPONENT: &str = "ascension";

const ATTRIBUTE_KEYS: &[&str] = &["Attribute", "Element", "属性"];
const SPECIALTY_KEYS: &[&str] = &["Specialty", "Specialties", "特性"];
const FACTION_KEYS: &[&str] = &["Faction", "Affiliation", "Camp", "阵营"];
const RARITY_KEYS: &[&str] = &["Rarity", "Rank", "稀有度"];
const ATTACK_TYPE_KEYS: &[&str] = &["Attack Type", "攻击类型"];

const HP_KEYS: &[&str] = &["Base HP", "HP", "基础生命值", "生命值"];
const ATK_KEYS: &[&str] = &["Base ATK", "ATK", "基础攻击力", "攻击力"];
const DEF_KEYS: &[&str] = &["Base DEF", "DEF", "基础防御力", "防御力"];

const IMPACT_KEYS: &[&str] = &["Impact", "冲击力"];
const CRIT_RATE_KEYS: &[&str] = &["CRIT Rate", "Crit Rate", "暴击率"];
const CRIT_DMG_KEYS: &[&str] = &["CRIT DMG", "Crit DMG", "暴击伤害"];
const ANOMALY_MASTERY_KEYS: &[&str] = &["Anomaly Mastery", "异常掌控"];
const ANOMALY_PROFICIENCY_KEYS: &[&str] = &["Anomaly Proficiency", "异常精通"];
const PEN_RATIO_KEYS: &[&str] = &["PEN Ratio", "Pen Ratio", "穿透率"];
const ENERGY_REGEN_KEYS: &[&str] = &["Energy Regen", "能量自动回复", "能量回复"];

/// Key/value rows of one sub-document
type Rows = Vec<(String, Value)>;

/// Rows per ascension level, keyed by canonical level
type LevelRows = BTreeMap<u32, Rows>;

/// Fields whose absence fails the mapping instead of falling back to a default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRequirements {
    required: BTreeSet<RecordField>,
}

impl FieldRequirements {
    pub fn new<I: IntoIterator<Item = RecordField>>(fields: I) -> Self {
        Self {
            required: fields.into_iter().collect(),
        }
    }

    /// Nothing required; every missing field takes its default
    pub fn none() -> Self {
        Self::new([])
    }

    pub fn require(mut self, field: RecordField) -> Self {
        self.required.insert(field);
        self
    }

    pub fn is_required(&self, field: RecordField) -> bool {
        self.required.contains(&field)
    }
}

impl Default for FieldRequirements {
    fn default() -> Self {
        Self::new([
            RecordField::Attributes,
            RecordField::Specialty,
            RecordField::HpCurve,
            RecordField::AtkCurve,
            RecordField::DefCurve,
        ])
    }
}

/// Turns a raw wiki page into an [`AgentRecord`]
pub struct RecordMapper {
    requirements: FieldRequirements,
    dictionaries: &'static Dictionaries,
    span: Span,
}

impl Default for RecordMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordMapper {
    pub fn new() -> Self {
        Self::with_requirements(FieldRequirements::default())
    }

    pub fn with_requirements(requirements: FieldRequirements) -> Self {
        Self {
            requirements,
            dictionaries: Dictionaries::global(),
            span: Span::none(),
        }
    }

    /// Run every mapping inside the given span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn requirements(&self) -> &FieldRequirements {
        &self.requirements
    }

    /// Trimmed page name, used when only a localized name is wanted
    pub fn page_name(payload: &RawPayload) -> Option<String> {
        payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    /// Map a payload. A page without a name falls back to `entry_id`.
    pub fn map(&self, payload: &RawPayload, entry_id: &str, locale: Locale) -> MappingResult<AgentRecord> {
        self.span
            .in_scope(|| self.map_inner(payload, entry_id, entry_id, locale))
    }

    /// Map a payload for an entry. A page without a name falls back to the
    /// entry's display name, then its id.
    pub fn map_entry(&self, payload: &RawPayload, entry: &Entry, locale: Locale) -> MappingResult<AgentRecord> {
        let fallback_name = if entry.display_name.trim().is_empty() {
            entry.id.as_str()
        } else {
            entry.display_name.trim()
        };
        self.span
            .in_scope(|| self.map_inner(payload, &entry.id, fallback_name, locale))
    }

    fn map_inner(
        &self,
        payload: &RawPayload,
        entry_id: &str,
        fallback_name: &str,
        locale: Locale,
    ) -> MappingResult<AgentRecord> {
        let entry_id = entry_id.trim();
        if entry_id.is_empty() {
            return Err(MappingError::missing(RecordField::Id));
        }

        let base_info = decode_component(payload, BASE_INFO_MODULES, BASE_INFO_COMPONENT)
            .and_then(|doc| base_info_rows(&doc));
        let levels = decode_component(payload, ASCENSION_MODULES, ASCENSION_COMPONENT)
            .and_then(|doc| level_rows(&doc));

        let mut failures = Vec::new();

        let page_name = Self::page_name(payload);
        let name = self.settle(
            entry_id,
            RecordField::Name,
            page_name.clone().ok_or(MappingFailure::FieldMissing),
            || fallback_name.to_string(),
            &mut failures,
        );

        let attributes = self.settle(
            entry_id,
            RecordField::Attributes,
            base_info
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|rows| self.extract_attributes(rows, entry_id)),
            || vec![Attribute::Unknown],
            &mut failures,
        );

        let specialty = self.settle(
            entry_id,
            RecordField::Specialty,
            base_info.as_ref().map_err(Clone::clone).and_then(|rows| {
                extract_enum(rows, SPECIALTY_KEYS, &self.dictionaries.specialties, entry_id)
            }),
            || Specialty::Unknown,
            &mut failures,
        );

        let attack_type = self.settle(
            entry_id,
            RecordField::AttackType,
            base_info.as_ref().map_err(Clone::clone).and_then(|rows| {
                extract_enum(rows, ATTACK_TYPE_KEYS, &self.dictionaries.attack_types, entry_id)
            }),
            || AttackType::Unknown,
            &mut failures,
        );

        let rarity = self.settle(
            entry_id,
            RecordField::Rarity,
            base_info.as_ref().map_err(Clone::clone).and_then(|rows| {
                extract_enum(rows, RARITY_KEYS, &self.dictionaries.rarities, entry_id)
            }),
            || Rarity::Unknown,
            &mut failures,
        );

        let faction_ids = self.settle(
            entry_id,
            RecordField::Factions,
            base_info
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|rows| self.extract_factions(rows, entry_id)),
            Vec::new,
            &mut failures,
        );

        let curve = |field: RecordField, keys: &[&str], failures: &mut Vec<MappingError>| {
            self.settle(
                entry_id,
                field,
                levels
                    .as_ref()
                    .map_err(Clone::clone)
                    .and_then(|rows| extract_curve(rows, keys)),
                || vec![0.0; ASCENSION_LEVELS.len()],
                failures,
            )
        };
        let hp = curve(RecordField::HpCurve, HP_KEYS, &mut failures);
        let atk = curve(RecordField::AtkCurve, ATK_KEYS, &mut failures);
        let def = curve(RecordField::DefCurve, DEF_KEYS, &mut failures);

        let stats = self.settle(
            entry_id,
            RecordField::Stats,
            levels
                .as_ref()
                .map_err(Clone::clone)
                .and_then(|rows| extract_stats(rows, entry_id)),
            BaseStats::default,
            &mut failures,
        );

        if let Some(first) = failures.into_iter().next() {
            return Err(first);
        }

        let mut localized_names = BTreeMap::new();
        if let Some(page_name) = page_name {
            localized_names.insert(locale, page_name);
        }

        Ok(AgentRecord {
            id: entry_id.to_string(),
            name,
            localized_names,
            rarity,
            attributes,
            specialty,
            attack_type,
            faction_ids,
            ascension: AscensionCurves { hp, atk, def },
            stats,
            degraded: false,
        })
    }

    /// Resolve one field outcome against the requirements
    fn settle<T>(
        &self,
        entry_id: &str,
        field: RecordField,
        outcome: Result<T, MappingFailure>,
        default: impl FnOnce() -> T,
        failures: &mut Vec<MappingError>,
    ) -> T {
        match outcome {
            Ok(value) => value,
            Err(reason) if self.requirements.is_required(field) => {
                debug!("Entry '{}': required field '{}' failed: {}", entry_id, field, reason);
                failures.push(MappingError::new(field, reason));
                default()
            }
            Err(reason) => {
                debug!("Entry '{}': field '{}' defaulted: {}", entry_id, field, reason);
                default()
            }
        }
    }

    fn extract_attributes(&self, rows: &Rows, entry_id: &str) -> Result<Vec<Attribute>, MappingFailure> {
        let value = find_row(rows, ATTRIBUTE_KEYS)?;
        let tokens = split_tokens(&text_values(value));
        if tokens.is_empty() {
            return Err(MappingFailure::FieldMissing);
        }

        let (attributes, unresolved) = self.dictionaries.attributes.resolve_all(&tokens);
        for token in &unresolved {
            warn!("Entry '{}': unrecognized attribute '{}'", entry_id, token);
        }
        if attributes.is_empty() {
            return Ok(vec![Attribute::Unknown]);
        }
        Ok(attributes)
    }

    fn extract_factions(&self, rows: &Rows, entry_id: &str) -> Result<Vec<u32>, MappingFailure> {
        let value = find_row(rows, FACTION_KEYS)?;
        let names = relation_names(&raw_strings(value));
        if names.is_empty() {
            return Err(MappingFailure::FieldMissing);
        }
        Ok(resolve_relations(&names, &self.dictionaries.factions, entry_id))
    }
}

/// Single-valued enum field; unknown tokens fall back to the type's default
fn extract_enum<T: Copy + PartialEq + Default>(
    rows: &Rows,
    keys: &[&str],
    dictionary: &Dictionary<T>,
    entry_id: &str,
) -> Result<T, MappingFailure> {
    let value = find_row(rows, keys)?;
    let tokens = split_tokens(&text_values(value));
    if tokens.is_empty() {
        return Err(MappingFailure::FieldMissing);
    }

    match tokens.iter().find_map(|t| dictionary.resolve_one(t)) {
        Some(resolved) => Ok(resolved),
        None => {
            warn!("Entry '{}': unrecognized value '{}' for '{}'", entry_id, tokens.join("/"), keys[0]);
            Ok(T::default())
        }
    }
}

/// Locate a module component and decode its `data` string
fn decode_component(payload: &RawPayload, aliases: &[&str], component_id: &str) -> Result<Value, MappingFailure> {
    let module = payload
        .find_module(aliases)
        .ok_or_else(|| MappingFailure::ModuleMissing {
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        })?;

    let component = module
        .find_component(component_id)
        .ok_or_else(|| MappingFailure::ComponentMissing {
            component: component_id.to_string(),
        })?;

    let data = component
        .data
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| MappingFailure::PayloadDecode {
            component: component_id.to_string(),
            message: "component data is empty".to_string(),
        })?;

    serde_json::from_str(data).map_err(|e| MappingFailure::PayloadDecode {
        component: component_id.to_string(),
        message: e.to_string(),
    })
}

/// `{"list":[{"key","value"}]}`, or a plain object of key → value
fn base_info_rows(doc: &Value) -> Result<Rows, MappingFailure> {
    if let Some(list) = doc.get("list").and_then(Value::as_array) {
        return Ok(list
            .iter()
            .filter_map(|item| {
                let key = item.get("key")?.as_str()?;
                Some((key.to_string(), item.get("value").cloned().unwrap_or(Value::Null)))
            })
            .collect());
    }

    match doc.as_object() {
        Some(map) => Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
        None => Err(MappingFailure::FieldMissing),
    }
}

/// Per-level table as a `list` of `{key, combatList}` or an object keyed by level
fn level_rows(doc: &Value) -> Result<LevelRows, MappingFailure> {
    let mut levels = LevelRows::new();

    if let Some(list) = doc.get("list").and_then(Value::as_array) {
        for item in list {
            let Some(level) = item.get("key").and_then(level_key) else {
                continue;
            };
            let rows = item.get("combatList").map(combat_rows).unwrap_or_default();
            levels.entry(level).or_insert(rows);
        }
        return Ok(levels);
    }

    let map = doc.as_object().ok_or(MappingFailure::FieldMissing)?;
    for (key, value) in map {
        let Some(level) = level_key(&Value::String(key.clone())) else {
            continue;
        };
        let rows = match value {
            Value::Object(inner) => match inner.get("combatList") {
                Some(list) => combat_rows(list),
                None => inner
                    .iter()
                    .map(|(k, v)| (k.clone(), first_value(v).clone()))
                    .collect(),
            },
            other => combat_rows(other),
        };
        levels.entry(level).or_insert(rows);
    }
    Ok(levels)
}

/// `[{"key","values":[..]}]` rows, keeping `values[0]`
fn combat_rows(list: &Value) -> Rows {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let key = item.get("key")?.as_str()?;
                    let value = item.get("values").or_else(|| item.get("value"))?;
                    Some((key.to_string(), first_value(value).clone()))
                })
                .collect()
        })
        .unwrap_or_default()
}

static NULL: Value = Value::Null;

fn first_value(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.first().unwrap_or(&NULL),
        other => other,
    }
}

/// Canonical level for a wire key; `"1"` and `"0"` both mean level 0
fn level_key(key: &Value) -> Option<u32> {
    let level = match key {
        Value::String(s) => s.trim().parse::<u32>().ok()?,
        Value::Number(n) => u32::try_from(n.as_u64()?).ok()?,
        _ => return None,
    };
    let level = if level == 1 { 0 } else { level };
    ASCENSION_LEVELS.contains(&level).then_some(level)
}

fn find_row<'r>(rows: &'r Rows, keys: &[&str]) -> Result<&'r Value, MappingFailure> {
    rows.iter()
        .find(|(key, _)| key_matches(key, keys))
        .map(|(_, value)| value)
        .filter(|value| !value.is_null())
        .ok_or(MappingFailure::FieldMissing)
}

fn numeric(value: &Value) -> Result<f64, MappingFailure> {
    let scalar = normalize_json_scalar(value);
    scalar.value().ok_or_else(|| match scalar {
        Scalar::Unrecognized(raw) => MappingFailure::Unrecognized { raw },
        _ => MappingFailure::FieldMissing,
    })
}

/// One value per ascension level, in level order
fn extract_curve(levels: &LevelRows, keys: &[&str]) -> Result<Vec<f64>, MappingFailure> {
    if levels.is_empty() {
        return Err(MappingFailure::FieldMissing);
    }

    ASCENSION_LEVELS
        .iter()
        .map(|level| {
            let rows = levels
                .get(level)
                .ok_or(MappingFailure::LevelMissing { level: *level })?;
            numeric(find_row(rows, keys)?)
        })
        .collect()
}

/// Level-independent stats, read from the highest level carrying each
fn extract_stats(levels: &LevelRows, entry_id: &str) -> Result<BaseStats, MappingFailure> {
    let mut found_any = false;
    let mut read = |keys: &[&str]| -> f64 {
        for rows in levels.values().rev() {
            let Ok(value) = find_row(rows, keys) else {
                continue;
            };
            match numeric(value) {
                Ok(v) => {
                    found_any = true;
                    return v;
                }
                Err(reason) => {
                    warn!("Entry '{}': ignoring stat '{}': {}", entry_id, keys[0], reason);
                }
            }
        }
        0.0
    };

    let stats = BaseStats {
        impact: read(IMPACT_KEYS),
        crit_rate: read(CRIT_RATE_KEYS),
        crit_dmg: read(CRIT_DMG_KEYS),
        anomaly_mastery: read(ANOMALY_MASTERY_KEYS),
        anomaly_proficiency: read(ANOMALY_PROFICIENCY_KEYS),
        pen_ratio: read(PEN_RATIO_KEYS),
        energy_regen: read(ENERGY_REGEN_KEYS),
    };

    if found_any {
        Ok(stats)
    } else {
        Err(MappingFailure::FieldMissing)
    }
}

/// Normalize a raw per-level progression, e.g. `["-", "1000", …]`.
/// Exactly one cell per ascension level is accepted.
pub fn normalize_curve<S: AsRef<str>>(raw: &[S]) -> Result<Vec<f64>, MappingFailure> {
    let curve = raw
        .iter()
        .map(|cell| numeric(&Value::String(cell.as_ref().to_string())))
        .collect::<Result<Vec<f64>, _>>()?;

    match curve.len() {
        CURVE_LEN => Ok(curve),
        len if len < CURVE_LEN => Err(MappingFailure::LevelMissing {
            level: ASCENSION_LEVELS[len],
        }),
        len => Err(MappingFailure::Unrecognized {
            raw: format!("{len} levels, expected {CURVE_LEN}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PayloadComponent, PayloadModule};
    use serde_json::json;

    fn component(module: &str, id: &str, data: Value) -> PayloadModule {
        PayloadModule {
            name: module.to_string(),
            components: vec![PayloadComponent {
                component_id: id.to_string(),
                data: Some(data.to_string()),
            }],
        }
    }

    fn ascension(hp: [&str; 7]) -> Value {
        let keys = ["1", "10", "20", "30", "40", "50", "60"];
        let list: Vec<Value> = keys
            .iter()
            .zip(hp.iter())
            .map(|(key, hp)| {
                json!({
                    "key": key,
                    "combatList": [
                        {"key": "Base HP", "values": [hp, "ignored"]},
                        {"key": "Base ATK", "values": ["100"]},
                        {"key": "Base DEF", "values": ["50"]},
                        {"key": "Impact", "values": ["94"]},
                        {"key": "CRIT Rate", "values": ["5%"]},
                    ]
                })
            })
            .collect();
        json!({ "list": list })
    }

    fn payload() -> RawPayload {
        RawPayload {
            id: Some("31".to_string()),
            name: Some(" Ellen Joe ".to_string()),
            modules: vec![
                component(
                    "Basic Info",
                    "baseInfo",
                    json!({"list": [
                        {"key": "Attribute", "value": ["<p>Ice/Frost</p>"]},
                        {"key": "Specialty", "value": ["Attack"]},
                        {"key": "Attack Type", "value": ["Slash"]},
                        {"key": "Rarity", "value": ["S"]},
                        {"key": "Faction", "value": ["$[{\"name\":\"Victoria Housekeeping Co.\"}]$"]},
                    ]}),
                ),
                component(
                    "Ascension",
                    "ascension",
                    ascension(["-", "1000", "1200", "1400", "1600", "1800", "2000"]),
                ),
            ],
        }
    }

    #[test]
    fn test_maps_complete_page() {
        let record = RecordMapper::new().map(&payload(), "1191", Locale::EnUs).unwrap();
        assert_eq!(record.id, "1191");
        assert_eq!(record.name, "Ellen Joe");
        assert_eq!(record.localized_names.get(&Locale::EnUs).map(String::as_str), Some("Ellen Joe"));
        assert_eq!(record.attributes, vec![Attribute::Ice, Attribute::Frost]);
        assert_eq!(record.specialty, Specialty::Attack);
        assert_eq!(record.attack_type, AttackType::Slash);
        assert_eq!(record.rarity, Rarity::S);
        assert_eq!(record.faction_ids, vec![2]);
        assert_eq!(
            record.ascension.hp,
            vec![0.0, 1000.0, 1200.0, 1400.0, 1600.0, 1800.0, 2000.0]
        );
        assert_eq!(record.ascension.atk, vec![100.0; 7]);
        assert_eq!(record.stats.impact, 94.0);
        assert_eq!(record.stats.crit_rate, 5.0);
        assert!(!record.degraded);
    }

    #[test]
    fn test_level_zero_key_is_accepted() {
        let mut page = payload();
        let mut doc = ascension(["-", "1", "2", "3", "4", "5", "6"]);
        doc["list"][0]["key"] = json!("0");
        page.modules[1] = component("Ascension", "ascension", doc);
        let record = RecordMapper::new().map(&page, "1191", Locale::EnUs).unwrap();
        assert_eq!(record.ascension.hp[0], 0.0);
        assert_eq!(record.ascension.hp[6], 6.0);
    }

    #[test]
    fn test_object_keyed_levels() {
        let mut page = payload();
        let mut doc = serde_json::Map::new();
        for (key, hp) in ["1", "10", "20", "30", "40", "50", "60"].iter().zip(1..) {
            doc.insert(
                key.to_string(),
                json!({"HP": [hp.to_string()], "ATK": "10", "DEF": "1,000"}),
            );
        }
        page.modules[1] = component("突破", "ascension", Value::Object(doc));
        let record = RecordMapper::new().map(&page, "1191", Locale::EnUs).unwrap();
        assert_eq!(record.ascension.hp, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(record.ascension.def, vec![1000.0; 7]);
    }

    #[test]
    fn test_broken_component_data_is_payload_decode() {
        let mut page = payload();
        page.modules[1].components[0].data = Some("{not json".to_string());
        let err = RecordMapper::new().map(&page, "1191", Locale::EnUs).unwrap_err();
        assert_eq!(err.field, RecordField::HpCurve);
        assert!(err.is_payload_decode());
    }

    #[test]
    fn test_unrelated_fields_survive_decode_failure() {
        let mut page = payload();
        page.modules[1].components[0].data = Some("{not json".to_string());
        let mapper = RecordMapper::with_requirements(FieldRequirements::none());
        let record = mapper.map(&page, "1191", Locale::EnUs).unwrap();
        assert_eq!(record.attributes, vec![Attribute::Ice, Attribute::Frost]);
        assert_eq!(record.ascension, AscensionCurves::zeroed());
    }

    #[test]
    fn test_missing_level_is_reported() {
        let mut page = payload();
        let mut doc = ascension(["-", "1", "2", "3", "4", "5", "6"]);
        doc["list"].as_array_mut().unwrap().pop();
        page.modules[1] = component("Ascension", "ascension", doc);
        let err = RecordMapper::new().map(&page, "1191", Locale::EnUs).unwrap_err();
        assert_eq!(err.reason, MappingFailure::LevelMissing { level: 60 });
    }

    #[test]
    fn test_missing_module_and_optional_fields() {
        let mut page = payload();
        page.modules.truncate(1);
        page.name = None;
        let err = RecordMapper::new().map(&page, "1191", Locale::EnUs).unwrap_err();
        assert!(matches!(err.reason, MappingFailure::ModuleMissing { .. }));

        let mapper = RecordMapper::with_requirements(FieldRequirements::none());
        let entry = Entry::new("1191", "31", "Ellen");
        let record = mapper.map_entry(&page, &entry, Locale::EnUs).unwrap();
        assert_eq!(record.name, "Ellen");
        assert!(record.localized_names.is_empty());
        assert_eq!(record.stats, BaseStats::default());
    }

    #[test]
    fn test_unrecognized_enum_values_fall_back() {
        let mut page = payload();
        page.modules[0] = component(
            "基础信息",
            "baseInfo",
            json!({"list": [
                {"key": "属性", "value": ["风"]},
                {"key": "特性", "value": ["命破"]},
            ]}),
        );
        let record = RecordMapper::new().map(&page, "1191", Locale::ZhCn).unwrap();
        assert_eq!(record.attributes, vec![Attribute::Unknown]);
        assert_eq!(record.specialty, Specialty::Rupture);
        assert_eq!(record.attack_type, AttackType::Unknown);
        assert!(record.faction_ids.is_empty());
    }

    #[test]
    fn test_required_optional_field_fails() {
        let mut page = payload();
        page.modules[0] = component(
            "Basic Info",
            "baseInfo",
            json!({"list": [
                {"key": "Attribute", "value": ["Fire"]},
                {"key": "Specialty", "value": ["Stun"]},
            ]}),
        );
        let mapper = RecordMapper::with_requirements(FieldRequirements::default().require(RecordField::Factions));
        let err = mapper.map(&page, "1191", Locale::EnUs).unwrap_err();
        assert_eq!(err, MappingError::missing(RecordField::Factions));
    }

    #[test]
    fn test_blank_entry_id_fails() {
        let err = RecordMapper::new().map(&payload(), "  ", Locale::EnUs).unwrap_err();
        assert_eq!(err.field, RecordField::Id);
    }

    #[test]
    fn test_normalize_curve() {
        let curve = normalize_curve(&["-", "1000", "1200", "1400", "1600", "1800", "2000"]).unwrap();
        assert_eq!(curve, vec![0.0, 1000.0, 1200.0, 1400.0, 1600.0, 1800.0, 2000.0]);
        let err = normalize_curve(&["-", "n/a"]).unwrap_err();
        assert_eq!(err, MappingFailure::Unrecognized { raw: "n/a".to_string() });
        let err = normalize_curve(&["100", "200"]).unwrap_err();
        assert_eq!(err, MappingFailure::LevelMissing { level: 20 });
        assert!(normalize_curve(&["1"; 8]).is_err());
    }
}
