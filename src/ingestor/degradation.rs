//! Last-resort records built from entry data alone

use std::collections::BTreeMap;

use crate::errors::{MappingError, MappingResult};
use crate::models::{
    AgentRecord, AscensionCurves, AttackType, Attribute, BaseStats, Entry, Rarity, RecordField,
    Specialty,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct DegradationBuilder;

impl DegradationBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Minimal valid record for an entry. Fails only for a blank entry id.
    pub fn build_minimal(&self, entry: &Entry) -> MappingResult<AgentRecord> {
        if !entry.has_valid_id() {
            return Err(MappingError::missing(RecordField::Id));
        }

        let id = entry.id.trim().to_string();
        let name = match entry.display_name.trim() {
            "" => id.clone(),
            display_name => display_name.to_string(),
        };

        Ok(AgentRecord {
            id,
            name,
            localized_names: BTreeMap::new(),
            rarity: Rarity::Unknown,
            attributes: vec![Attribute::Unknown],
            specialty: Specialty::Unknown,
            attack_type: AttackType::Unknown,
            faction_ids: Vec::new(),
            ascension: AscensionCurves::zeroed(),
            stats: BaseStats::default(),
            degraded: true,
        })
    }
}
