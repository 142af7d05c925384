//! The mapped agent record and its closed-set field types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::Locale;

/// Ascension checkpoints indexing every per-level curve
pub const ASCENSION_LEVELS: [u32; 7] = [0, 10, 20, 30, 40, 50, 60];

/// Number of points on a per-level curve
pub const CURVE_LEN: usize = ASCENSION_LEVELS.len();

/// Elemental attribute of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Physical,
    Fire,
    Ice,
    Electric,
    Ether,
    /// Sub-attribute of ice
    Frost,
    /// Sub-attribute of ether
    AuricInk,
    Unknown,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Physical => "physical",
            Attribute::Fire => "fire",
            Attribute::Ice => "ice",
            Attribute::Electric => "electric",
            Attribute::Ether => "ether",
            Attribute::Frost => "frost",
            Attribute::AuricInk => "auric_ink",
            Attribute::Unknown => "unknown",
        }
    }

    /// The base attribute a sub-attribute belongs to
    pub fn parent(&self) -> Option<Attribute> {
        match self {
            Attribute::Frost => Some(Attribute::Ice),
            Attribute::AuricInk => Some(Attribute::Ether),
            _ => None,
        }
    }
}

/// Combat role of an agent
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    Attack,
    Stun,
    Anomaly,
    Support,
    Defense,
    Rupture,
    #[default]
    Unknown,
}

impl Specialty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Attack => "attack",
            Specialty::Stun => "stun",
            Specialty::Anomaly => "anomaly",
            Specialty::Support => "support",
            Specialty::Defense => "defense",
            Specialty::Rupture => "rupture",
            Specialty::Unknown => "unknown",
        }
    }
}

/// Damage type of basic attacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackType {
    Strike,
    Slash,
    Pierce,
    #[default]
    Unknown,
}

impl AttackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttackType::Strike => "strike",
            AttackType::Slash => "slash",
            AttackType::Pierce => "pierce",
            AttackType::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    S,
    A,
    #[default]
    Unknown,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::S => "s",
            Rarity::A => "a",
            Rarity::Unknown => "unknown",
        }
    }
}

/// Fields of an [`AgentRecord`] that the mapper can be asked to require
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    Id,
    Name,
    Rarity,
    Attributes,
    Specialty,
    AttackType,
    Factions,
    #[serde(rename = "hp")]
    HpCurve,
    #[serde(rename = "atk")]
    AtkCurve,
    #[serde(rename = "def")]
    DefCurve,
    Stats,
}

impl RecordField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Id => "id",
            RecordField::Name => "name",
            RecordField::Rarity => "rarity",
            RecordField::Attributes => "attributes",
            RecordField::Specialty => "specialty",
            RecordField::AttackType => "attack_type",
            RecordField::Factions => "factions",
            RecordField::HpCurve => "hp",
            RecordField::AtkCurve => "atk",
            RecordField::DefCurve => "def",
            RecordField::Stats => "stats",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base stat curves sampled at each ascension level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AscensionCurves {
    pub hp: Vec<f64>,
    pub atk: Vec<f64>,
    pub def: Vec<f64>,
}

impl AscensionCurves {
    /// All three curves at zero
    pub fn zeroed() -> Self {
        Self {
            hp: vec![0.0; CURVE_LEN],
            atk: vec![0.0; CURVE_LEN],
            def: vec![0.0; CURVE_LEN],
        }
    }

    /// Named view used by validation and logging
    pub fn named(&self) -> [(RecordField, &[f64]); 3] {
        [
            (RecordField::HpCurve, self.hp.as_slice()),
            (RecordField::AtkCurve, self.atk.as_slice()),
            (RecordField::DefCurve, self.def.as_slice()),
        ]
    }
}

impl Default for AscensionCurves {
    fn default() -> Self {
        Self::zeroed()
    }
}

/// Level-independent combat stats. Percentage stats hold the magnitude only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub impact: f64,
    pub crit_rate: f64,
    pub crit_dmg: f64,
    pub anomaly_mastery: f64,
    pub anomaly_proficiency: f64,
    pub pen_ratio: f64,
    pub energy_regen: f64,
}

impl BaseStats {
    pub fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("impact", self.impact),
            ("crit_rate", self.crit_rate),
            ("crit_dmg", self.crit_dmg),
            ("anomaly_mastery", self.anomaly_mastery),
            ("anomaly_proficiency", self.anomaly_proficiency),
            ("pen_ratio", self.pen_ratio),
            ("energy_regen", self.energy_regen),
        ]
    }
}

/// A fully mapped agent page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub localized_names: BTreeMap<Locale, String>,
    #[serde(default)]
    pub rarity: Rarity,
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub specialty: Specialty,
    #[serde(default)]
    pub attack_type: AttackType,
    #[serde(default)]
    pub faction_ids: Vec<u32>,
    pub ascension: AscensionCurves,
    #[serde(default)]
    pub stats: BaseStats,
    /// Built from local entry data only, not from a payload
    #[serde(default)]
    pub degraded: bool,
}
