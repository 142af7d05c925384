/*!
 Token Dictionary

 Central definition of the closed sets the wiki writes as free text:
  - Attributes (including composite sub-attributes that expand to their base)
  - Specialties, attack types and rarity ranks
  - Factions, keyed by their stable numeric id

 Every set is a static descriptor table. Lookups go through a normalized
 alias map built once, so callers never match raw strings themselves.

 Usage pattern:
   let dict = Dictionaries::global();
   let attrs = dict.attributes.lookup("霜烈"); // -> Some(&[Ice, Frost])
   let faction = dict.factions.lookup("Section 6"); // -> Some(&[6])
*/

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::models::{AttackType, Attribute, Rarity, Specialty};

/// Descriptor for one canonical token
pub struct TokenDescriptor<T: 'static> {
    pub canonical: &'static str,
    /// Values the token resolves to, in output order
    pub values: &'static [T],
    pub aliases: &'static [&'static str],
}

macro_rules! td {
    ($canonical:expr, [$($value:expr),+ $(,)?], [$($alias:expr),* $(,)?]) => {
        TokenDescriptor {
            canonical: $canonical,
            values: &[$($value),+],
            aliases: &[$($alias),*],
        }
    };
}

static ATTRIBUTE_TOKENS: &[TokenDescriptor<Attribute>] = &[
    td!("Physical", [Attribute::Physical], ["物理", "Physical DMG"]),
    td!("Fire", [Attribute::Fire], ["火", "Fire DMG"]),
    td!("Ice", [Attribute::Ice], ["冰", "Ice DMG"]),
    td!("Electric", [Attribute::Electric], ["电", "Electric DMG"]),
    td!("Ether", [Attribute::Ether], ["以太", "Ether DMG"]),
    td!("Frost", [Attribute::Ice, Attribute::Frost], ["霜烈"]),
    td!("Auric Ink", [Attribute::Ether, Attribute::AuricInk], ["玄墨", "AuricInk"]),
];

static SPECIALTY_TOKENS: &[TokenDescriptor<Specialty>] = &[
    td!("Attack", [Specialty::Attack], ["强攻"]),
    td!("Stun", [Specialty::Stun], ["击破"]),
    td!("Anomaly", [Specialty::Anomaly], ["异常"]),
    td!("Support", [Specialty::Support], ["支援"]),
    td!("Defense", [Specialty::Defense], ["防护", "Defence"]),
    td!("Rupture", [Specialty::Rupture], ["命破"]),
];

static ATTACK_TYPE_TOKENS: &[TokenDescriptor<AttackType>] = &[
    td!("Strike", [AttackType::Strike], ["打击"]),
    td!("Slash", [AttackType::Slash], ["斩击"]),
    td!("Pierce", [AttackType::Pierce], ["穿透"]),
];

static RARITY_TOKENS: &[TokenDescriptor<Rarity>] = &[
    td!("S", [Rarity::S], ["S-Rank", "S Rank", "S级", "Rank S"]),
    td!("A", [Rarity::A], ["A-Rank", "A Rank", "A级", "Rank A"]),
];

static FACTION_TOKENS: &[TokenDescriptor<u32>] = &[
    td!("Cunning Hares", [1], ["狡兔屋"]),
    td!(
        "Victoria Housekeeping Co.",
        [2],
        ["Victoria Housekeeping", "维多利亚家政"]
    ),
    td!("Belobog Heavy Industries", [3], ["白祇重工"]),
    td!("Sons of Calydon", [4], ["卡吕冬之子"]),
    td!("Obol Squad", [5], ["奥波勒斯小队"]),
    td!(
        "Hollow Special Operations Section 6",
        [6],
        ["Section 6", "H.S.O.S.6", "对空洞特别行动部第六课"]
    ),
    td!(
        "Criminal Investigation Special Response Team",
        [7],
        ["刑侦特勤组"]
    ),
    td!("Stars of Lyra", [8], ["天琴座"]),
    td!("Mockingbird", [9], ["反舌鸟"]),
    td!("Yunkui Summit", [10], ["云岿山"]),
    td!("Spook Shack", [11], ["怪啖屋"]),
];

/// Lookup key: trimmed, lowercased, inner whitespace collapsed
pub fn lookup_key(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Alias index over one descriptor table
pub struct Dictionary<T: 'static> {
    descriptors: &'static [TokenDescriptor<T>],
    alias_to_index: HashMap<String, usize>,
}

impl<T: Copy + PartialEq + 'static> Dictionary<T> {
    fn new(descriptors: &'static [TokenDescriptor<T>]) -> Self {
        let mut alias_to_index = HashMap::new();
        for (index, d) in descriptors.iter().enumerate() {
            for name in std::iter::once(&d.canonical).chain(d.aliases.iter()) {
                // Duplicate aliases keep the first definition
                alias_to_index.entry(lookup_key(name)).or_insert(index);
            }
        }
        Self {
            descriptors,
            alias_to_index,
        }
    }

    /// Values a raw token resolves to
    pub fn lookup(&self, raw: &str) -> Option<&'static [T]> {
        self.descriptor(raw).map(|d| d.values)
    }

    /// Canonical spelling of a raw token
    pub fn canonical(&self, raw: &str) -> Option<&'static str> {
        self.descriptor(raw).map(|d| d.canonical)
    }

    /// Single-valued lookup; composite tokens yield their last value
    pub fn resolve_one(&self, raw: &str) -> Option<T> {
        self.lookup(raw).and_then(|values| values.last().copied())
    }

    /// Resolve every token, keeping first-seen order without duplicates.
    /// Tokens with no entry are returned separately.
    pub fn resolve_all<S: AsRef<str>>(&self, tokens: &[S]) -> (Vec<T>, Vec<String>) {
        let mut resolved: Vec<T> = Vec::new();
        let mut unresolved = Vec::new();
        for token in tokens {
            match self.lookup(token.as_ref()) {
                Some(values) => {
                    for value in values {
                        if !resolved.contains(value) {
                            resolved.push(*value);
                        }
                    }
                }
                None => unresolved.push(token.as_ref().to_string()),
            }
        }
        (resolved, unresolved)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn descriptor(&self, raw: &str) -> Option<&'static TokenDescriptor<T>> {
        let descriptors = self.descriptors;
        self.alias_to_index
            .get(&lookup_key(raw))
            .and_then(|index| descriptors.get(*index))
    }
}

/// Every dictionary the mapper consults
pub struct Dictionaries {
    pub attributes: Dictionary<Attribute>,
    pub specialties: Dictionary<Specialty>,
    pub attack_types: Dictionary<AttackType>,
    pub rarities: Dictionary<Rarity>,
    pub factions: Dictionary<u32>,
}

impl Dictionaries {
    fn new() -> Self {
        Self {
            attributes: Dictionary::new(ATTRIBUTE_TOKENS),
            specialties: Dictionary::new(SPECIALTY_TOKENS),
            attack_types: Dictionary::new(ATTACK_TYPE_TOKENS),
            rarities: Dictionary::new(RARITY_TOKENS),
            factions: Dictionary::new(FACTION_TOKENS),
        }
    }

    /// Global singleton accessor
    pub fn global() -> &'static Self {
        static DICTIONARIES: OnceLock<Dictionaries> = OnceLock::new();
        DICTIONARIES.get_or_init(Dictionaries::new)
    }
}
