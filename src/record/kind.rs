//! Entity kinds and their per-kind data

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Label locale of a finding aid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locale {
    /// Selected when the document's language code equals the primary token.
    Dutch,
    /// Fallback for every other (or missing) language code.
    English,
}

/// Closed set of name-entity kinds a record can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EntityKind {
    Geographic,
    Person,
    Organization,
}

struct KindData {
    code: &'static str,
    encoding_analog: &'static str,
    label_english: &'static str,
    label_dutch: &'static str,
    element_name: &'static str,
    rank: u8,
}

const GEOGRAPHIC: KindData = KindData {
    code: "geog",
    encoding_analog: "651$a",
    label_english: "Geographic Names",
    label_dutch: "Geografische namen",
    element_name: "geogname",
    rank: 0,
};

const PERSON: KindData = KindData {
    code: "pers",
    encoding_analog: "600$a",
    label_english: "Persons",
    label_dutch: "Personen",
    element_name: "persname",
    rank: 1,
};

const ORGANIZATION: KindData = KindData {
    code: "corp",
    encoding_analog: "610$a",
    label_english: "Organizations",
    label_dutch: "Organisaties",
    element_name: "corpname",
    rank: 2,
};

impl EntityKind {
    /// Every kind, in canonical subgroup order.
    pub const ALL: [EntityKind; 3] = [Self::Geographic, Self::Person, Self::Organization];

    fn data(self) -> &'static KindData {
        match self {
            Self::Geographic => &GEOGRAPHIC,
            Self::Person => &PERSON,
            Self::Organization => &ORGANIZATION,
        }
    }

    /// Short type code, also used in record keys (`pers`, `corp`, `geog`).
    pub fn code(self) -> &'static str {
        self.data().code
    }

    /// Value written to a leaf's `encodinganalog` attribute.
    pub fn encoding_analog(self) -> &'static str {
        self.data().encoding_analog
    }

    /// Tag used both to count occurrences and to create new leaves.
    pub fn element_name(self) -> &'static str {
        self.data().element_name
    }

    pub fn label(self, locale: Locale) -> &'static str {
        match locale {
            Locale::Dutch => self.data().label_dutch,
            Locale::English => self.data().label_english,
        }
    }

    /// True when `text` (trimmed) is this kind's label in any locale.
    pub fn matches_label(self, text: &str) -> bool {
        let text = text.trim();
        text == self.data().label_dutch || text == self.data().label_english
    }

    /// The kind whose label (in any locale) equals `text`.
    pub fn from_label(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.matches_label(text))
    }

    /// Position in the canonical subgroup order; lower sorts first.
    pub fn rank(self) -> u8 {
        self.data().rank
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Raised for a kind string outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind: {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.code() == key)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

impl TryFrom<String> for EntityKind {
    type Error = UnknownKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityKind> for String {
    fn from(kind: EntityKind) -> Self {
        kind.code().to_string()
    }
}
