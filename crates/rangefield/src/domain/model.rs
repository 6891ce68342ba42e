//! Domain models for range sections and selection axes.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::RangeError;

/// Addresses one of the two sections of a range field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Lower,
    Upper,
}

impl Axis {
    /// Both axes in presentation order.
    pub const ALL: [Axis; 2] = [Axis::Lower, Axis::Upper];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Lower => "lower",
            Axis::Upper => "upper",
        }
    }

    /// The opposite axis.
    pub fn other(&self) -> Axis {
        match self {
            Axis::Lower => Axis::Upper,
            Axis::Upper => Axis::Lower,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Axis {
    type Err = AxisParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "lower" | "min" => Ok(Axis::Lower),
            "upper" | "max" => Ok(Axis::Upper),
            other => Err(AxisParseError::UnknownAxis(other.to_string())),
        }
    }
}

/// Error returned when parsing an [`Axis`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum AxisParseError {
    #[error("unknown axis '{0}', expected 'lower' or 'upper'")]
    UnknownAxis(String),
}

/// An immutable, named, ordered set of selectable choices.
///
/// `ordered_keys` is always an exact permutation of the keys of `choices`; the constructor
/// refuses anything else. A reverse index keeps `index_of_key` constant time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RangeSectionSpec", into = "RangeSectionSpec")]
pub struct RangeSection {
    key: String,
    choices: BTreeMap<String, String>,
    ordered_keys: Vec<String>,
    positions: HashMap<String, usize>,
}

impl RangeSection {
    /// Build a section from its role key, a choice-key → label mapping and the presentation
    /// order of the choice keys.
    pub fn new<K, L, I, O, S>(key: impl Into<String>, choices: I, ordered_keys: O) -> Result<Self, RangeError>
    where
        K: Into<String>,
        L: Into<String>,
        I: IntoIterator<Item = (K, L)>,
        O: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let key = key.into();
        let mut map = BTreeMap::new();
        for (choice, label) in choices {
            let choice: String = choice.into();
            if map.contains_key(&choice) {
                return Err(RangeError::InvalidSection {
                    section: key,
                    reason: format!("choice `{choice}` declared more than once"),
                });
            }
            map.insert(choice, label.into());
        }
        let ordered: Vec<String> = ordered_keys.into_iter().map(Into::into).collect();
        Self::validated(key, map, ordered)
    }

    /// Build a section whose presentation order is the order of `pairs`.
    pub fn from_ordered_pairs<K, L, I>(key: impl Into<String>, pairs: I) -> Result<Self, RangeError>
    where
        K: Into<String>,
        L: Into<String>,
        I: IntoIterator<Item = (K, L)>,
    {
        let pairs: Vec<(String, String)> = pairs
            .into_iter()
            .map(|(choice, label)| (choice.into(), label.into()))
            .collect();
        let ordered: Vec<String> = pairs.iter().map(|(choice, _)| choice.clone()).collect();
        Self::new(key, pairs, ordered)
    }

    fn validated(
        key: String,
        choices: BTreeMap<String, String>,
        ordered_keys: Vec<String>,
    ) -> Result<Self, RangeError> {
        let invalid = |reason: String| RangeError::InvalidSection {
            section: key.clone(),
            reason,
        };

        let mut positions = HashMap::with_capacity(ordered_keys.len());
        for (index, choice) in ordered_keys.iter().enumerate() {
            if !choices.contains_key(choice) {
                return Err(invalid(format!("ordered key `{choice}` has no matching choice")));
            }
            if positions.insert(choice.clone(), index).is_some() {
                return Err(invalid(format!("ordered key `{choice}` appears more than once")));
            }
        }

        if positions.len() != choices.len() {
            let missing: Vec<&str> = choices
                .keys()
                .filter(|choice| !positions.contains_key(*choice))
                .map(String::as_str)
                .collect();
            return Err(invalid(format!(
                "choices missing from ordered keys: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            key,
            choices,
            ordered_keys,
            positions,
        })
    }

    /// Role of this section within its field, e.g. `lower` or `unit`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Choice keys in presentation order.
    pub fn ordered_keys(&self) -> &[String] {
        &self.ordered_keys
    }

    pub fn len(&self) -> usize {
        self.ordered_keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_keys.is_empty()
    }

    pub fn contains_key(&self, choice: &str) -> bool {
        self.choices.contains_key(choice)
    }

    /// Label shown for `choice`.
    pub fn label_for_key(&self, choice: &str) -> Result<&str, RangeError> {
        self.choices
            .get(choice)
            .map(String::as_str)
            .ok_or_else(|| self.unknown_choice(choice))
    }

    /// Choice key presented at row `index`.
    pub fn key_at_index(&self, index: usize) -> Result<&str, RangeError> {
        self.ordered_keys
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| RangeError::IndexOutOfRange {
                section: self.key.clone(),
                index,
                len: self.ordered_keys.len(),
            })
    }

    /// Row at which `choice` is presented.
    pub fn index_of_key(&self, choice: &str) -> Result<usize, RangeError> {
        self.positions
            .get(choice)
            .copied()
            .ok_or_else(|| self.unknown_choice(choice))
    }

    /// Iterate `(key, label)` pairs in presentation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.ordered_keys.iter().map(move |choice| {
            let label = self.choices.get(choice).map(String::as_str).unwrap_or_default();
            (choice.as_str(), label)
        })
    }

    fn unknown_choice(&self, choice: &str) -> RangeError {
        RangeError::UnknownChoice {
            section: self.key.clone(),
            key: choice.to_string(),
        }
    }
}

/// Serialized shape of a [`RangeSection`]; deserialization goes through the validating
/// constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeSectionSpec {
    pub key: String,
    pub choices: BTreeMap<String, String>,
    pub ordered_keys: Vec<String>,
}

impl TryFrom<RangeSectionSpec> for RangeSection {
    type Error = RangeError;

    fn try_from(spec: RangeSectionSpec) -> Result<Self, Self::Error> {
        RangeSection::validated(spec.key, spec.choices, spec.ordered_keys)
    }
}

impl From<RangeSection> for RangeSectionSpec {
    fn from(section: RangeSection) -> Self {
        Self {
            key: section.key,
            choices: section.choices,
            ordered_keys: section.ordered_keys,
        }
    }
}
