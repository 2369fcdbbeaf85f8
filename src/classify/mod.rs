//! Tag classification: an ordered, first-match-wins rule list mapping
//! feature tags to a land-use sector.

use serde::{Deserialize, Serialize};

use crate::feature::{Sector, Tags};

/// A single predicate: the feature's `key` tag equals one of `values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierRule {
    pub sector: Sector,
    pub key: String,
    pub values: Vec<String>,
}

impl ClassifierRule {
    pub fn new(sector: Sector, key: &str, values: &[&str]) -> Self {
        Self {
            sector,
            key: key.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[inline]
    pub fn matches(&self, tags: &Tags) -> bool {
        tags.get(&self.key)
            .is_some_and(|value| self.values.iter().any(|v| v == value))
    }
}

/// Built-in rule table. Order is significant: residential, retail, industrial, agricultural.
const DEFAULT_RULES: &[(Sector, &str, &[&str])] = &[
    (Sector::Residential,  "landuse",  &["residential"]),
    (Sector::Retail,       "landuse",  &["commercial", "retail", "industrial;retail"]),
    (Sector::Industrial,   "landuse",  &["industrial", "port"]),
    (Sector::Industrial,   "man_made", &["wastewater_plant", "works"]),
    (Sector::Industrial,   "aeroway",  &["terminal", "gate"]),
    (Sector::Agricultural, "landuse",  &["farmyard", "greenhouse_horticulture"]),
];

/// Pure function of tags: the same tags always yield the same sector.
#[derive(Debug, Clone)]
pub struct TagClassifier {
    rules: Vec<ClassifierRule>,
}

impl Default for TagClassifier {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.iter()
                .map(|&(sector, key, values)| ClassifierRule::new(sector, key, values))
                .collect(),
        }
    }
}

impl TagClassifier {
    /// Build a classifier from an explicit rule list, applied in the given order.
    pub fn new(rules: Vec<ClassifierRule>) -> Self { Self { rules } }

    #[inline] pub fn rules(&self) -> &[ClassifierRule] { &self.rules }

    /// Sector of the first matching rule, or `Unclassified` if none match.
    pub fn classify(&self, tags: &Tags) -> Sector {
        self.rules.iter()
            .find(|rule| rule.matches(tags))
            .map_or(Sector::Unclassified, |rule| rule.sector)
    }

    /// The eligible universe is the union of all sector predicates.
    #[inline]
    pub fn is_eligible(&self, tags: &Tags) -> bool {
        self.rules.iter().any(|rule| rule.matches(tags))
    }
}
