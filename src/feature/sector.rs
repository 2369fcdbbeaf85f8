use std::fmt;

use serde::{Deserialize, Serialize};

/// Land-use sector a feature is partitioned into.
/// `Unclassified` (code 0) never appears in a sector view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    #[default]
    Unclassified,
    Residential,
    Retail,
    Industrial,
    Agricultural,
}

impl Sector {
    /// The four partitioned sectors, in rule application order.
    pub const ALL: [Sector; 4] = [
        Sector::Residential,
        Sector::Retail,
        Sector::Industrial,
        Sector::Agricultural,
    ];

    /// Integer code as stored in the output tables.
    #[inline]
    pub fn code(self) -> u8 {
        match self {
            Sector::Unclassified => 0,
            Sector::Residential  => 1,
            Sector::Retail       => 2,
            Sector::Industrial   => 3,
            Sector::Agricultural => 4,
        }
    }

    pub fn to_str(self) -> &'static str {
        match self {
            Sector::Unclassified => "unclassified",
            Sector::Residential  => "residential",
            Sector::Retail       => "retail",
            Sector::Industrial   => "industrial",
            Sector::Agricultural => "agricultural",
        }
    }

    #[inline]
    pub fn is_classified(self) -> bool { self != Sector::Unclassified }

    /// Slot of a classified sector in `Sector::ALL`.
    #[inline]
    pub(crate) fn slot(self) -> Option<usize> {
        match self {
            Sector::Unclassified => None,
            other => Some(other.code() as usize - 1),
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_table() {
        assert_eq!(Sector::Unclassified.code(), 0);
        assert_eq!(Sector::Residential.code(), 1);
        assert_eq!(Sector::Retail.code(), 2);
        assert_eq!(Sector::Industrial.code(), 3);
        assert_eq!(Sector::Agricultural.code(), 4);
    }

    #[test]
    fn slots_follow_all_order() {
        for (i, sector) in Sector::ALL.iter().enumerate() {
            assert_eq!(sector.slot(), Some(i));
        }
        assert_eq!(Sector::Unclassified.slot(), None);
    }
}
