//! Sort options for the Huis player rankings.
//!
//! The set of options is closed: every rankable metric comes as a descending
//! and an ascending pair, and adding one means adding a variant here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when a sort id does not name a known option
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// No option carries this id
    #[error("Unknown sort option: '{0}'. Run `pp-gateway sorts` for the valid ids")]
    NotFound(String),
}

/// Sorting and ordering options for the global player rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerSort {
    OldPpDesc,
    OldPpAsc,
    NewPpDesc,
    NewPpAsc,
    PpDifferenceDesc,
    PpDifferenceAsc,
    AimPpDesc,
    AimPpAsc,
    TapPpDesc,
    TapPpAsc,
    AccPpDesc,
    AccPpAsc,
    FlPpDesc,
    FlPpAsc,
    BonusPpDesc,
    BonusPpAsc,
    NewPpExclBonusDesc,
    NewPpExclBonusAsc,
}

impl PlayerSort {
    /// Returns every sort option, in the order they should be offered to users.
    pub fn all() -> &'static [PlayerSort] {
        &[
            PlayerSort::OldPpDesc,
            PlayerSort::OldPpAsc,
            PlayerSort::NewPpDesc,
            PlayerSort::NewPpAsc,
            PlayerSort::PpDifferenceDesc,
            PlayerSort::PpDifferenceAsc,
            PlayerSort::AimPpDesc,
            PlayerSort::AimPpAsc,
            PlayerSort::TapPpDesc,
            PlayerSort::TapPpAsc,
            PlayerSort::AccPpDesc,
            PlayerSort::AccPpAsc,
            PlayerSort::FlPpDesc,
            PlayerSort::FlPpAsc,
            PlayerSort::BonusPpDesc,
            PlayerSort::BonusPpAsc,
            PlayerSort::NewPpExclBonusDesc,
            PlayerSort::NewPpExclBonusAsc,
        ]
    }

    /// The value of the `sort` parameter in Huis API requests.
    pub fn code(&self) -> &'static str {
        match self {
            PlayerSort::OldPpDesc | PlayerSort::OldPpAsc => "old_pp",
            PlayerSort::NewPpDesc | PlayerSort::NewPpAsc => "new_pp_incl_bonus",
            PlayerSort::PpDifferenceDesc | PlayerSort::PpDifferenceAsc => "pp_change",
            PlayerSort::AimPpDesc | PlayerSort::AimPpAsc => "weighted_aim_pp",
            PlayerSort::TapPpDesc | PlayerSort::TapPpAsc => "weighted_tap_pp",
            PlayerSort::AccPpDesc | PlayerSort::AccPpAsc => "weighted_acc_pp",
            PlayerSort::FlPpDesc | PlayerSort::FlPpAsc => "weighted_fl_pp",
            PlayerSort::BonusPpDesc | PlayerSort::BonusPpAsc => "bonus_pp",
            PlayerSort::NewPpExclBonusDesc | PlayerSort::NewPpExclBonusAsc => "new_pp_excl_bonus",
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(
            self,
            PlayerSort::OldPpAsc
                | PlayerSort::NewPpAsc
                | PlayerSort::PpDifferenceAsc
                | PlayerSort::AimPpAsc
                | PlayerSort::TapPpAsc
                | PlayerSort::AccPpAsc
                | PlayerSort::FlPpAsc
                | PlayerSort::BonusPpAsc
                | PlayerSort::NewPpExclBonusAsc
        )
    }

    /// `"asc"` or `"desc"`, as used in ids and the `order` parameter.
    pub fn order(&self) -> &'static str {
        if self.is_ascending() {
            "asc"
        } else {
            "desc"
        }
    }

    /// Human-readable label shown in selection lists.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerSort::OldPpDesc => "Old PP (Descending)",
            PlayerSort::OldPpAsc => "Old PP (Ascending)",
            PlayerSort::NewPpDesc => "New PP (Descending)",
            PlayerSort::NewPpAsc => "New PP (Ascending)",
            PlayerSort::PpDifferenceDesc => "PP Difference (Descending)",
            PlayerSort::PpDifferenceAsc => "PP Difference (Ascending)",
            PlayerSort::AimPpDesc => "Weighted Aim PP (Descending)",
            PlayerSort::AimPpAsc => "Weighted Aim PP (Ascending)",
            PlayerSort::TapPpDesc => "Weighted Tap PP (Descending)",
            PlayerSort::TapPpAsc => "Weighted Tap PP (Ascending)",
            PlayerSort::AccPpDesc => "Weighted Acc PP (Descending)",
            PlayerSort::AccPpAsc => "Weighted Acc PP (Ascending)",
            PlayerSort::FlPpDesc => "Weighted FL PP (Descending)",
            PlayerSort::FlPpAsc => "Weighted FL PP (Ascending)",
            PlayerSort::BonusPpDesc => "Bonus PP (Descending)",
            PlayerSort::BonusPpAsc => "Bonus PP (Ascending)",
            PlayerSort::NewPpExclBonusDesc => "New PP Excl. Bonus (Descending)",
            PlayerSort::NewPpExclBonusAsc => "New PP Excl. Bonus (Ascending)",
        }
    }

    /// Stable identifier combining code and order, e.g. `old_pp_desc`.
    ///
    /// This is the key consumers persist and pass back in.
    pub fn id(&self) -> String {
        format!("{}_{}", self.code(), self.order())
    }

    /// Looks up the option with the given id.
    ///
    /// There is no fallback: an unknown id is an error.
    pub fn from_id(id: &str) -> Result<PlayerSort, SortError> {
        Self::all()
            .iter()
            .copied()
            .find(|sort| sort.id() == id)
            .ok_or_else(|| SortError::NotFound(id.to_string()))
    }
}

impl fmt::Display for PlayerSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for PlayerSort {
    type Err = SortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s.trim())
    }
}

impl Serialize for PlayerSort {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> Deserialize<'de> for PlayerSort {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        Self::from_id(&id).map_err(serde::de::Error::custom)
    }
}
