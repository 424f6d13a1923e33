// ── Scan buckets ──
//
// A bucket names one of the per-product counters a session accumulates
// into. Movement sessions flip between `Entries` and `Exits`; validation
// sessions only ever count into `Validated`.

use serde::{Deserialize, Serialize};
use stockscan_api::MovementKind;
use strum::{Display, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Bucket {
    Entries,
    Exits,
    Validated,
}

impl Bucket {
    /// Whether this bucket records stock movements (as opposed to a count).
    pub fn is_movement(self) -> bool {
        !matches!(self, Self::Validated)
    }

    /// The opposite movement bucket. `Validated` has none.
    pub fn toggled(self) -> Option<Self> {
        match self {
            Self::Entries => Some(Self::Exits),
            Self::Exits => Some(Self::Entries),
            Self::Validated => None,
        }
    }

    /// Transaction type sent to the server for movements out of this bucket.
    pub fn movement_kind(self) -> Option<MovementKind> {
        match self {
            Self::Entries => Some(MovementKind::Entree),
            Self::Exits => Some(MovementKind::Sortie),
            Self::Validated => None,
        }
    }

    /// File name stem of the exported document.
    pub fn export_stem(self) -> &'static str {
        match self {
            Self::Entries => "entrees",
            Self::Exits => "sorties",
            Self::Validated => "inventory_validation",
        }
    }

    /// Heading printed at the top of the exported document.
    pub fn document_title(self) -> &'static str {
        match self {
            Self::Entries => "BON D'ENTRÉE",
            Self::Exits => "BON DE SORTIE",
            Self::Validated => "VALIDATION DU STOCK",
        }
    }

    /// Worksheet tab name.
    pub fn sheet_name(self) -> &'static str {
        match self {
            Self::Entries => "Entrées",
            Self::Exits => "Sorties",
            Self::Validated => "Validation",
        }
    }

    /// Operator-facing plural, used in notifications.
    pub fn label(self) -> &'static str {
        match self {
            Self::Entries => "entrées",
            Self::Exits => "sorties",
            Self::Validated => "validations",
        }
    }
}
