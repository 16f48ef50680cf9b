//! Tower layouts given on the command line as `SLOT:FAMILY[/UPGRADE]`.

use std::str::FromStr;

use dam_defense_core::{SlotId, TowerFamily, UpgradeKind};

const SLOT_DELIMITER: char = ':';
const UPGRADE_DELIMITER: char = '/';

/// One tower the autoplayer builds, and optionally upgrades once affordable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TowerPlan {
    /// Slot receiving the tower.
    pub slot: SlotId,
    /// Base family placed first.
    pub family: TowerFamily,
    /// Branch applied when gold allows.
    pub upgrade: Option<UpgradeKind>,
}

/// Errors raised while parsing a tower plan.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum LayoutError {
    /// The entry was empty or contained only whitespace.
    #[error("tower plan was empty")]
    Empty,
    /// The entry lacked the `SLOT:` prefix.
    #[error("tower plan '{0}' is missing the slot prefix")]
    MissingSlot(String),
    /// The slot was not a non-negative integer.
    #[error("could not parse slot '{0}'")]
    InvalidSlot(String),
    /// The family name is not a base family.
    #[error("'{0}' is not a tower family")]
    UnknownFamily(String),
    /// The upgrade name is not an upgrade branch.
    #[error("'{0}' is not an upgrade branch")]
    UnknownUpgrade(String),
    /// The upgrade belongs to a different family.
    #[error("{upgrade} does not upgrade {family}")]
    ForeignUpgrade {
        /// Family placed.
        family: &'static str,
        /// Upgrade requested.
        upgrade: &'static str,
    },
}

impl FromStr for TowerPlan {
    type Err = LayoutError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutError::Empty);
        }

        let (slot, tower) = trimmed
            .split_once(SLOT_DELIMITER)
            .ok_or_else(|| LayoutError::MissingSlot(trimmed.to_owned()))?;
        let slot = slot
            .trim()
            .parse::<u32>()
            .map(SlotId::new)
            .map_err(|_| LayoutError::InvalidSlot(slot.to_owned()))?;

        let (family, upgrade) = match tower.split_once(UPGRADE_DELIMITER) {
            Some((family, upgrade)) => (family, Some(upgrade)),
            None => (tower, None),
        };
        let family = family
            .trim()
            .parse::<TowerFamily>()
            .map_err(|_| LayoutError::UnknownFamily(family.trim().to_owned()))?;
        let upgrade = upgrade
            .map(|name| {
                name.trim()
                    .parse::<UpgradeKind>()
                    .map_err(|_| LayoutError::UnknownUpgrade(name.trim().to_owned()))
            })
            .transpose()?;

        if let Some(kind) = upgrade {
            if kind.base_family() != family {
                return Err(LayoutError::ForeignUpgrade {
                    family: family.as_str(),
                    upgrade: kind.as_str(),
                });
            }
        }

        Ok(Self {
            slot,
            family,
            upgrade,
        })
    }
}
