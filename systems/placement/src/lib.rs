#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Economy-gated tower construction, sale and upgrades.
//!
//! Player mistakes come back as [`Verdict::Rejected`]; a slot that does not
//! exist on the map is a caller bug and surfaces as [`SimulationError`].

use std::sync::Arc;

use dam_defense_config::Catalog;
use dam_defense_core::{
    Event, Rejection, SimulationError, SlotId, TowerFamily, TowerLevel, UpgradeKind, Verdict,
};
use dam_defense_world::{GameState, GoldManager, Tower};

/// Builds and sells towers on map slots.
#[derive(Debug, Default, Clone, Copy)]
pub struct TowerPlacement;

impl TowerPlacement {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Places a base tower of `family` on an empty slot, debiting its cost.
    pub fn place(
        &self,
        catalog: &Catalog,
        state: &mut GameState,
        slot: SlotId,
        family: TowerFamily,
        out_events: &mut Vec<Event>,
    ) -> Result<Verdict, SimulationError> {
        let position = catalog.slot(slot)?.position;
        let config = catalog.base_tower(family)?;
        if state.towers.contains_key(&slot) {
            return Ok(Verdict::Rejected(Rejection::SlotOccupied));
        }
        if !state.gold.spend(config.cost, out_events) {
            return Ok(Verdict::Rejected(Rejection::InsufficientGold));
        }

        let tower = Tower::new(slot, position, Arc::clone(config));
        let identity = tower.identity();
        let _ = state.towers.insert(slot, tower);
        out_events.push(Event::TowerPlaced {
            slot,
            tower: identity,
            cost: config.cost,
        });
        tracing::debug!(slot = slot.get(), tower = identity.as_str(), "tower placed");
        Ok(Verdict::Applied)
    }

    /// Sells the tower on `slot` for half of everything invested in it.
    pub fn sell(
        &self,
        catalog: &Catalog,
        state: &mut GameState,
        slot: SlotId,
        out_events: &mut Vec<Event>,
    ) -> Result<Verdict, SimulationError> {
        let _ = catalog.slot(slot)?;
        let Some(tower) = state.towers.remove(&slot) else {
            return Ok(Verdict::Rejected(Rejection::NoTower));
        };
        let refund = GoldManager::calculate_refund(tower.total_cost());
        state.gold.earn(refund, out_events);
        out_events.push(Event::TowerSold {
            slot,
            tower: tower.identity(),
            refund,
        });
        tracing::debug!(slot = slot.get(), refund, "tower sold");
        Ok(Verdict::Applied)
    }
}

/// Applies single-tier upgrade branches to base towers.
#[derive(Debug, Default, Clone, Copy)]
pub struct Upgrades;

impl Upgrades {
    /// Creates the system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Branches still open to the tower on `slot`; empty once upgraded.
    pub fn available(
        &self,
        catalog: &Catalog,
        state: &GameState,
        slot: SlotId,
    ) -> Result<Vec<UpgradeKind>, SimulationError> {
        let _ = catalog.slot(slot)?;
        Ok(match state.towers.get(&slot) {
            Some(tower) if tower.level() == TowerLevel::Base => catalog.upgrades_for(tower.family()),
            _ => Vec::new(),
        })
    }

    /// Swaps the tower on `slot` to the `upgrade` branch, debiting only the
    /// branch's own cost.
    pub fn upgrade(
        &self,
        catalog: &Catalog,
        state: &mut GameState,
        slot: SlotId,
        upgrade: UpgradeKind,
        out_events: &mut Vec<Event>,
    ) -> Result<Verdict, SimulationError> {
        let _ = catalog.slot(slot)?;
        let config = catalog.upgrade_tower(upgrade)?;
        let Some(tower) = state.towers.get_mut(&slot) else {
            return Ok(Verdict::Rejected(Rejection::NoTower));
        };
        if tower.level() != TowerLevel::Base {
            return Ok(Verdict::Rejected(Rejection::AlreadyUpgraded));
        }
        if !catalog.upgrades_for(tower.family()).contains(&upgrade) {
            return Ok(Verdict::Rejected(Rejection::UpgradeUnavailable));
        }
        if !state.gold.spend(config.cost, out_events) {
            return Ok(Verdict::Rejected(Rejection::InsufficientGold));
        }

        tower.apply_upgrade(Arc::clone(config));
        out_events.push(Event::TowerUpgraded {
            slot,
            upgrade,
            cost: config.cost,
        });
        tracing::debug!(slot = slot.get(), upgrade = upgrade.as_str(), "tower upgraded");
        Ok(Verdict::Applied)
    }
}
