use dam_defense_config::{Catalog, GameSettings};
use dam_defense_core::{
    Event, Rejection, SimulationError, SlotId, TowerFamily, TowerIdentity, TowerLevel,
    UpgradeKind, Verdict,
};
use dam_defense_system_placement::{TowerPlacement, Upgrades};
use dam_defense_world::GameState;

fn setup() -> (Catalog, GameState) {
    let catalog = Catalog::load_embedded().expect("embedded tables are valid");
    let state = GameState::new(&GameSettings::default());
    (catalog, state)
}

#[test]
fn placing_debits_the_base_cost_and_emits_events() {
    let (catalog, mut state) = setup();
    let mut events = Vec::new();

    let verdict = TowerPlacement::new()
        .place(&catalog, &mut state, SlotId::new(0), TowerFamily::Capable, &mut events)
        .expect("slot exists");

    assert_eq!(verdict, Verdict::Applied);
    assert_eq!(state.gold.balance(), 100);
    let tower = &state.towers[&SlotId::new(0)];
    assert_eq!(tower.position(), catalog.slot(SlotId::new(0)).expect("slot").position);
    assert_eq!(
        events,
        vec![
            Event::GoldChanged {
                amount: -120,
                total: 100,
            },
            Event::TowerPlaced {
                slot: SlotId::new(0),
                tower: TowerIdentity::Base(TowerFamily::Capable),
                cost: 120,
            },
        ]
    );
}

#[test]
fn occupied_slot_and_empty_purse_are_rejected_without_mutation() {
    let (catalog, mut state) = setup();
    let placement = TowerPlacement::new();
    let mut events = Vec::new();
    let slot = SlotId::new(1);

    let _ = placement
        .place(&catalog, &mut state, slot, TowerFamily::Agile, &mut events)
        .expect("slot exists");
    let occupied = placement
        .place(&catalog, &mut state, slot, TowerFamily::Smart, &mut events)
        .expect("slot exists");
    assert_eq!(occupied, Verdict::Rejected(Rejection::SlotOccupied));

    let broke = placement
        .place(&catalog, &mut state, SlotId::new(2), TowerFamily::Smart, &mut events)
        .expect("slot exists");
    assert_eq!(broke, Verdict::Rejected(Rejection::InsufficientGold));
    assert_eq!(state.gold.balance(), 120);
    assert_eq!(state.towers.len(), 1);
}

#[test]
fn unknown_slot_is_a_caller_error() {
    let (catalog, mut state) = setup();
    let mut events = Vec::new();

    let result = TowerPlacement::new().place(
        &catalog,
        &mut state,
        SlotId::new(42),
        TowerFamily::Agile,
        &mut events,
    );

    assert!(matches!(result, Err(SimulationError::UnknownSlot(_))));
    assert!(events.is_empty());
}

#[test]
fn selling_refunds_half_the_cumulative_cost() {
    let (catalog, mut state) = setup();
    let placement = TowerPlacement::new();
    let upgrades = Upgrades::new();
    let mut events = Vec::new();
    let slot = SlotId::new(0);
    state.gold.earn(500, &mut events);

    let _ = placement
        .place(&catalog, &mut state, slot, TowerFamily::Capable, &mut events)
        .expect("slot exists");
    let _ = upgrades
        .upgrade(&catalog, &mut state, slot, UpgradeKind::WaterBomber, &mut events)
        .expect("slot exists");
    let before = state.gold.balance();
    events.clear();

    let verdict = placement
        .sell(&catalog, &mut state, slot, &mut events)
        .expect("slot exists");

    assert_eq!(verdict, Verdict::Applied);
    assert_eq!(state.gold.balance(), before + 140);
    assert!(state.towers.is_empty());
    assert!(events.contains(&Event::TowerSold {
        slot,
        tower: TowerIdentity::upgrade(UpgradeKind::WaterBomber),
        refund: 140,
    }));

    let again = placement
        .sell(&catalog, &mut state, slot, &mut events)
        .expect("slot exists");
    assert_eq!(again, Verdict::Rejected(Rejection::NoTower));
}

#[test]
fn upgrade_is_single_tier_and_family_bound() {
    let (catalog, mut state) = setup();
    let upgrades = Upgrades::new();
    let mut events = Vec::new();
    let slot = SlotId::new(0);
    state.gold.earn(1000, &mut events);
    let _ = TowerPlacement::new()
        .place(&catalog, &mut state, slot, TowerFamily::Smart, &mut events)
        .expect("slot exists");

    assert_eq!(
        upgrades.available(&catalog, &state, slot).expect("slot exists"),
        vec![UpgradeKind::Wizard, UpgradeKind::IceMage]
    );
    let wrong = upgrades
        .upgrade(&catalog, &mut state, slot, UpgradeKind::Barbarian, &mut events)
        .expect("slot exists");
    assert_eq!(wrong, Verdict::Rejected(Rejection::UpgradeUnavailable));

    let balance = state.gold.balance();
    let applied = upgrades
        .upgrade(&catalog, &mut state, slot, UpgradeKind::Wizard, &mut events)
        .expect("slot exists");
    assert_eq!(applied, Verdict::Applied);
    assert_eq!(state.gold.balance(), balance - 170);
    let tower = &state.towers[&slot];
    assert_eq!(tower.level(), TowerLevel::Upgraded(UpgradeKind::Wizard));
    assert_eq!(tower.total_cost(), 130 + 170);

    let twice = upgrades
        .upgrade(&catalog, &mut state, slot, UpgradeKind::IceMage, &mut events)
        .expect("slot exists");
    assert_eq!(twice, Verdict::Rejected(Rejection::AlreadyUpgraded));
    assert!(upgrades
        .available(&catalog, &state, slot)
        .expect("slot exists")
        .is_empty());
}

#[test]
fn upgrade_without_gold_leaves_the_tower_untouched() {
    let (catalog, mut state) = setup();
    let upgrades = Upgrades::new();
    let mut events = Vec::new();
    let slot = SlotId::new(0);
    let _ = TowerPlacement::new()
        .place(&catalog, &mut state, slot, TowerFamily::Agile, &mut events)
        .expect("slot exists");

    let verdict = upgrades
        .upgrade(&catalog, &mut state, slot, UpgradeKind::Blowgunner, &mut events)
        .expect("slot exists");

    assert_eq!(verdict, Verdict::Rejected(Rejection::InsufficientGold));
    assert_eq!(state.towers[&slot].level(), TowerLevel::Base);
    assert_eq!(state.gold.balance(), 120);
}
