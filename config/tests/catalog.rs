use dam_defense_config::{Catalog, CatalogSources, ConfigError, Table, TowerSpecial};
use dam_defense_core::{
    EffectKind, EnemyCategory, EnemyKind, SlotId, StageId, TargetMode, TowerFamily,
    UpgradeKind,
};

#[test]
fn every_identity_resolves_to_a_row() {
    let catalog = embedded();

    for family in TowerFamily::ALL {
        let config = catalog.base_tower(family).expect("base row exists");
        assert_eq!(config.tier, 1);
        assert_eq!(config.identity.family(), family);
    }
    for kind in UpgradeKind::ALL {
        let config = catalog.upgrade_tower(kind).expect("upgrade row exists");
        assert_eq!(config.tier, 2);
        assert_eq!(config.identity.family(), kind.base_family());
    }
    for kind in EnemyKind::ALL {
        assert_eq!(catalog.enemy(kind).expect("enemy row exists").kind, kind);
    }
}

#[test]
fn upgrades_are_grouped_by_family() {
    let catalog = embedded();

    assert_eq!(
        catalog.upgrades_for(TowerFamily::Brave),
        vec![UpgradeKind::Barbarian, UpgradeKind::Suit],
    );
    for family in TowerFamily::ALL {
        let branches = catalog.upgrades_for(family);
        assert!(
            (1..=2).contains(&branches.len()),
            "{family:?} should offer one or two branches, got {branches:?}",
        );
    }
}

#[test]
fn shipped_tower_specials_match_their_mechanics() {
    let catalog = embedded();

    let blowgunner = catalog
        .upgrade_tower(UpgradeKind::Blowgunner)
        .expect("row exists");
    let poison = blowgunner.effect().expect("blowgunner poisons");
    assert_eq!(poison.kind, EffectKind::Poison);
    assert!(poison.ignores_armor);

    let suit = catalog.upgrade_tower(UpgradeKind::Suit).expect("row exists");
    let squad = suit.soldiers().expect("suit summons soldiers");
    assert!(squad.stun_aura.is_some());

    let dragon = catalog
        .upgrade_tower(UpgradeKind::DragonTamer)
        .expect("row exists");
    assert_eq!(dragon.target_mode, TargetMode::Cone);

    let brave = catalog.base_tower(TowerFamily::Brave).expect("row exists");
    assert!(matches!(brave.special, Some(TowerSpecial::Summon { .. })));
}

#[test]
fn bosses_carry_the_boss_category() {
    let catalog = embedded();

    let bosses: Vec<_> = catalog
        .enemies()
        .filter(|enemy| enemy.is_boss)
        .map(|enemy| enemy.kind)
        .collect();
    assert_eq!(bosses, vec![EnemyKind::RiverTroll, EnemyKind::CrocodileKing]);
    assert!(catalog
        .enemies()
        .all(|enemy| enemy.is_boss == (enemy.category == EnemyCategory::Boss)));
}

#[test]
fn stages_define_three_waves_and_final_stage_has_no_bonus() {
    let catalog = embedded();

    for stage in catalog.stages() {
        assert_eq!(stage.waves.len(), 3, "stage {} wave count", stage.id.get());
    }
    let last = catalog.stage(StageId::new(10)).expect("stage 10 exists");
    assert_eq!(last.bonus_gold, None);
    assert_eq!(
        catalog.stage(StageId::new(1)).expect("stage 1").bonus_gold,
        Some(40)
    );
}

#[test]
fn map_exposes_slots_and_dam() {
    let catalog = embedded();
    let map = catalog.map();

    assert!(map.waypoints.len() >= 2);
    assert_eq!(map.tower_slots.len(), 6);
    let slot = catalog.slot(SlotId::new(3)).expect("slot 3 exists");
    assert_eq!(slot.id, SlotId::new(3));
    assert_eq!(catalog.text("en", "hud.gold"), Some("Gold"));
    assert!(catalog.text("es", "hud.gold").is_some());
}

#[test]
fn tower_row_with_foreign_family_is_rejected() {
    let towers = CatalogSources::EMBEDDED
        .towers
        .replacen(
            r#""id": "blowgunner", "family": "agile""#,
            r#""id": "blowgunner", "family": "smart""#,
            1,
        );
    assert_ne!(towers, CatalogSources::EMBEDDED.towers, "fixture must change");

    let error = Catalog::from_json(&CatalogSources {
        towers: &towers,
        ..CatalogSources::EMBEDDED
    })
    .unwrap_err();

    assert!(
        matches!(error, ConfigError::FamilyMismatch { ref id, .. } if id == "blowgunner"),
        "unexpected error: {error:?}",
    );
}

#[test]
fn missing_tower_rows_are_rejected() {
    let error = Catalog::from_json(&CatalogSources {
        towers: "[]",
        ..CatalogSources::EMBEDDED
    })
    .unwrap_err();

    assert!(matches!(
        error,
        ConfigError::RowCount {
            table: Table::Towers,
            expected: 12,
            found: 0,
        }
    ));
}

#[test]
fn single_waypoint_map_is_rejected() {
    let map = r#"{
        "waypoints": [{ "x": 0, "y": 0 }],
        "towerSlots": [],
        "dam": { "x": 0, "y": 0 },
        "grid": { "tileWidth": 64, "tileHeight": 32, "originX": 0, "originY": 0 }
    }"#;

    let error = Catalog::from_json(&CatalogSources {
        map,
        ..CatalogSources::EMBEDDED
    })
    .unwrap_err();

    assert!(matches!(error, ConfigError::TooFewWaypoints { found: 1 }));
}

#[test]
fn stage_with_two_waves_is_rejected() {
    let stages: String = (1..=10)
        .map(|id| {
            let waves = if id == 4 { 2 } else { 3 };
            let wave = r#"{"spawns": [{"enemy": "rat", "count": 1}]}"#;
            let waves = vec![wave; waves].join(", ");
            format!(r#"{{"id": {id}, "waves": [{waves}]}}"#)
        })
        .collect::<Vec<_>>()
        .join(",\n");
    let stages = format!("[{stages}]");

    let error = Catalog::from_json(&CatalogSources {
        stages: &stages,
        ..CatalogSources::EMBEDDED
    })
    .unwrap_err();

    assert!(matches!(error, ConfigError::WaveCount { stage: 4, found: 2 }));
}

fn embedded() -> Catalog {
    Catalog::load_embedded().expect("embedded tables are valid")
}
