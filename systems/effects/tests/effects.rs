use std::sync::Arc;

use dam_defense_config::Catalog;
use dam_defense_core::{Effect, EffectKind, EnemyKind, EnemyStatus, Position, RANGE_UNIT};
use dam_defense_system_effects::{apply_in_radius, EffectSystem};
use dam_defense_world::{Enemy, IdSequence};

#[test]
fn poison_reduces_hp_by_value_times_dt_and_expires() {
    let ids = IdSequence::default();
    let mut enemies = vec![enemy(EnemyKind::Beaver, &ids, Position::ZERO)];
    let hp = enemies[0].hp();
    enemies[0].apply_effect(Effect::new(EffectKind::Poison, 1.0, 3.0));

    EffectSystem::new().update(1.0, &mut enemies);

    assert_eq!(enemies[0].hp(), hp - 3.0);
    assert!(enemies[0].effects().is_empty());
}

#[test]
fn burn_ignores_defence() {
    let ids = IdSequence::default();
    let mut enemies = vec![enemy(EnemyKind::ArmoredCrab, &ids, Position::ZERO)];
    let hp = enemies[0].hp();
    enemies[0].apply_effect(Effect::new(EffectKind::Burn, 2.0, 5.0));

    let mut system = EffectSystem::new();
    system.update(0.5, &mut enemies);
    system.update(0.5, &mut enemies);

    assert_eq!(enemies[0].hp(), hp - 5.0);
    assert_eq!(enemies[0].effects().len(), 1, "burn still has a second left");
}

#[test]
fn stun_expires_even_though_stunned_enemies_skip_their_tick() {
    let ids = IdSequence::default();
    let mut enemies = vec![enemy(EnemyKind::Rat, &ids, Position::ZERO)];
    enemies[0].apply_effect(Effect::new(EffectKind::Stun, 0.5, 0.0));

    EffectSystem::new().update(0.5, &mut enemies);

    assert!(!enemies[0].is_stunned());
}

#[test]
fn lethal_poison_kills() {
    let ids = IdSequence::default();
    let mut enemies = vec![enemy(EnemyKind::Rat, &ids, Position::ZERO)];
    enemies[0].apply_effect(Effect::new(EffectKind::Poison, 100.0, 1000.0));

    EffectSystem::new().update(1.0, &mut enemies);

    assert_eq!(enemies[0].status(), EnemyStatus::Dead);
    assert_eq!(enemies[0].hp(), 0.0);
}

#[test]
fn radius_application_skips_far_and_dead_enemies() {
    let ids = IdSequence::default();
    let mut enemies = vec![
        enemy(EnemyKind::Rat, &ids, Position::new(RANGE_UNIT, 0.0)),
        enemy(EnemyKind::Rat, &ids, Position::new(RANGE_UNIT * 3.0, 0.0)),
        enemy(EnemyKind::Rat, &ids, Position::ZERO),
    ];
    enemies[2].kill();

    let affected = apply_in_radius(
        &mut enemies,
        Position::ZERO,
        1.5,
        Effect::new(EffectKind::Stun, 1.0, 0.0),
    );

    assert_eq!(affected, 1);
    assert!(enemies[0].is_stunned());
    assert!(!enemies[1].is_stunned());
}

fn enemy(kind: EnemyKind, ids: &IdSequence, position: Position) -> Enemy {
    let catalog = Catalog::load_embedded().expect("embedded tables are valid");
    let config = Arc::clone(catalog.enemy(kind).expect("kind exists"));
    Enemy::new(config, ids.clone(), position)
}
