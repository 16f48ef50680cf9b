use std::sync::Arc;

use dam_defense_config::{Catalog, GameSettings};
use dam_defense_core::{
    EffectKind, EnemyId, EnemyKind, Event, Position, SlotId, TowerFamily, UpgradeKind,
};
use dam_defense_system_combat::CombatSystem;
use dam_defense_system_path::PathSystem;
use dam_defense_world::{GameState, Tower};

const TOWER_SPOT: Position = Position::new(500.0, 40.0);

struct Arena {
    catalog: Catalog,
    path: PathSystem,
    state: GameState,
    combat: CombatSystem,
    events: Vec<Event>,
}

impl Arena {
    fn new() -> Self {
        Self {
            catalog: Catalog::load_embedded().expect("embedded tables are valid"),
            path: PathSystem::from_waypoints(vec![Position::ZERO, Position::new(1000.0, 0.0)]),
            state: GameState::new(&GameSettings::default()),
            combat: CombatSystem::new(),
            events: Vec::new(),
        }
    }

    fn base_tower(&mut self, family: TowerFamily) {
        let config = Arc::clone(self.catalog.base_tower(family).expect("base row exists"));
        self.insert(Tower::new(SlotId::new(0), TOWER_SPOT, config));
    }

    fn upgraded_tower(&mut self, upgrade: UpgradeKind) {
        let config = Arc::clone(self.catalog.upgrade_tower(upgrade).expect("row exists"));
        self.insert(Tower::new(SlotId::new(0), TOWER_SPOT, config));
    }

    fn insert(&mut self, tower: Tower) {
        let _ = self.state.towers.insert(tower.slot(), tower);
    }

    fn enemy(&mut self, kind: EnemyKind, progress: f32) -> EnemyId {
        let mut enemy = self
            .state
            .enemy_factory
            .create(&self.catalog, kind, Position::ZERO)
            .expect("kind exists");
        let step = self.path.speed_as_progress(enemy.effective_speed());
        let _ = enemy.update(progress / step, &self.path);
        let id = enemy.id();
        self.state.enemies.push(enemy);
        id
    }

    fn hp(&self, id: EnemyId) -> f32 {
        self.state.enemy(id).expect("enemy alive").hp()
    }

    fn tick(&mut self, dt: f32) {
        self.combat
            .update(dt, &self.path, &mut self.state, &mut self.events);
        self.state.elapsed += dt;
    }
}

#[test]
fn single_target_tower_kills_and_pays_bounty() {
    let mut arena = Arena::new();
    arena.base_tower(TowerFamily::Agile);
    let rat = arena.enemy(EnemyKind::Rat, 0.5);
    let bounty = arena.catalog.enemy(EnemyKind::Rat).expect("rat exists").gold;

    for _ in 0..200 {
        arena.tick(0.05);
    }

    assert!(arena.state.enemies.is_empty());
    assert_eq!(arena.state.gold.balance(), 220 + bounty);
    assert!(arena.events.contains(&Event::EnemyKilled {
        enemy: rat,
        gold_earned: bounty,
    }));
    assert_eq!(arena.state.enemy_factory.pooled(EnemyKind::Rat), 1);
    assert!(arena.combat.pooled_projectiles() > 0);
}

#[test]
fn projectile_whose_target_died_is_discarded() {
    let mut arena = Arena::new();
    arena.base_tower(TowerFamily::Agile);
    let rat = arena.enemy(EnemyKind::Rat, 0.5);
    arena.tick(0.01);
    assert_eq!(arena.state.projectiles.len(), 1);

    arena.state.enemy_mut(rat).expect("rat alive").kill();
    arena.tick(0.01);

    assert!(arena.state.projectiles.is_empty());
    assert_eq!(arena.combat.pooled_projectiles(), 1);
    let kills = arena
        .events
        .iter()
        .filter(|event| matches!(event, Event::EnemyKilled { .. }))
        .count();
    assert_eq!(kills, 1);
}

#[test]
fn aura_enemy_debuffs_towers_in_range_only_while_alive() {
    let mut arena = Arena::new();
    arena.base_tower(TowerFamily::Agile);
    let snake = arena.enemy(EnemyKind::Anaconda, 0.5);

    arena.tick(0.01);
    let tower = &arena.state.towers[&SlotId::new(0)];
    assert!((tower.attack_speed_debuff() - 0.4).abs() < 1e-6);
    assert!((tower.effective_attack_speed() - 1.1).abs() < 1e-6);

    arena.state.enemy_mut(snake).expect("anaconda alive").kill();
    arena.tick(0.01);
    arena.tick(0.01);

    assert_eq!(arena.state.towers[&SlotId::new(0)].attack_speed_debuff(), 0.0);
}

#[test]
fn cone_tower_channels_true_damage_and_effect_inside_the_cone() {
    let mut arena = Arena::new();
    arena.upgraded_tower(UpgradeKind::IceMage);
    let lead = arena.enemy(EnemyKind::Beaver, 0.52);
    let flank = arena.enemy(EnemyKind::Rat, 0.5);
    let behind = arena.enemy(EnemyKind::Frog, 0.4);

    arena.tick(0.1);

    assert!((arena.hp(lead) - 109.0).abs() < 1e-3);
    assert!((arena.hp(flank) - 39.0).abs() < 1e-3);
    assert_eq!(arena.hp(behind), 55.0);
    let flank_slowed = arena
        .state
        .enemy(flank)
        .expect("rat alive")
        .effects()
        .iter()
        .any(|effect| effect.kind == EffectKind::Slow);
    assert!(flank_slowed);
    assert!(arena.state.projectiles.is_empty());
}

#[test]
fn line_tower_hits_the_path_stretch_behind_its_target() {
    let mut arena = Arena::new();
    arena.upgraded_tower(UpgradeKind::LogRoller);
    let lead = arena.enemy(EnemyKind::Rat, 0.55);
    let middle = arena.enemy(EnemyKind::Rat, 0.5);
    let tail = arena.enemy(EnemyKind::Rat, 0.47);
    let far = arena.enemy(EnemyKind::Rat, 0.4);

    arena.tick(0.01);

    for id in [lead, middle, tail] {
        assert!((arena.hp(id) - 10.0).abs() < 1e-3);
    }
    assert_eq!(arena.hp(far), 40.0);
    assert_eq!(arena.state.projectiles.len(), 1, "cosmetic shot in flight");
}

#[test]
fn splash_projectile_damages_every_neighbour_of_the_target() {
    let mut arena = Arena::new();
    arena.base_tower(TowerFamily::Capable);
    let ids = [
        arena.enemy(EnemyKind::Rat, 0.51),
        arena.enemy(EnemyKind::Rat, 0.5),
        arena.enemy(EnemyKind::Rat, 0.49),
    ];

    for _ in 0..20 {
        arena.tick(0.02);
    }

    for id in ids {
        assert!((arena.hp(id) - 20.0).abs() < 1e-3);
    }
}
