use std::{collections::VecDeque, time::Duration};

use arena_core::{
    Command, Event, ItemCatalog, MonsterSpawnGroup, PlayerSheet, RandomSource, SpawnRegion,
    StageInfo, StageProgress, StageWaveDefinition, TemplateId,
};
use arena_system_spawning::{Config, SchedulerState, SpawnCatalog, WaveScheduler};
use arena_world::{self as world, query, World};

const SPAWN_INTERVAL: Duration = Duration::from_millis(200);
const WAVE_DELAY: Duration = Duration::from_secs(1);

/// Replays a fixed list of indices and a fixed fraction for positions.
struct Scripted {
    indices: VecDeque<usize>,
    fraction: f32,
}

impl Scripted {
    fn new(indices: &[usize], fraction: f32) -> Self {
        Self {
            indices: indices.iter().copied().collect(),
            fraction,
        }
    }
}

impl RandomSource for Scripted {
    fn index(&mut self, len: usize) -> usize {
        self.indices.pop_front().unwrap_or(0) % len
    }

    fn between(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.fraction
    }
}

fn catalog(templates: &[&str], regions: Vec<SpawnRegion>) -> SpawnCatalog {
    SpawnCatalog::new(templates.iter().copied(), regions).expect("valid catalog")
}

fn arena() -> World {
    World::new(&PlayerSheet::default(), ItemCatalog::default())
}

fn scheduler(catalog: SpawnCatalog, random: Scripted) -> WaveScheduler<Scripted> {
    WaveScheduler::new(Config::new(SPAWN_INTERVAL, WAVE_DELAY), catalog, random)
}

/// Applies commands to the world and feeds resulting events back to the
/// scheduler until the exchange settles, recording every event.
fn pump(
    world: &mut World,
    scheduler: &mut WaveScheduler<Scripted>,
    commands: Vec<Command>,
    log: &mut Vec<Event>,
) {
    let mut pending = commands;
    while !pending.is_empty() {
        let mut events = Vec::new();
        for command in pending.drain(..) {
            world::apply(world, command, &mut events);
        }
        scheduler.handle(&events, &mut pending);
        log.extend(events);
    }
}

fn tick(
    world: &mut World,
    scheduler: &mut WaveScheduler<Scripted>,
    dt: Duration,
    log: &mut Vec<Event>,
) {
    pump(world, scheduler, vec![Command::Tick { dt }], log);
}

fn spawned_templates(log: &[Event]) -> Vec<TemplateId> {
    log.iter()
        .filter_map(|event| match event {
            Event::EnemySpawned { template, .. } => Some(*template),
            _ => None,
        })
        .collect()
}

fn count_ended(log: &[Event]) -> usize {
    log.iter()
        .filter(|event| matches!(event, Event::WaveSequenceEnded))
        .count()
}

#[test]
fn three_enemy_wave_spawns_inside_region_and_clears_once() {
    let mut world = arena();
    let mut scheduler = scheduler(
        catalog(&["slime", "bat"], vec![SpawnRegion::new(0.0, 10.0, 0.0, 10.0)]),
        Scripted::new(&[1, 0, 0, 0, 1, 0], 0.25),
    );
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler.start_wave(3, &mut start);
    pump(&mut world, &mut scheduler, start, &mut log);

    tick(&mut world, &mut scheduler, WAVE_DELAY, &mut log);
    assert!(query::enemies(&world).is_empty());
    for _ in 0..3 {
        tick(&mut world, &mut scheduler, SPAWN_INTERVAL, &mut log);
    }

    let enemies = query::enemies(&world);
    assert_eq!(enemies.len(), 3);
    for enemy in &enemies {
        assert!((0.0..=10.0).contains(&enemy.position.x()));
        assert!((0.0..=10.0).contains(&enemy.position.y()));
    }
    assert_eq!(
        spawned_templates(&log),
        vec![TemplateId::new(1), TemplateId::new(0), TemplateId::new(1)]
    );
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert!(query::population(&world).issuance_complete());
    assert_eq!(count_ended(&log), 0, "enemies are still alive");

    for enemy in enemies {
        pump(
            &mut world,
            &mut scheduler,
            vec![Command::KillEnemy { enemy: enemy.id }],
            &mut log,
        );
    }

    assert_eq!(count_ended(&log), 1);
    let deaths = log
        .iter()
        .filter(|event| matches!(event, Event::EnemyDied { .. }))
        .count();
    assert_eq!(deaths, 3);
}

#[test]
fn large_tick_issues_whole_wave_at_once() {
    let mut world = arena();
    let mut scheduler = scheduler(
        catalog(&["slime"], vec![SpawnRegion::new(0.0, 1.0, 0.0, 1.0)]),
        Scripted::new(&[], 0.5),
    );
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler.start_wave(5, &mut start);
    pump(&mut world, &mut scheduler, start, &mut log);
    tick(&mut world, &mut scheduler, Duration::from_secs(10), &mut log);

    assert_eq!(query::enemies(&world).len(), 5);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn stage_spawns_groups_in_order_with_boss_last() {
    let mut world = arena();
    let mut scheduler = scheduler(
        catalog(
            &["slime", "bat", "golem"],
            vec![SpawnRegion::new(-5.0, 5.0, -5.0, 5.0)],
        ),
        Scripted::new(&[], 0.0),
    );
    let stage = StageInfo {
        name: "meadow".to_owned(),
        waves: vec![
            StageWaveDefinition::default(),
            StageWaveDefinition {
                monster_groups: vec![
                    MonsterSpawnGroup {
                        template_key: "bat".to_owned(),
                        spawn_count: 2,
                    },
                    MonsterSpawnGroup {
                        template_key: "slime".to_owned(),
                        spawn_count: 3,
                    },
                ],
                boss: Some("golem".to_owned()),
            },
        ],
    };
    let mut progress = StageProgress::new(stage);
    assert!(progress.advance());
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler
        .start_stage(&progress, &mut start)
        .expect("stage resolves");
    assert_eq!(scheduler.pending_spawns(), 6);
    pump(&mut world, &mut scheduler, start, &mut log);

    tick(&mut world, &mut scheduler, WAVE_DELAY, &mut log);
    tick(&mut world, &mut scheduler, SPAWN_INTERVAL, &mut log);
    assert_eq!(
        spawned_templates(&log),
        vec![TemplateId::new(1), TemplateId::new(1)],
        "the interval gates the whole group"
    );

    tick(&mut world, &mut scheduler, SPAWN_INTERVAL, &mut log);
    assert_eq!(query::enemies(&world).len(), 5);
    assert!(!log.contains(&Event::CameraShakeRequested));

    tick(&mut world, &mut scheduler, SPAWN_INTERVAL, &mut log);

    assert_eq!(
        spawned_templates(&log),
        vec![
            TemplateId::new(1),
            TemplateId::new(1),
            TemplateId::new(0),
            TemplateId::new(0),
            TemplateId::new(0),
            TemplateId::new(2),
        ]
    );
    let shake = log
        .iter()
        .position(|event| matches!(event, Event::CameraShakeRequested))
        .expect("camera shake precedes the boss");
    let boss = log
        .iter()
        .rposition(|event| matches!(event, Event::EnemySpawned { .. }))
        .expect("boss spawned");
    assert!(shake < boss);
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn stop_wave_discards_pending_spawns() {
    let mut world = arena();
    let mut scheduler = scheduler(
        catalog(&["slime"], vec![SpawnRegion::new(0.0, 1.0, 0.0, 1.0)]),
        Scripted::new(&[], 0.5),
    );
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler.start_wave(10, &mut start);
    pump(&mut world, &mut scheduler, start, &mut log);
    tick(
        &mut world,
        &mut scheduler,
        WAVE_DELAY + SPAWN_INTERVAL * 2,
        &mut log,
    );
    assert_eq!(query::enemies(&world).len(), 2);

    scheduler.stop_wave();
    scheduler.stop_wave();
    assert_eq!(scheduler.pending_spawns(), 0);
    tick(&mut world, &mut scheduler, Duration::from_secs(30), &mut log);

    assert_eq!(query::enemies(&world).len(), 2, "spawned enemies stay");
    assert!(!query::population(&world).issuance_complete());
    assert_eq!(count_ended(&log), 0);
}

#[test]
fn restarting_replaces_the_run_in_flight() {
    let mut world = arena();
    let mut scheduler = scheduler(
        catalog(&["slime"], vec![SpawnRegion::new(0.0, 1.0, 0.0, 1.0)]),
        Scripted::new(&[], 0.5),
    );
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler.start_wave(4, &mut start);
    pump(&mut world, &mut scheduler, start, &mut log);
    tick(&mut world, &mut scheduler, WAVE_DELAY + SPAWN_INTERVAL, &mut log);
    assert_eq!(query::enemies(&world).len(), 1);

    let mut restart = Vec::new();
    scheduler.start_wave(2, &mut restart);
    pump(&mut world, &mut scheduler, restart, &mut log);
    tick(&mut world, &mut scheduler, Duration::from_secs(30), &mut log);

    assert_eq!(query::enemies(&world).len(), 3);
}

#[test]
fn completion_with_everything_dead_clears_immediately() {
    let mut world = arena();
    let mut scheduler = scheduler(
        catalog(&["slime"], vec![SpawnRegion::new(0.0, 1.0, 0.0, 1.0)]),
        Scripted::new(&[], 0.5),
    );
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler.start_wave(2, &mut start);
    pump(&mut world, &mut scheduler, start, &mut log);
    tick(&mut world, &mut scheduler, WAVE_DELAY + SPAWN_INTERVAL, &mut log);

    let first = query::enemies(&world)[0].id;
    pump(
        &mut world,
        &mut scheduler,
        vec![Command::KillEnemy { enemy: first }],
        &mut log,
    );
    assert_eq!(count_ended(&log), 0, "population emptied before issuance ended");

    tick(&mut world, &mut scheduler, SPAWN_INTERVAL, &mut log);
    let second = query::enemies(&world)[0].id;
    pump(
        &mut world,
        &mut scheduler,
        vec![Command::KillEnemy { enemy: second }],
        &mut log,
    );

    assert_eq!(count_ended(&log), 1);
}

#[test]
fn empty_regions_skip_spawns_but_still_complete() {
    let mut world = arena();
    let mut scheduler = scheduler(catalog(&["slime"], Vec::new()), Scripted::new(&[], 0.5));
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler.start_wave(3, &mut start);
    pump(&mut world, &mut scheduler, start, &mut log);
    tick(&mut world, &mut scheduler, Duration::from_secs(5), &mut log);

    assert!(query::enemies(&world).is_empty());
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert_eq!(count_ended(&log), 1);
}

#[test]
fn negative_wave_reports_end_without_spawning() {
    let mut world = arena();
    let mut scheduler = scheduler(
        catalog(&["slime"], vec![SpawnRegion::new(0.0, 1.0, 0.0, 1.0)]),
        Scripted::new(&[], 0.5),
    );
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler.start_wave(-3, &mut start);
    pump(&mut world, &mut scheduler, start, &mut log);
    tick(&mut world, &mut scheduler, Duration::from_secs(5), &mut log);

    assert_eq!(log.first(), Some(&Event::WaveSequenceEnded));
    assert_eq!(count_ended(&log), 1);
    assert!(spawned_templates(&log).is_empty());
}

#[test]
fn negative_wave_mid_run_lets_the_running_wave_finish() {
    let mut world = arena();
    let mut scheduler = scheduler(
        catalog(&["slime"], vec![SpawnRegion::new(0.0, 1.0, 0.0, 1.0)]),
        Scripted::new(&[], 0.5),
    );
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler.start_wave(5, &mut start);
    pump(&mut world, &mut scheduler, start, &mut log);
    tick(&mut world, &mut scheduler, WAVE_DELAY + SPAWN_INTERVAL, &mut log);

    let mut negative = Vec::new();
    scheduler.start_wave(-1, &mut negative);
    pump(&mut world, &mut scheduler, negative, &mut log);
    assert_eq!(count_ended(&log), 1);
    assert_eq!(scheduler.state(), SchedulerState::Running);

    tick(&mut world, &mut scheduler, Duration::from_secs(10), &mut log);
    let enemies = query::enemies(&world);
    assert_eq!(enemies.len(), 5);

    for enemy in enemies {
        pump(
            &mut world,
            &mut scheduler,
            vec![Command::KillEnemy { enemy: enemy.id }],
            &mut log,
        );
    }
    assert_eq!(count_ended(&log), 2, "the running wave reports its own clear");
}

#[test]
fn starting_a_stage_replaces_the_wave_in_flight() {
    let mut world = arena();
    let mut scheduler = scheduler(
        catalog(&["slime", "bat"], vec![SpawnRegion::new(0.0, 1.0, 0.0, 1.0)]),
        Scripted::new(&[], 0.5),
    );
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler.start_wave(6, &mut start);
    pump(&mut world, &mut scheduler, start, &mut log);
    tick(&mut world, &mut scheduler, WAVE_DELAY + SPAWN_INTERVAL, &mut log);
    assert_eq!(query::enemies(&world).len(), 1);

    let stage = StageInfo {
        name: "ambush".to_owned(),
        waves: vec![StageWaveDefinition {
            monster_groups: vec![MonsterSpawnGroup {
                template_key: "bat".to_owned(),
                spawn_count: 2,
            }],
            boss: None,
        }],
    };
    let mut replace = Vec::new();
    scheduler
        .start_stage(&StageProgress::new(stage), &mut replace)
        .expect("stage resolves");
    assert_eq!(scheduler.pending_spawns(), 2);
    pump(&mut world, &mut scheduler, replace, &mut log);
    tick(&mut world, &mut scheduler, Duration::from_secs(30), &mut log);

    assert_eq!(query::enemies(&world).len(), 3);
    assert_eq!(
        spawned_templates(&log),
        vec![TemplateId::new(0), TemplateId::new(1), TemplateId::new(1)]
    );
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}

#[test]
fn stage_groups_without_regions_are_skipped_but_complete() {
    let mut world = arena();
    let mut scheduler = scheduler(catalog(&["slime", "ogre"], Vec::new()), Scripted::new(&[], 0.5));
    let stage = StageInfo {
        name: "void".to_owned(),
        waves: vec![StageWaveDefinition {
            monster_groups: vec![MonsterSpawnGroup {
                template_key: "slime".to_owned(),
                spawn_count: 4,
            }],
            boss: Some("ogre".to_owned()),
        }],
    };
    let mut log = Vec::new();

    let mut start = Vec::new();
    scheduler
        .start_stage(&StageProgress::new(stage), &mut start)
        .expect("stage resolves");
    pump(&mut world, &mut scheduler, start, &mut log);
    tick(&mut world, &mut scheduler, Duration::from_secs(5), &mut log);

    assert!(spawned_templates(&log).is_empty());
    assert!(log.contains(&Event::CameraShakeRequested));
    assert_eq!(scheduler.state(), SchedulerState::Idle);
    assert!(query::population(&world).issuance_complete());
    assert_eq!(count_ended(&log), 1);
}
