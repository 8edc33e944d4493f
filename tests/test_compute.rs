use std::time::Duration;

use gap_runner::compute::*;
use gap_runner::config::GameConfig;
use gap_runner::entities::*;
use gap_runner::events::{DeathCause, GameEvent};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn make_state() -> GameState {
    init_state(GameConfig::default(), Viewport::new(500.0, 700.0))
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

const IDLE: InputState = InputState {
    key_held: false,
    pointer_held: false,
};

const HOLD: InputState = InputState {
    key_held: true,
    pointer_held: false,
};

/// Put a stationary pipe right on top of the player.
fn pipe_on_player(s: &mut GameState) {
    let (x, y) = s.player.position();
    let (_, pipe) = s.pipes.acquire(|| Pipe::new(100.0)).unwrap();
    pipe.activate(x - 10.0, y - 10.0, PipeFrame::Body, 0.0);
}

/// Put a stationary score zone right on top of the player.
fn zone_on_player(s: &mut GameState) {
    let (x, y) = s.player.position();
    s.score_zones
        .insert(ScoreZone::new(x - 10.0, y - 50.0, 100.0, 200.0, 0.0))
        .unwrap();
}

// ── init_state / start_run ────────────────────────────────────────────────────

#[test]
fn init_state_centres_player_and_sizes_hitbox() {
    let s = make_state();
    assert_eq!(s.player.position(), (250.0, 350.0));
    assert!((s.player.width - 60.0).abs() < 1e-4);
    assert!((s.player.height - 80.0).abs() < 1e-4);
    assert!(!s.player.is_dead());
}

#[test]
fn init_state_empty_pools_and_running() {
    let s = make_state();
    assert!(s.pipes.is_empty());
    assert!(s.score_zones.is_empty());
    assert_eq!(s.pipes.capacity(), 25);
    assert_eq!(s.score, 0);
    assert_eq!(s.frame, 0);
    assert_eq!(s.status, RunStatus::Running);
    assert!(s.death.is_none());
    assert!(!s.spawn_timer.is_cancelled());
}

#[test]
fn start_run_places_first_row_immediately() {
    let s = start_run(GameConfig::default(), Viewport::new(500.0, 700.0), &mut seeded_rng());
    assert_eq!(s.pipes.len(), 5);
    assert_eq!(s.score_zones.len(), 1);
}

// ── Player update ─────────────────────────────────────────────────────────────

#[test]
fn held_input_flaps_once_until_released() {
    let mut s = make_state();
    let mut events = Vec::new();

    update_player(&mut s, HOLD, &mut events);
    assert!(s.player.is_flapping());
    assert!((s.player.body.velocity_y + 420.0).abs() < 1e-3); // −0.6 × 700
    assert_eq!(events, vec![GameEvent::Flapped]);
    assert_eq!(s.player.sprite_frame(), 1);

    // Still held: no second impulse.
    s.player.body.velocity_y = 0.0;
    events.clear();
    update_player(&mut s, HOLD, &mut events);
    assert_eq!(s.player.body.velocity_y, 0.0);
    assert!(events.is_empty());

    // Release clears the latch, next press flaps again.
    update_player(&mut s, IDLE, &mut events);
    assert!(!s.player.is_flapping());
    let pointer = InputState {
        key_held: false,
        pointer_held: true,
    };
    update_player(&mut s, pointer, &mut events);
    assert!((s.player.body.velocity_y + 420.0).abs() < 1e-3);
    assert_eq!(events, vec![GameEvent::Flapped]);
}

#[test]
fn gravity_accelerates_player_down() {
    let mut s = make_state();
    step_frame(&mut s, IDLE, ms(100));
    // 1.5 × 700 = 1050 units/s² over 0.1 s
    assert!((s.player.body.velocity_y - 105.0).abs() < 1e-3);
    assert!((s.player.body.y - 360.5).abs() < 1e-3);
    assert_eq!(s.frame, 1);
}

#[test]
fn flap_animation_returns_to_idle() {
    let mut s = make_state();
    step_frame(&mut s, HOLD, ms(10));
    assert!(matches!(s.player.anim, PlayerAnim::Flap { .. }));
    for _ in 0..100 {
        step_frame(&mut s, HOLD, ms(10));
    }
    assert_eq!(s.player.anim, PlayerAnim::Idle);
}

#[test]
fn leaving_top_kills_player() {
    let mut s = make_state();
    s.player.body.y = -1.0;
    let events = step_frame(&mut s, IDLE, ms(16));
    assert!(s.player.is_dead());
    assert_eq!(s.death, Some(DeathCause::OutOfBounds));
    assert!(events.contains(&GameEvent::Died(DeathCause::OutOfBounds)));
    assert!(!events.contains(&GameEvent::Collided));
    assert_eq!(s.status, RunStatus::Frozen);
}

#[test]
fn leaving_bottom_kills_player() {
    let mut s = make_state();
    s.player.body.y = 700.5;
    step_frame(&mut s, IDLE, ms(16));
    assert!(s.player.is_dead());
    assert_eq!(s.status, RunStatus::Frozen);
}

#[test]
fn edges_of_the_field_are_still_alive() {
    let mut s = make_state();
    s.player.body.y = 0.0;
    let mut events = Vec::new();
    update_player(&mut s, IDLE, &mut events);
    assert!(!s.player.is_dead());
    s.player.body.y = 700.0;
    update_player(&mut s, IDLE, &mut events);
    assert!(!s.player.is_dead());
}

#[test]
fn kill_player_reports_only_first_transition() {
    let mut s = make_state();
    assert!(kill_player(&mut s, DeathCause::Collision));
    assert!(!kill_player(&mut s, DeathCause::OutOfBounds));
    assert_eq!(s.death, Some(DeathCause::Collision));
}

#[test]
fn death_is_permanent() {
    let mut s = make_state();
    kill_player(&mut s, DeathCause::Collision);
    for _ in 0..50 {
        s.player.body.y = 350.0; // back in the middle of the field
        s.player.body.velocity_y = 0.0;
        step_frame(&mut s, HOLD, ms(16));
        assert!(s.player.is_dead());
        assert_eq!(s.status, RunStatus::Frozen);
    }
}

// ── Overlaps ──────────────────────────────────────────────────────────────────

#[test]
fn overlaps_uses_collision_boxes() {
    let s = make_state();
    let mut near = Pipe::new(100.0);
    near.activate(300.0, 300.0, PipeFrame::Body, 0.0);
    let mut far = Pipe::new(100.0);
    far.activate(311.0, 300.0, PipeFrame::Body, 0.0); // player spans x 250..310
    assert!(overlaps(&s.player, &near));
    assert!(!overlaps(&s.player, &far));
}

#[test]
fn pipe_collision_kills_and_freezes() {
    let mut s = make_state();
    pipe_on_player(&mut s);
    let events = step_frame(&mut s, IDLE, ms(16));
    assert!(s.player.is_dead());
    assert_eq!(s.death, Some(DeathCause::Collision));
    assert_eq!(
        events,
        vec![GameEvent::Collided, GameEvent::Died(DeathCause::Collision)]
    );
    assert_eq!(s.status, RunStatus::Frozen);
    assert!(s.spawn_timer.is_cancelled());
}

#[test]
fn pooled_pipes_are_always_active() {
    let mut rng = seeded_rng();
    let mut s = start_run(GameConfig::default(), Viewport::new(500.0, 700.0), &mut rng);
    // 120 frames × 100 ms: rows spawn, scroll off and get culled.
    for i in 0..120 {
        let input = if i % 8 == 0 { HOLD } else { IDLE };
        tick(&mut s, input, ms(100), &mut rng);
        assert!(s.pipes.values().all(|pipe| pipe.active));
        if s.status == RunStatus::Frozen {
            break;
        }
    }
}

#[test]
fn score_zone_awards_once_under_repeated_overlap() {
    let mut s = make_state();
    zone_on_player(&mut s);

    let events = step_frame(&mut s, IDLE, ms(1));
    assert_eq!(events, vec![GameEvent::Scored(1)]);
    for _ in 0..30 {
        let events = step_frame(&mut s, IDLE, ms(1));
        assert!(events.is_empty());
    }
    assert_eq!(s.score, 1);
    assert!(s.score_zones.values().all(|z| z.triggered));
}

#[test]
fn each_distinct_zone_scores_one_point() {
    let mut s = make_state();
    zone_on_player(&mut s);
    zone_on_player(&mut s);
    let events = step_frame(&mut s, IDLE, ms(1));
    assert_eq!(events, vec![GameEvent::Scored(1), GameEvent::Scored(2)]);
    assert_eq!(s.score, 2);
}

#[test]
fn pipe_and_zone_checks_both_run_in_the_same_frame() {
    let mut s = make_state();
    pipe_on_player(&mut s);
    zone_on_player(&mut s);
    let events = step_frame(&mut s, IDLE, ms(1));
    assert!(events.contains(&GameEvent::Collided));
    assert!(events.contains(&GameEvent::Scored(1)));
    assert_eq!(s.score, 1);
}

// ── Freezing ──────────────────────────────────────────────────────────────────

#[test]
fn frozen_run_zeroes_obstacle_velocity_every_frame() {
    let mut s = start_run(GameConfig::default(), Viewport::new(500.0, 700.0), &mut seeded_rng());
    kill_player(&mut s, DeathCause::Collision);
    step_frame(&mut s, IDLE, ms(16));

    let before: Vec<(f32, f32)> = s.pipes.values().map(|p| p.position()).collect();
    for _ in 0..20 {
        // Something outside the loop nudges an obstacle; the freeze wins again.
        for pipe in s.pipes.values_mut() {
            pipe.body.velocity_x = -50.0;
        }
        step_frame(&mut s, IDLE, ms(16));
        assert!(s.pipes.values().all(|p| p.body.velocity_x == 0.0));
        assert!(s.score_zones.values().all(|z| z.body.velocity_x == 0.0));
    }
    let after: Vec<(f32, f32)> = s.pipes.values().map(|p| p.position()).collect();
    assert_eq!(before, after);
}

#[test]
fn frozen_run_spawns_no_more_rows() {
    let mut s = start_run(GameConfig::default(), Viewport::new(500.0, 700.0), &mut seeded_rng());
    let mut rng = seeded_rng();
    pipe_on_player(&mut s);
    tick(&mut s, IDLE, ms(16), &mut rng);
    assert!(is_frozen(&s));
    let pipes = s.pipes.len();

    for _ in 0..10 {
        let events = tick(&mut s, IDLE, ms(2000), &mut rng);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::RowSpawned { .. })));
    }
    assert_eq!(s.pipes.len(), pipes);
}

// ── Culling ───────────────────────────────────────────────────────────────────

#[test]
fn obstacle_past_two_widths_is_released_on_next_update() {
    let mut s = make_state();
    let (_, pipe) = s.pipes.acquire(|| Pipe::new(100.0)).unwrap();
    pipe.activate(-200.5, 0.0, PipeFrame::Body, 0.0);
    s.score_zones
        .insert(ScoreZone::new(-201.0, 100.0, 100.0, 200.0, 0.0))
        .unwrap();
    let (_, kept) = s.pipes.acquire(|| Pipe::new(100.0)).unwrap();
    kept.activate(-150.0, 0.0, PipeFrame::Body, 0.0);

    step_frame(&mut s, IDLE, ms(1));
    assert_eq!(s.pipes.len(), 1);
    assert!(s.score_zones.is_empty());
    assert!(s.pipes.values().all(|p| p.body.x == -150.0));
}

#[test]
fn cull_frees_capacity_for_new_rows() {
    let config = GameConfig {
        pipe_pool_capacity: 5,
        ..GameConfig::default()
    };
    let mut s = init_state(config, Viewport::new(500.0, 700.0));
    gap_runner::spawn::spawn_row_with_gap(&mut s, 2);
    assert!(s.pipes.is_full());

    assert_eq!(gap_runner::spawn::spawn_row_with_gap(&mut s, 2).pipes_placed, 0);

    for pipe in s.pipes.values_mut() {
        pipe.body.x = -1000.0;
    }
    for zone in s.score_zones.values_mut() {
        zone.body.x = -1000.0;
    }
    assert_eq!(cull_offscreen(&mut s), 7); // 5 pipes + 2 zones
    assert!(s.pipes.is_empty());
    assert_eq!(gap_runner::spawn::spawn_row_with_gap(&mut s, 2).pipes_placed, 5);
    assert!(s.pipes.is_full());
}

// ── Navigate back ─────────────────────────────────────────────────────────────

#[test]
fn return_to_menu_once_dead_player_drops_below_field() {
    let mut s = make_state();
    kill_player(&mut s, DeathCause::Collision);
    let mut returns = 0;
    for _ in 0..300 {
        let events = step_frame(&mut s, IDLE, ms(16));
        returns += events.iter().filter(|e| **e == GameEvent::ReturnToMenu).count();
    }
    assert!(should_return_to_menu(&s));
    assert_eq!(returns, 1);
}

#[test]
fn alive_player_below_field_does_not_request_return() {
    let mut s = make_state();
    s.player.body.y = 800.0;
    assert!(!should_return_to_menu(&s));
}

// ── tick ──────────────────────────────────────────────────────────────────────

#[test]
fn tick_reports_row_spawns_on_the_wall_clock() {
    let mut s = make_state();
    let mut rng = seeded_rng();
    let mut rows = 0;
    // 40 frames × 50 ms = 2 s; one flap every 0.8 s keeps the player airborne.
    for i in 0..40 {
        let input = if i % 16 == 0 { HOLD } else { IDLE };
        let events = tick(&mut s, input, ms(50), &mut rng);
        rows += events
            .iter()
            .filter(|e| matches!(e, GameEvent::RowSpawned { .. }))
            .count();
    }
    assert_eq!(rows, 1);
}

#[test]
fn score_matches_triggered_zones_over_a_long_run() {
    let mut s = start_run(GameConfig::default(), Viewport::new(500.0, 700.0), &mut seeded_rng());
    let mut rng = seeded_rng();
    let mut input_rng = StdRng::seed_from_u64(7);
    let mut last_score = 0;
    let mut scored_events = 0;
    let mut was_dead = false;

    for _ in 0..2000 {
        let input = InputState {
            key_held: input_rng.gen_bool(0.12),
            pointer_held: false,
        };
        let events = tick(&mut s, input, ms(16), &mut rng);
        scored_events += events
            .iter()
            .filter(|e| matches!(e, GameEvent::Scored(_)))
            .count();

        assert!(s.score >= last_score);
        assert!(s.pipes.len() <= s.pipes.capacity());
        if was_dead {
            assert!(s.player.is_dead());
        }
        was_dead = s.player.is_dead();
        last_score = s.score;
    }
    assert_eq!(s.score as usize, scored_events);
}
