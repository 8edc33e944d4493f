//! Per-frame simulation.
//!
//! Two tasks drive a run: the spawn task (`spawn::advance_spawner`, wall-clock
//! timer) and the frame task (`step_frame`).  `tick` runs both, spawner
//! first.  They share nothing but `GameState`, and everything happens on the
//! caller's thread.  Randomness only enters through the injected RNG.

use std::time::Duration;

use log::{debug, info, trace};
use rand::Rng;

use crate::config::GameConfig;
use crate::entities::{
    GameState, InputState, Moving, Player, PlayerAnim, RunStatus, Viewport, FLAP_ANIM_SECS,
};
use crate::events::{DeathCause, GameEvent};
use crate::pool::Pool;
use crate::spawn::{advance_spawner, spawn_row};
use crate::timer::RepeatingTimer;

// ── Constructors ─────────────────────────────────────────────────────────────

/// Empty run: player centred, pools empty, spawn timer armed.
pub fn init_state(config: GameConfig, viewport: Viewport) -> GameState {
    let slot = viewport.slot_size();
    let player = Player::activate(
        viewport.width / 2.0,
        viewport.height / 2.0,
        slot * config.player_width_ratio,
        slot * config.player_height_ratio,
    );
    GameState {
        pipes: Pool::with_capacity(config.pipe_pool_capacity),
        score_zones: Pool::with_capacity(config.zone_pool_capacity),
        spawn_timer: RepeatingTimer::new(config.spawn_interval()),
        config,
        viewport,
        player,
        score: 0,
        status: RunStatus::Running,
        death: None,
        return_requested: false,
        frame: 0,
    }
}

/// A fresh run with its first row already on the right edge.
pub fn start_run(config: GameConfig, viewport: Viewport, rng: &mut impl Rng) -> GameState {
    let mut state = init_state(config, viewport);
    let row = spawn_row(&mut state, rng);
    info!(
        "run started: viewport {}x{}, first gap {}",
        viewport.width, viewport.height, row.gap
    );
    state
}

// ── Queries ──────────────────────────────────────────────────────────────────

pub fn overlaps(a: &impl Moving, b: &impl Moving) -> bool {
    a.bounds().overlaps(&b.bounds())
}

pub fn is_frozen(state: &GameState) -> bool {
    state.status == RunStatus::Frozen
}

/// The dead player has dropped below the play field.
pub fn should_return_to_menu(state: &GameState) -> bool {
    state.player.is_dead() && state.player.body.y > state.viewport.height
}

// ── Player ───────────────────────────────────────────────────────────────────

/// Flap on a fresh press, release the flap latch when input lets go, and
/// kill the player once it leaves the play field vertically.
pub fn update_player(state: &mut GameState, input: InputState, events: &mut Vec<GameEvent>) {
    let flap_velocity = state.config.flap_velocity(&state.viewport);
    let player = &mut state.player;

    if input.held() && !player.is_flapping() {
        player.set_flapping(true);
        player.anim = PlayerAnim::Flap { elapsed: 0.0 };
        player.body.velocity_y = flap_velocity;
        events.push(GameEvent::Flapped);
    } else if !input.held() && player.is_flapping() {
        player.set_flapping(false);
    }

    let y = state.player.body.y;
    if y < 0.0 || y > state.viewport.height {
        kill_player(state, DeathCause::OutOfBounds);
    }
}

/// Alive → Dead.  Returns whether the transition happened; the first cause
/// wins.  The spawn timer stops here, before the run is frozen, so no row
/// can appear behind a dead player.
pub fn kill_player(state: &mut GameState, cause: DeathCause) -> bool {
    if !state.player.kill() {
        return false;
    }
    state.death = Some(cause);
    state.spawn_timer.cancel();
    info!("player died ({cause:?}) with score {}", state.score);
    true
}

// ── Overlaps ─────────────────────────────────────────────────────────────────

fn check_pipe_collisions(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let hit = state
        .pipes
        .values()
        .any(|pipe| overlaps(&state.player, pipe));
    if hit && kill_player(state, DeathCause::Collision) {
        events.push(GameEvent::Collided);
    }
}

fn collect_score_zones(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let player = state.player.bounds();
    let mut awarded = 0;
    for zone in state.score_zones.values_mut() {
        if zone.bounds().overlaps(&player) && zone.handle_overlap() {
            awarded += 1;
        }
    }
    for _ in 0..awarded {
        state.score += 1;
        debug!("score {}", state.score);
        events.push(GameEvent::Scored(state.score));
    }
}

// ── Freezing and culling ─────────────────────────────────────────────────────

fn enter_frozen(state: &mut GameState, events: &mut Vec<GameEvent>) {
    state.status = RunStatus::Frozen;
    state.spawn_timer.cancel();
    let cause = state.death.unwrap_or(DeathCause::OutOfBounds);
    info!("run frozen at frame {}", state.frame);
    events.push(GameEvent::Died(cause));
}

/// Pin every obstacle in place.  Applied on every frozen frame.
pub fn freeze_obstacles(state: &mut GameState) {
    for pipe in state.pipes.values_mut() {
        pipe.body.velocity_x = 0.0;
    }
    for zone in state.score_zones.values_mut() {
        zone.body.velocity_x = 0.0;
    }
}

/// Release obstacles that have drifted far enough past the left edge.
pub fn cull_offscreen(state: &mut GameState) -> usize {
    let factor = state.config.offscreen_factor;
    let pipes = state.pipes.retain(|pipe| !pipe.is_offscreen(factor));
    let zones = state.score_zones.retain(|zone| !zone.is_offscreen(factor));
    if pipes + zones > 0 {
        trace!("culled {pipes} pipe(s) and {zones} zone(s)");
    }
    pipes + zones
}

// ── Physics ──────────────────────────────────────────────────────────────────

fn integrate(state: &mut GameState, dt: f32) {
    let gravity = state.config.gravity(&state.viewport);
    let player = &mut state.player;
    player.body.velocity_y += gravity * dt;
    player.advance(dt);
    if let PlayerAnim::Flap { elapsed } = player.anim {
        let elapsed = elapsed + dt;
        player.anim = if elapsed >= FLAP_ANIM_SECS {
            PlayerAnim::Idle
        } else {
            PlayerAnim::Flap { elapsed }
        };
    }

    for pipe in state.pipes.values_mut() {
        pipe.advance(dt);
    }
    for zone in state.score_zones.values_mut() {
        zone.advance(dt);
    }
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Frame task.  Running: update the player, test pipes and score zones (both
/// always run), freeze on death.  Frozen: zero obstacle velocities.  Then
/// integrate motion over `delta`, cull, and signal the return to the menu.
pub fn step_frame(state: &mut GameState, input: InputState, delta: Duration) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if state.status == RunStatus::Running {
        // A player killed between frames skips straight to the freeze.
        if !state.player.is_dead() {
            update_player(state, input, &mut events);
            check_pipe_collisions(state, &mut events);
            collect_score_zones(state, &mut events);
        }
        if state.player.is_dead() {
            enter_frozen(state, &mut events);
        }
    }

    if state.status == RunStatus::Frozen {
        freeze_obstacles(state);
    }

    integrate(state, delta.as_secs_f32());
    cull_offscreen(state);

    if !state.return_requested && should_return_to_menu(state) {
        state.return_requested = true;
        info!("player left the field, returning to menu");
        events.push(GameEvent::ReturnToMenu);
    }

    state.frame += 1;
    events
}

/// Run the spawn task, then the frame task, for `delta` of wall-clock time.
pub fn tick(
    state: &mut GameState,
    input: InputState,
    delta: Duration,
    rng: &mut impl Rng,
) -> Vec<GameEvent> {
    let mut events = Vec::new();
    if let Some(row) = advance_spawner(state, delta, rng) {
        events.push(GameEvent::RowSpawned { gap: row.gap });
    }
    events.extend(step_frame(state, input, delta));
    events
}
