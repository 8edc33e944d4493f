//! Obstacle-row generation.
//!
//! A row splits the viewport height into `SLOT_COUNT` slots.  Two adjacent
//! slots starting at `gap` are left open and covered by one score zone; every
//! other slot gets a pipe.  The pipe right above the gap shows its bottom
//! cap, the one right below shows its top cap.

use std::ops::RangeInclusive;
use std::time::Duration;

use log::{debug, warn};
use rand::Rng;

use crate::entities::{GameState, Pipe, PipeFrame, RunStatus, ScoreZone, SLOT_COUNT};

/// Valid first slots of the gap; keeps at least one pipe above and below it.
pub const GAP_RANGE: RangeInclusive<usize> = 1..=4;

/// Slots covered by one score zone.
pub const GAP_SLOTS: usize = 2;

/// What goes into one slot of a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotPlan {
    Pipe(PipeFrame),
    /// First gap slot; the zone spans this slot and the next.
    ScoreZone,
    /// Second gap slot, already covered by the zone.
    Covered,
}

/// Outcome of one `spawn_row` call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowReport {
    pub gap: usize,
    pub pipes_placed: usize,
    /// Pipes skipped because the pool was full.
    pub pipes_dropped: usize,
    pub zone_placed: bool,
}

pub fn choose_gap(rng: &mut impl Rng) -> usize {
    rng.gen_range(GAP_RANGE)
}

pub fn pipe_frame_for(slot: usize, gap: usize) -> PipeFrame {
    if slot + 1 == gap {
        PipeFrame::BottomCap
    } else if slot == gap + GAP_SLOTS {
        PipeFrame::TopCap
    } else {
        PipeFrame::Body
    }
}

pub fn plan_row(gap: usize) -> [SlotPlan; SLOT_COUNT] {
    let mut plan = [SlotPlan::Covered; SLOT_COUNT];
    for (slot, entry) in plan.iter_mut().enumerate() {
        *entry = if slot == gap {
            SlotPlan::ScoreZone
        } else if slot > gap && slot < gap + GAP_SLOTS {
            SlotPlan::Covered
        } else {
            SlotPlan::Pipe(pipe_frame_for(slot, gap))
        };
    }
    plan
}

/// Place one row at the right edge with a random gap.
pub fn spawn_row(state: &mut GameState, rng: &mut impl Rng) -> RowReport {
    let gap = choose_gap(rng);
    spawn_row_with_gap(state, gap)
}

/// Place one row at the right edge with the given gap.  Out-of-range gaps are
/// clamped into `GAP_RANGE`.
pub fn spawn_row_with_gap(state: &mut GameState, gap: usize) -> RowReport {
    let gap = if GAP_RANGE.contains(&gap) {
        gap
    } else {
        let clamped = gap.clamp(*GAP_RANGE.start(), *GAP_RANGE.end());
        warn!("gap {gap} outside {GAP_RANGE:?}, using {clamped}");
        clamped
    };

    let slot = state.viewport.slot_size();
    let x = state.viewport.width;
    let velocity_x = state.config.scroll_velocity(&state.viewport);
    let mut report = RowReport {
        gap,
        ..RowReport::default()
    };

    for (i, entry) in plan_row(gap).into_iter().enumerate() {
        let y = slot * i as f32;
        match entry {
            SlotPlan::ScoreZone => {
                let zone = ScoreZone::new(x, y, slot, slot * GAP_SLOTS as f32, velocity_x);
                report.zone_placed = state.score_zones.insert(zone).is_some();
            }
            SlotPlan::Covered => {}
            SlotPlan::Pipe(frame) => match state.pipes.acquire(|| Pipe::new(slot)) {
                Some((_, pipe)) => {
                    pipe.activate(x, y, frame, velocity_x);
                    report.pipes_placed += 1;
                }
                None => report.pipes_dropped += 1,
            },
        }
    }

    if report.pipes_dropped > 0 || !report.zone_placed {
        debug!(
            "pool exhausted: dropped {} pipe(s), zone placed: {}",
            report.pipes_dropped, report.zone_placed
        );
    }
    debug!("row spawned with gap {gap} ({} pipes)", report.pipes_placed);
    report
}

/// Spawn task: feed it wall-clock time; it places a row whenever the spawn
/// timer fires.  Does nothing once the player is dead or the run is frozen.
pub fn advance_spawner(
    state: &mut GameState,
    delta: Duration,
    rng: &mut impl Rng,
) -> Option<RowReport> {
    if state.status == RunStatus::Frozen || state.player.is_dead() {
        return None;
    }
    if state.spawn_timer.tick(delta) {
        Some(spawn_row(state, rng))
    } else {
        None
    }
}
