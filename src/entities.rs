//! All game entity types: plain data plus the motion capability they share.
//!
//! Behaviour that changes more than one entity (physics, overlaps, scoring,
//! freezing) lives in `compute`; this module only holds the state and the
//! single-entity transitions (activate, kill, one-shot trigger).

use crate::config::GameConfig;
use crate::events::DeathCause;
use crate::pool::Pool;
use crate::timer::RepeatingTimer;

/// Number of equal-height slots an obstacle row is divided into.
pub const SLOT_COUNT: usize = 7;

/// Where pooled entities sit before activation.
pub const OFFSCREEN_SENTINEL: f32 = -100.0;

/// Length of one flap animation cycle (two sprite frames at 2 fps).
pub const FLAP_ANIM_SECS: f32 = 1.0;

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Size of the play field in world units.  Origin is the top-left corner,
/// y grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Height (and pipe width) of one obstacle slot.
    pub fn slot_size(&self) -> f32 {
        self.height / SLOT_COUNT as f32
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Strict overlap: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

// ── Shared motion ─────────────────────────────────────────────────────────────

/// Position and velocity in world units (per second).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MovingBody {
    pub x: f32,
    pub y: f32,
    pub velocity_x: f32,
    pub velocity_y: f32,
}

impl MovingBody {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Linear motion over `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.x += self.velocity_x * dt;
        self.y += self.velocity_y * dt;
    }
}

/// Anything that drifts across the play field and gets culled once it has
/// left it on the left-hand side.
pub trait Moving {
    fn body(&self) -> &MovingBody;
    fn body_mut(&mut self) -> &mut MovingBody;
    /// `(width, height)` of the collision box.
    fn size(&self) -> (f32, f32);

    fn position(&self) -> (f32, f32) {
        (self.body().x, self.body().y)
    }

    fn velocity(&self) -> (f32, f32) {
        (self.body().velocity_x, self.body().velocity_y)
    }

    fn advance(&mut self, dt: f32) {
        self.body_mut().advance(dt);
    }

    fn bounds(&self) -> Rect {
        let (width, height) = self.size();
        Rect {
            x: self.body().x,
            y: self.body().y,
            width,
            height,
        }
    }

    /// True once the entity is more than `factor` of its own widths past the
    /// left edge.
    fn is_offscreen(&self, factor: f32) -> bool {
        self.body().x < -factor * self.size().0
    }
}

// ── Pipes ─────────────────────────────────────────────────────────────────────

/// Sprite-sheet frame of a pipe segment.  The discriminant is the frame index.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PipeFrame {
    /// Opening that faces up; sits directly below the gap.
    #[default]
    TopCap = 0,
    Body = 1,
    /// Opening that faces down; sits directly above the gap.
    BottomCap = 2,
}

impl PipeFrame {
    pub fn index(self) -> u8 {
        self as u8
    }
}

/// One square barrier segment.
#[derive(Clone, Debug, PartialEq)]
pub struct Pipe {
    pub body: MovingBody,
    pub frame: PipeFrame,
    pub active: bool,
    /// Edge length; pipes are one slot wide and one slot tall.
    pub size: f32,
}

impl Pipe {
    /// A parked pipe: off-screen, not moving, not colliding.
    pub fn new(size: f32) -> Self {
        Self {
            body: MovingBody::at(OFFSCREEN_SENTINEL, OFFSCREEN_SENTINEL),
            frame: PipeFrame::default(),
            active: false,
            size,
        }
    }

    pub fn activate(&mut self, x: f32, y: f32, frame: PipeFrame, velocity_x: f32) {
        self.active = true;
        self.body.velocity_x = velocity_x;
        self.body.x = x;
        self.body.y = y;
        self.frame = frame;
    }
}

impl Moving for Pipe {
    fn body(&self) -> &MovingBody {
        &self.body
    }
    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.body
    }
    fn size(&self) -> (f32, f32) {
        (self.size, self.size)
    }
}

// ── Score zones ───────────────────────────────────────────────────────────────

/// Invisible trigger filling the gap of one row.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreZone {
    pub body: MovingBody,
    pub width: f32,
    pub height: f32,
    pub triggered: bool,
}

impl ScoreZone {
    pub fn new(x: f32, y: f32, width: f32, height: f32, velocity_x: f32) -> Self {
        Self {
            body: MovingBody {
                velocity_x,
                ..MovingBody::at(x, y)
            },
            width,
            height,
            triggered: false,
        }
    }

    /// Returns `true` only on the first call; that call is the one that scores.
    pub fn handle_overlap(&mut self) -> bool {
        if self.triggered {
            return false;
        }
        self.triggered = true;
        true
    }
}

impl Moving for ScoreZone {
    fn body(&self) -> &MovingBody {
        &self.body
    }
    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.body
    }
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PlayerAnim {
    #[default]
    Idle,
    /// Seconds since the flap started.
    Flap { elapsed: f32 },
    Dead,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: MovingBody,
    pub width: f32,
    pub height: f32,
    pub anim: PlayerAnim,
    flapping: bool,
    dead: bool,
}

impl Player {
    /// Spawn at `(x, y)` at rest and alive.
    pub fn activate(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            body: MovingBody::at(x, y),
            width,
            height,
            anim: PlayerAnim::Idle,
            flapping: false,
            dead: false,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_flapping(&self) -> bool {
        self.flapping
    }

    pub fn set_flapping(&mut self, flapping: bool) {
        self.flapping = flapping;
    }

    /// Alive → Dead.  Returns whether the transition happened; calling it on
    /// a dead player changes nothing.
    pub fn kill(&mut self) -> bool {
        if self.dead {
            return false;
        }
        self.dead = true;
        self.anim = PlayerAnim::Dead;
        true
    }

    /// Sprite-sheet frame: 0 idle, 1 wings down, 2 dead.
    pub fn sprite_frame(&self) -> u8 {
        match self.anim {
            PlayerAnim::Idle => 0,
            PlayerAnim::Flap { elapsed } if elapsed < FLAP_ANIM_SECS / 2.0 => 1,
            PlayerAnim::Flap { .. } => 0,
            PlayerAnim::Dead => 2,
        }
    }
}

impl Moving for Player {
    fn body(&self) -> &MovingBody {
        &self.body
    }
    fn body_mut(&mut self) -> &mut MovingBody {
        &mut self.body
    }
    fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// What the player is holding down this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    /// Space / Up / W.
    pub key_held: bool,
    /// Mouse button.
    pub pointer_held: bool,
}

impl InputState {
    pub fn held(&self) -> bool {
        self.key_held || self.pointer_held
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    /// Player is dead; obstacles are pinned in place until culled.
    Frozen,
}

/// Everything one run owns.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub viewport: Viewport,
    pub player: Player,
    pub pipes: Pool<Pipe>,
    pub score_zones: Pool<ScoreZone>,
    pub score: u32,
    pub status: RunStatus,
    pub death: Option<DeathCause>,
    /// Drives row spawning; cancelled when the run freezes.
    pub spawn_timer: RepeatingTimer,
    /// Set once the navigate-back signal has been emitted.
    pub return_requested: bool,
    pub frame: u64,
}
