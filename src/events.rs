//! Side effects produced by the simulation, handed to the front end.
//!
//! The simulation never plays sounds or navigates; it reports what happened
//! during a frame and the caller decides how to present it.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathCause {
    /// Left the play field through the top or the bottom.
    OutOfBounds,
    /// Touched a pipe.
    Collision,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A new obstacle row entered at the right edge.
    RowSpawned { gap: usize },
    Flapped,
    /// Score after the increment.
    Scored(u32),
    /// Player hit a pipe (the "boop").
    Collided,
    /// The run froze.
    Died(DeathCause),
    /// The dead player has fallen past the bottom; leave the run.
    ReturnToMenu,
}
