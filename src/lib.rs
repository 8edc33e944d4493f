pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod pool;
pub mod spawn;
pub mod timer;
