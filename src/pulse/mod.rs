//! Ambient "network pulse": a drifting node-and-edge field whose color tracks a risk score.

mod color;
mod config;
mod connections;
mod field;
mod lifecycle;
mod nodes;
mod stars;
mod surface;

pub use config::PulseConfig;
pub use field::{PulseField, run_headless};
pub use surface::{NullSurface, Surface};
