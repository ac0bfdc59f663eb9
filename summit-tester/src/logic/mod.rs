pub mod reports;
pub mod runner;
pub mod terrain;

pub use reports::RunSummary;
pub use runner::{MissionRunner, Pacing, RunSettings};
pub use terrain::{LoadedTrack, resolve_track};
