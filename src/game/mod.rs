// Level/encounter engine: maze generation, pursuit, fog and sonar

pub mod audio;
pub mod engine;
pub mod grid;
pub mod pursuer;
pub mod sonar;
pub mod visibility;

pub use audio::{AudioFrame, AudioMixer, Cue};
pub use engine::{Engine, EngineError, RunSummary};
pub use grid::LevelGenerator;
pub use sonar::{BOOST_DURATION, RECHARGE_INTERVAL};
pub use visibility::Visibility;
