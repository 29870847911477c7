mod cadence;
mod component;
mod config;
mod gate;
mod prediction;
mod replicated;
mod state;

pub use cadence::DueShots;
pub use component::{StepReport, WeaponComponent};
pub use config::{ConfigError, WeaponConfig};
pub use gate::{FireGate, GateFn, IdleGate};
pub use prediction::{FireDedup, PredictionLedger};
pub use replicated::Replicated;
pub use state::{FireState, FireTiming};
