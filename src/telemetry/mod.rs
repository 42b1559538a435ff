pub mod cadence;
pub mod integrator;
pub mod hub;

pub use cadence::Cadence;
pub use integrator::Integrator;
pub use hub::{Fired, TelemetryHub};
