//! Domain models for the risk pipeline

mod factor;
mod observation;
mod profile;
mod region;
mod risk;

pub use factor::*;
pub use observation::*;
pub use profile::*;
pub use region::*;
pub use risk::*;
