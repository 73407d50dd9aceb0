//! Core trait definitions.

mod data_source;
mod indicator;
mod notifier;

pub use data_source::*;
pub use indicator::*;
pub use notifier::*;
