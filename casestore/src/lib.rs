#[cfg(test)]
use rstest_reuse;

mod errors;

pub mod case;
pub mod caseservice;
pub mod events;
pub mod fixtures;
pub mod model;

pub use case::Case;
pub use errors::Error;
pub use events::{CaseEvent, CaseEventBus};
