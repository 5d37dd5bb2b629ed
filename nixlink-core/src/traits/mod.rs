//! Collaborator traits
//!
//! These traits define the interface between the dispatcher and the
//! parts of the firmware it drives but does not own.

pub mod evaluator;
pub mod indicator;

pub use evaluator::{CommandEvaluator, Evaluation};
pub use indicator::{Indicator, Indicators, LedIndicators};
