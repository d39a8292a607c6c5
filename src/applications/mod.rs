//! Multi-step applications the user has started, and the catalog that seeds them.

pub mod catalog;
pub mod flow;
pub mod model;
pub mod tracker;

pub use catalog::{ApplicationStep, ProgramCatalog, ProgramSteps};
pub use flow::{ApplicationFlow, StepStatus};
pub use model::{NewApplication, UserApplication, progress_percent};
pub use tracker::ApplicationTracker;
