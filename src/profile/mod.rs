//! Eligibility profile and the conversation that fills it in.

pub mod migration;
pub mod model;
pub mod store;

pub use migration::{ProfileSource, load_profile};
pub use model::{EligibilityProfile, FieldValue, ProfileProgress, RequiredField};
pub use store::{PendingSend, ProfileStore, SendOutcome};
