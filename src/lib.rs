//! Hulpwijzer: client-side coordinator for a benefits-eligibility assistant.
//!
//! Owns the eligibility profile, the conversation with the remote
//! eligibility service, and the applications the user has started.

pub mod applications;
pub mod config;
pub mod contact;
pub mod context;
pub mod error;
pub mod i18n;
pub mod profile;
pub mod programs;
pub mod session;
pub mod storage;
