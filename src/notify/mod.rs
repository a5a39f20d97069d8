//! Delivery of update decisions
//!
//! # Modules
//!
//! - [`notifier`]: Notifier trait, logging and command-running notifiers
//! - [`surface`]: Hand-off of work to the primary surface thread

pub mod notifier;
pub mod surface;
