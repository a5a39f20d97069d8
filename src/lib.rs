//! Start-up update availability checker
//!
//! On launch, reads the installed version of one component, fetches the
//! metadata of a configured update site and decides whether a newer version
//! is published. The decision goes to a [`notify::notifier::Notifier`];
//! nothing is downloaded or installed.

pub mod config;
pub mod logging;
pub mod notify;
pub mod startup;
pub mod version;
