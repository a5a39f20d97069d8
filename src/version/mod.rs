//! Update availability checking
//!
//! This module decides whether an update site publishes a newer version of an
//! installed component. Nothing is installed and nothing is cached; every check
//! reads the installed state and the update site afresh.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Installed   │────▶│   Checker    │◀────│  Repository  │
//! │  (profile)   │     │  (decision)  │     │   (fetch)    │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │                    │
//!                             ▼                    ▼
//!                      ┌──────────────┐     ┌──────────────┐
//!                      │    Semver    │     │ Repositories │
//!                      │ (version cmp)│     │ (http, file) │
//!                      └──────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`checker`]: Update decision engine
//! - [`installed`]: Installed-state trait and readers
//! - [`repository`]: Repository trait for fetching update site metadata
//! - [`repositories`]: Concrete repositories (HTTP, local files)
//! - [`semver`]: Version parsing and comparison
//! - [`error`]: Error types for repository, version and installed-state operations
//! - [`types`]: Metadata and decision records

pub mod checker;
pub mod error;
pub mod installed;
pub mod repositories;
pub mod repository;
pub mod semver;
pub mod types;
