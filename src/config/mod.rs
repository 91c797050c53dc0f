//! Environment configuration subsystem.
//!
//! # Data Flow
//! ```text
//! Caller-supplied overrides (programmatic)
//!     → overlaid on built-in defaults at initialize
//!     → EnvironmentConfig (immutable once registered)
//!     → shared by clone to prober / fallback executor
//! ```
//!
//! # Design Decisions
//! - Configs are immutable values; behavior changes replace the registry entry
//! - All fields beyond base URL and primary key have sensible defaults
//! - Interceptors ride inside the config so hooks follow the environment

pub mod schema;

pub(crate) use schema::builtin_defaults;

pub use schema::AuthMode;
pub use schema::EnvironmentConfig;
pub use schema::EnvironmentId;
