//! Client-side environment failover controller.
//!
//! Holds configuration for multiple named backend environments, tracks which
//! one is active, periodically probes its health, and transparently retries
//! application operations against alternate environments when the active one
//! fails.
//!
//! ```no_run
//! use std::sync::Arc;
//! use env_failover::{EnvironmentId, FailoverController, HttpProbe};
//!
//! # async fn run() -> env_failover::FailoverResult<()> {
//! let controller = FailoverController::new(Arc::new(HttpProbe::new()));
//! controller
//!     .initialize(EnvironmentId::production(), [], true)
//!     .await?;
//!
//! let body = controller
//!     .execute_with_fallback(
//!         |config| async move {
//!             let response = reqwest::get(format!("{}/widgets", config.base_url)).await?;
//!             Ok(response.text().await?)
//!         },
//!         None,
//!         None,
//!     )
//!     .await?;
//! # let _ = body;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod health;
pub mod hub;
pub mod interceptor;
pub mod registry;
pub mod transport;

pub use config::{AuthMode, EnvironmentConfig, EnvironmentId};
pub use controller::{FailoverController, FailoverStats, ListenerToken};
pub use error::{BoxError, FailoverError, FailoverResult};
pub use health::{HealthProber, ProbeTransport, PROBE_TIMEOUT};
pub use hub::FailoverHub;
pub use interceptor::Interceptor;
pub use registry::EnvironmentRegistry;
pub use transport::HttpProbe;
