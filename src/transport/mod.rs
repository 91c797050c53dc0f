//! Bundled transport collaborators.
//!
//! The core treats the transport as an injected dependency; this module
//! ships the common case so applications embedding the controller against
//! an HTTP backend do not have to write their own probe.

pub mod http;

pub use http::HttpProbe;
