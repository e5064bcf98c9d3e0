//! The spectracube service: configuration and the HTTP query surface.
//!
//! The heavy lifting lives in `spectracube_container` (cube store, ingest
//! pipeline, profile engine) and `spectracube_geometry` (geometry kernel);
//! this crate wires them to a YAML configuration, an axum server and the
//! command-line interface of the `spectracube` binary.

pub mod config;
pub mod server;

pub use config::Config;
