//! drawio-batch library crate
//!
//! Incremental batch export of draw.io diagrams through the draw.io desktop
//! application. Used by the `drawio-batch` binary and usable on its own.

pub mod cli;
pub mod config;
pub mod converter;
pub mod discovery;
pub mod error;
pub mod fingerprint_cache;
pub mod logging;
pub mod normalizer;
pub mod output;
pub mod pretty_xml;
pub mod progress;
pub mod renderer;
pub mod targets;
