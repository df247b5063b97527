//! Domain types shared by the Livy client and the HTTP server.
//!
//! Holds the query catalog and PySpark script builder, the result
//! decoder, runtime configuration, and the error taxonomy surfaced to
//! callers.

pub mod config;
pub mod error;
pub mod result;
pub mod script;
pub mod types;
