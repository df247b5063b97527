//! Apache Livy REST client and per-request session lifecycle.
//!
//! Provides typed wire messages, an HTTP wrapper around the Livy session
//! and statement endpoints, the [`gateway::Gateway`] seam the controller
//! talks through, and [`lifecycle::QueryRunner`], which drives one
//! ephemeral Spark session from creation to guaranteed deletion.

pub mod api;
pub mod gateway;
pub mod lease;
pub mod lifecycle;
pub mod messages;
pub mod polling;
