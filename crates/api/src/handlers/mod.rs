//! Request handlers.
//!
//! Handlers resolve the requested query, hand it to the shared
//! [`QueryRunner`](salespark_livy::lifecycle::QueryRunner) and map failures
//! via [`AppError`](crate::error::AppError).

pub mod queries;
