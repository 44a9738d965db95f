//! Change validation and mutation engine for Lasting Power of Attorney
//! documents, with the storage and request plumbing around it.

pub mod auth;
pub mod change;
pub mod config;
pub mod error;
pub mod lpa;
pub mod parse;
pub mod problem;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod types;
pub mod update;
pub mod utils;
pub mod validate;
