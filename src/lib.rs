//! Turnstile - permission evaluation and route-guard core for the crew
//! management console.
//!
//! The backend owns roles, users, and permission assignments; this crate
//! owns the client-observable evaluation semantics: wildcard matching,
//! effective-set aggregation, the permission-editing state machine, and
//! the guards that turn an evaluation into a redirect or render decision.

pub mod authz;
pub mod errors;
pub mod session;
pub mod settings;
pub mod web;
