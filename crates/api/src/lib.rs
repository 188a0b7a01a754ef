//! `warden-api` — HTTP surface for the permission engine.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
