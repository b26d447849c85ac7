//! Hospital management demo backend: role-gated login, patient
//! registration/lookup, and a session-scoped billing ledger.

pub mod clients;
pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
