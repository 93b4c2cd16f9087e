//! # Leads Hunter
//!
//! Multi-tenant lead prospecting service: company accounts with
//! single-session logins and per-seat billing cycles, a sales funnel, and an
//! assistant-backed prospect discovery API.

pub mod accounts;
pub mod assistant;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod funnel;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod seeds;
pub mod server;
pub mod session_context;
pub mod telemetry;
pub use migration;
