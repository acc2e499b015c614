//! Shared types: configuration, errors, routes and fragments.

pub mod config;
pub mod errors;
pub mod fragment;
pub mod route;
