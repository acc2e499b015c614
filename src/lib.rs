//! # routeview
//!
//! Keep-alive router view: renders the component matched by the current
//! route and keeps previously rendered instances alive in a bounded LRU
//! cache, restoring their scroll position when they come back.
//!
//! ## Modules
//!
//! - [`view`] - The view slot and its render pipeline
//! - [`cache`] - LRU cache of rendered instances and cache keys
//! - [`scroll`] - Deferred scroll capture and restore
//! - [`hooks`] - Lifecycle hooks and per-route instance registration
//! - [`engine`] - Rendering engine abstraction and an in-memory engine
//! - [`history`] - Navigation history state keys
//! - [`sim`] - Script-driven navigation over the in-memory engine
//! - [`types`] - Shared types
//! - [`cli`] - Command line interface

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod engine;
pub mod history;
pub mod hooks;
pub mod scroll;
pub mod sim;
pub mod types;
pub mod view;

pub use types::config::Config;
pub use types::errors::{RouteViewError, RouteViewResult};
pub use view::{RenderContext, RouterView};
