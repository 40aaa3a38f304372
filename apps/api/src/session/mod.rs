//! Server-side application state: one `Session` per browser tab, held in a
//! `SessionRegistry` and driven through the HTTP handlers.

pub mod controller;
pub mod handlers;
pub mod registry;
pub mod view;

pub use registry::SessionRegistry;
