//! quillpost: client library for a blog hosted on an Appwrite-compatible
//! backend.
//!
//! ARCHITECTURE
//! ============
//! `backend` holds the provider contracts and their HTTP and in-memory
//! implementations. `services` wraps them with the app's rules, `state` and
//! `routes` track who is signed in and what they may see, `forms` and
//! `views` drive individual pages. [`app::App`] wires it all together.

pub mod app;
pub mod backend;
pub mod config;
pub mod forms;
pub mod model;
pub mod routes;
pub mod services;
pub mod state;
pub mod text;
pub mod views;
