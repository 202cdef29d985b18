//! Client-side application state.
//!
//! DESIGN
//! ======
//! State objects are owned by the application root and handed out as cheap
//! clones. Nothing here is global; tests build as many independent states as
//! they need.

pub mod auth;
