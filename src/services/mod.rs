//! Client services wrapping the backend contracts.
//!
//! ARCHITECTURE
//! ============
//! Services own the app-level rules (register-then-login, best-effort file
//! cleanup, record validation) so forms and views stay focused on input
//! handling and navigation.

pub mod content;
pub mod session;
