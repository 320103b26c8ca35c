//! Users service
//!
//! CRUD over a single user resource held in memory, with JSON/XML content
//! negotiation, patch documents, and paginated listings.

pub mod error;
pub mod models;
pub mod negotiate;
pub mod patch;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
