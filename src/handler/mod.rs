//! Request handler module
//!
//! Request routing dispatch and the record endpoints.

pub mod fetch_data;
pub mod get_data;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
