//! Records domain module
//!
//! Payload types of the fetch-data endpoint, date validation, the error
//! taxonomy reported in response bodies, and the record store backends.

mod date;
mod error;
mod model;
pub mod store;

pub use error::{RequestError, StoreError};
pub use model::{Record, RecordFilter, RecordsRequestPayload, RecordsResponsePayload};
pub use store::RecordStore;
