pub mod clients;
pub mod config;
pub mod core;
pub mod envelope;
pub mod error;
pub mod gql;
pub mod interceptors;
pub mod rest;
pub mod schema;

// Convenient re-exports
pub use crate::core::{DataEvent, Transport};
pub use envelope::{Meta, ResponseEnvelope};
pub use error::{DataError, TransportError};
pub use gql::{normalize_response, serialize_query_to_url, DataGql, QueryRequest};
pub use rest::DataRest;
pub use schema::{ScalarKind, TypeDescriptor};
