//! Client for the object-storage service behind message attachments.
//!
//! [`StorageGateway`] uploads, retrieves and deletes objects. Every
//! authorized call goes through an explicit [`StorageSession`] that the
//! caller owns and may share between gateways.

#![deny(clippy::print_stdout, clippy::print_stderr)]

mod client;
pub mod config_types;
pub mod content_type;
pub mod error;
mod object_name;
mod retrieval;
mod session;

pub use client::StorageGateway;
pub use config_types::StorageConfig;
pub use content_type::ContentHeaders;
pub use error::StorageErr;
pub use object_name::canonical_object_name;
pub use object_name::sanitize_object_name;
pub use retrieval::FetchedObject;
pub use retrieval::ObjectResponse;
pub use retrieval::Retrieval;
pub use session::Authorization;
pub use session::StorageSession;
