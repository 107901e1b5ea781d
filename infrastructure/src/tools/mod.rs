//! Tool catalog adapters
//!
//! Tool definitions live in the application layer; this module only
//! describes them on the wire.

mod schema;

pub use schema::JsonSchemaToolConverter;
