//! Record tree for dataimport.
//!
//! External system connectors describe what they found as a tree of
//! [`Record`]s. Each record carries a [`Key`](dataimport_types::Key) and an
//! opaque serialized payload that is prepared lazily, exactly once, through
//! a [`PayloadDecoder`].

mod decoder;
mod error;
mod record;
pub mod traversal;

pub use decoder::{JsonPayloadDecoder, PayloadDecoder};
pub use error::{RecordError, RecordResult};
pub use record::{Record, RecordBuilder};
