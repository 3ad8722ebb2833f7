//! # iotd Core Node Model
//!
//! The atomic record of the data server. A [`Node`] describes one device,
//! sensor or logical entity: a fixed identity (`id`, `name`, `class`,
//! `status`, `group`), a last-observed timestamp, an optional [`PinObject`],
//! free-form custom attributes and an ordered set of [`NodeItem`] readings.
//!
//! ## Serialization
//!
//! Nodes have two projections, both produced on demand by the query front-end:
//!
//! - **Markup** ([`Node::to_markup`], [`Node::write_markup`]): a `Node` element
//!   with identity and custom attributes, an optional `pin` child and an
//!   optional `Items` child holding one `Item` per reading.
//! - **Structured object** ([`Node::to_object`], `impl Serialize for Node`):
//!   flat identity fields with custom attributes merged at the top level, an
//!   optional `pin` object and an optional `items` array.
//!
//! Both are best-effort. Timestamps are written at second resolution only.
//!
//! ## Reserved words
//!
//! Custom attribute keys matching [`RESERVED_WORDS`] (any case) are rejected
//! with an error log instead of failing the caller.
pub mod error;
pub mod identity;
pub mod item;
pub mod markup;
pub mod model;
pub mod object;
pub mod pin;
pub mod status;

pub use error::NodeError;
pub use identity::NodeIdentity;
pub use item::NodeItem;
pub use markup::nodes_to_markup;
pub use model::{
    DEFAULT_CLASS_NAME, Node, NodeBuilder, RESERVED_WORDS, UPDATED_TIME_FORMAT, format_updated_time,
    is_reserved_word, parse_updated_time, truncate_to_seconds,
};
pub use object::nodes_to_object;
pub use pin::PinObject;
pub use status::NodeStatus;

// Test module declaration
#[cfg(test)]
mod tests;
