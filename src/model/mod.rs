//! # Property Graph Model
//!
//! Plain DTOs for what the REST API hands back: nodes, relationships,
//! property values and the service root.
//!
//! Design rule: this module is pure data. No I/O, no state, no async.

pub mod node;
pub mod relationship;
pub mod entity;
pub mod value;
pub mod property_map;
pub mod service_root;

pub use node::{Node, NodeId};
pub use relationship::{Relationship, RelId, Direction};
pub use entity::EntityRef;
pub use value::Value;
pub use property_map::{PropertyMap, props};
pub use service_root::ServiceRoot;
