//! Client-side caches.
//!
//! - `ReferenceCache`: the lookup snapshot from `/referentiels` and the
//!   selection controls bound to it
//! - `EntityListCache`: the last loaded list of each entity type, the only
//!   source for edit and detail lookups
//!
//! Nothing here is persisted; every cache starts empty and is refilled by the
//! first successful load of its view.

pub mod entity;
pub mod reference;
pub mod selection;

pub use entity::{EntityCaches, EntityListCache};
pub use reference::{ReferenceCache, REFERENCES_PATH};
pub use selection::{Selector, SelectorBoard, SelectorState};
