//! Bitset-indexed dense storage core for a data-oriented Entity-Component-System.
//!
//! An entity is a `(GroupID, EntitySubID)` pair with no intrinsic data.
//! Components live in per-type managers, each pairing a growable [`Bitset`]
//! with a cached word-level [`PrefixSumIndex`] so that membership tests,
//! dense-index lookups and iteration order are all derived from the same
//! bitset rather than a separate sparse array.
//!
//! ```
//! use densecs::context::{Context, GroupSchema};
//! use densecs::group::EntityGroup;
//! use densecs::manager::TypedManager;
//!
//! struct Position(f32, f32, f32);
//!
//! struct Schema;
//!
//! impl GroupSchema for Schema {
//!     fn build(group: &mut EntityGroup) {
//!         group.add_manager::<TypedManager<Position>>();
//!     }
//! }
//!
//! let mut ctx = Context::<Schema>::new();
//! let group = ctx.add_group();
//! let entity = ctx.add_entity(group);
//! ctx.add(entity, Position(1.0, 2.0, 3.0));
//! assert!(ctx.has::<Position>(entity));
//! ```

pub mod access;
pub mod bitset;
pub mod context;
pub mod entity;
pub mod group;
pub mod manager;
pub mod prefix_sum;

pub use access::{AccessLock, DebugAccessCheck};
pub use bitset::Bitset;
pub use context::{Context, GroupSchema, TryAddError, TryRemoveError};
pub use entity::{EntityID, EntitySubID, GroupID};
pub use group::EntityGroup;
pub use manager::{
    ComponentManagerCore, ComponentManagerDyn, ComponentRef, ComponentRefMut, FlagManager,
    TypedManager,
};
pub use prefix_sum::PrefixSumIndex;
