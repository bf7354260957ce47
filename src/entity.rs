//! Entity and group identity.

use core::cmp::Ordering;
use core::fmt;

/// Identifies a group within a [`Context`](crate::context::Context).
///
/// Opaque 16-bit index; `GroupID(0xFFFF)` is reserved as part of the
/// [`EntityID::NONE`] sentinel and is never returned by
/// [`Context::add_group`](crate::context::Context::add_group).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupID(pub u16);

impl fmt::Debug for GroupID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupID({})", self.0)
    }
}

/// Identifies an entity within a single group.
///
/// Opaque 16-bit index; `EntitySubID(0xFFFF)` is reserved as part of the
/// [`EntityID::NONE`] sentinel.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntitySubID(pub u16);

impl fmt::Debug for EntitySubID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntitySubID({})", self.0)
    }
}

/// A 32-bit entity identifier: a group index and a sub-index within that
/// group.
///
/// Ordering is group-major: entities are first ordered by `group`, then by
/// `sub`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityID {
    /// The group this entity lives in.
    pub group: GroupID,
    /// The entity's index within its group.
    pub sub: EntitySubID,
}

impl EntityID {
    /// The sentinel "no entity" value: an all-ones `(group, sub)` pair.
    pub const NONE: EntityID = EntityID {
        group: GroupID(u16::MAX),
        sub: EntitySubID(u16::MAX),
    };

    /// Creates an entity id from a group and a sub-id.
    #[must_use]
    pub const fn new(group: GroupID, sub: EntitySubID) -> Self {
        Self { group, sub }
    }
}

impl Default for EntityID {
    fn default() -> Self {
        Self::NONE
    }
}

impl PartialOrd for EntityID {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EntityID {
    fn cmp(&self, other: &Self) -> Ordering {
        self.group.cmp(&other.group).then(self.sub.cmp(&other.sub))
    }
}

impl fmt::Debug for EntityID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityID")
            .field("group", &self.group.0)
            .field("sub", &self.sub.0)
            .finish()
    }
}

impl fmt::Display for EntityID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group.0, self.sub.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_all_ones() {
        assert_eq!(EntityID::NONE.group.0, u16::MAX);
        assert_eq!(EntityID::NONE.sub.0, u16::MAX);
    }

    #[test]
    fn ordering_is_group_major() {
        let a = EntityID::new(GroupID(0), EntitySubID(5));
        let b = EntityID::new(GroupID(1), EntitySubID(0));
        assert!(a < b);

        let c = EntityID::new(GroupID(0), EntitySubID(1));
        let d = EntityID::new(GroupID(0), EntitySubID(2));
        assert!(c < d);
    }
}
