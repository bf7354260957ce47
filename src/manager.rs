//! Component managers: the bitset+prefix-sum index paired with a manager's
//! own dense payload.

use core::any::Any;
use core::ops::{Deref, DerefMut};

use crate::access::{AccessLock, DebugAccessCheck};
use crate::bitset::Bitset;
use crate::entity::EntitySubID;
use crate::prefix_sum::PrefixSumIndex;

/// The bitset, prefix-sum index and access counter shared by every concrete
/// manager.
///
/// Rust has no base-class inheritance; concrete managers embed this type by
/// composition and forward to it, which is the idiomatic equivalent of the
/// abstract `ComponentManager` base class it is grounded on.
#[derive(Debug, Default)]
pub struct ComponentManagerCore {
    bitset: Bitset,
    prefix_sum: PrefixSumIndex,
    access: DebugAccessCheck,
}

impl ComponentManagerCore {
    /// Creates an empty core with no bits set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bitset: Bitset::new(),
            prefix_sum: PrefixSumIndex::new(),
            access: DebugAccessCheck::new(),
        }
    }

    /// Returns whether `sub`'s bit is set.
    #[must_use]
    pub fn has(&self, sub: EntitySubID) -> bool {
        self.bitset.has(sub.0)
    }

    /// Total number of set bits.
    #[must_use]
    pub fn component_count(&self) -> u16 {
        self.prefix_sum.total_count(&self.bitset)
    }

    /// Dense index for a currently-set bit.
    ///
    /// # Panics
    ///
    /// Panics (as a precondition violation) if `sub`'s bit is not set.
    #[must_use]
    pub fn component_index(&self, sub: EntitySubID) -> u16 {
        debug_assert!(
            self.bitset.has(sub.0),
            "component_index: no component set for {sub:?}"
        );
        self.prefix_sum.dense_index(&self.bitset, sub.0)
    }

    /// Sets `sub`'s membership bit and returns the dense index the caller
    /// must insert the new payload slot at.
    ///
    /// # Panics
    ///
    /// Panics if `sub`'s bit is already set, or if a borrow is outstanding.
    pub fn set_bit(&mut self, sub: EntitySubID) -> u16 {
        self.access.check_lock();
        assert!(
            !self.bitset.has(sub.0),
            "add: component already present for {sub:?}"
        );

        self.bitset.ensure_capacity(sub.0);
        self.prefix_sum.sync_capacity(&self.bitset);
        let index = self.prefix_sum.dense_index(&self.bitset, sub.0);

        let word = (sub.0 >> 6) as usize;
        self.bitset.set(sub.0);
        self.prefix_sum.after_set(word);
        index
    }

    /// Clears `sub`'s membership bit and returns the dense index the caller
    /// must remove the payload slot from.
    ///
    /// # Panics
    ///
    /// Panics if `sub`'s bit is not set, or if a borrow is outstanding.
    pub fn clear_bit(&mut self, sub: EntitySubID) -> u16 {
        self.access.check_lock();
        assert!(
            self.bitset.has(sub.0),
            "remove: no component present for {sub:?}"
        );

        let index = self.component_index(sub);
        let word = (sub.0 >> 6) as usize;
        self.bitset.clear(sub.0);
        self.prefix_sum.after_clear(word);
        index
    }

    /// Hints that `count` entities' worth of bitset capacity should be
    /// reserved up front.
    pub fn reserve(&mut self, count: u16) {
        self.access.check_lock();
        if count == 0 {
            return;
        }
        self.bitset.ensure_capacity(count - 1);
        self.prefix_sum.sync_capacity(&self.bitset);
    }

    /// Borrows the membership bitset.
    #[must_use]
    pub fn bitset(&self) -> &Bitset {
        &self.bitset
    }

    /// Borrows the access counter, for constructing [`ComponentRef`]s.
    #[must_use]
    pub fn access(&self) -> &DebugAccessCheck {
        &self.access
    }
}

/// The minimal object-safe surface every concrete manager exposes for
/// group-wide operations (`EntityGroup::remove_entity`,
/// `EntityGroup::reserve_entities`) that must act on a manager without
/// knowing its payload type.
///
/// Typed access (`Context::add`/`get`/`remove`) instead looks a manager up
/// by `TypeId` and downcasts via [`ComponentManagerDyn::as_any`], so there
/// is no dynamic dispatch on that hot path.
pub trait ComponentManagerDyn: Any {
    /// Borrows the membership bitset.
    fn bitset(&self) -> &Bitset;

    /// Total number of set bits.
    fn component_count(&self) -> u16;

    /// Capacity hint, forwarded from [`Context::reserve`](crate::context::Context::reserve)
    /// and [`EntityGroup::reserve_entities`](crate::group::EntityGroup::reserve_entities).
    fn reserve_dyn(&mut self, count: u16);

    /// Removes `sub`'s component, if present. A no-op otherwise. Used by
    /// `remove_entity` to clear every manager without asserting membership
    /// first.
    fn remove_if_present(&mut self, sub: EntitySubID);

    /// Upcasts to `&dyn Any` for downcasting back to the concrete manager
    /// type.
    fn as_any(&self) -> &dyn Any;

    /// Upcasts to `&mut dyn Any` for downcasting back to the concrete
    /// manager type.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A concrete manager whose payload is a single dense `Vec<T>`.
#[derive(Debug)]
pub struct TypedManager<T> {
    core: ComponentManagerCore,
    data: Vec<T>,
}

impl<T> Default for TypedManager<T> {
    // Written by hand rather than derived: `#[derive(Default)]` would add a
    // `T: Default` bound that `Vec::new()` doesn't actually need, which
    // would block registering a manager for a component type that has no
    // `Default` impl.
    fn default() -> Self {
        Self {
            core: ComponentManagerCore::new(),
            data: Vec::new(),
        }
    }
}

impl<T: 'static> TypedManager<T> {
    /// Creates an empty manager.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            core: ComponentManagerCore::new(),
            data: Vec::new(),
        }
    }

    /// Returns whether `sub` has this component.
    #[must_use]
    pub fn has(&self, sub: EntitySubID) -> bool {
        self.core.has(sub)
    }

    /// Total number of components stored.
    #[must_use]
    pub fn component_count(&self) -> u16 {
        self.core.component_count()
    }

    /// Dense index for `sub`'s component.
    #[must_use]
    pub fn component_index(&self, sub: EntitySubID) -> u16 {
        self.core.component_index(sub)
    }

    /// Borrows the dense payload array, in set-bit order.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Adds `value` as `sub`'s component. Returns the dense index it was
    /// inserted at.
    ///
    /// # Panics
    ///
    /// Panics if `sub` already has this component.
    pub fn add(&mut self, sub: EntitySubID, value: T) -> u16 {
        let index = self.core.set_bit(sub);
        self.data.insert(index as usize, value);
        index
    }

    /// Removes and returns `sub`'s component.
    ///
    /// # Panics
    ///
    /// Panics if `sub` does not have this component.
    pub fn remove(&mut self, sub: EntitySubID) -> T {
        let index = self.core.clear_bit(sub);
        self.data.remove(index as usize)
    }

    /// Reserves capacity for `count` components.
    pub fn reserve(&mut self, count: u16) {
        self.core.reserve(count);
        self.data.reserve(count as usize);
    }

    /// Borrows `sub`'s component through a debug-locked handle.
    ///
    /// # Panics
    ///
    /// Panics if `sub` does not have this component.
    #[must_use]
    pub fn get(&self, sub: EntitySubID) -> ComponentRef<'_, T> {
        let index = self.core.component_index(sub);
        ComponentRef::new(index, &self.data[index as usize], self.core.access())
    }

    /// Mutably borrows `sub`'s component through a debug-locked handle.
    ///
    /// # Panics
    ///
    /// Panics if `sub` does not have this component.
    #[must_use]
    pub fn get_mut(&mut self, sub: EntitySubID) -> ComponentRefMut<'_, T> {
        let index = self.core.component_index(sub);
        let Self { core, data } = self;
        ComponentRefMut::new(index, &mut data[index as usize], core.access())
    }
}

impl<T: Default + 'static> TypedManager<T> {
    /// Adds a default-constructed value as `sub`'s component.
    ///
    /// # Panics
    ///
    /// Panics if `sub` already has this component.
    pub fn add_default(&mut self, sub: EntitySubID) -> u16 {
        self.add(sub, T::default())
    }
}

impl<T: 'static> ComponentManagerDyn for TypedManager<T> {
    fn bitset(&self) -> &Bitset {
        self.core.bitset()
    }

    fn component_count(&self) -> u16 {
        self.core.component_count()
    }

    fn reserve_dyn(&mut self, count: u16) {
        self.reserve(count);
    }

    fn remove_if_present(&mut self, sub: EntitySubID) {
        if self.has(sub) {
            let _ = self.remove(sub);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A bitset-only manager with no dense payload, for tag-like membership.
#[derive(Clone, Debug, Default)]
pub struct FlagManager {
    bits: Bitset,
}

impl FlagManager {
    /// Creates an empty flag manager.
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: Bitset::new() }
    }

    /// Returns whether `sub` has this flag set.
    #[must_use]
    pub fn has(&self, sub: EntitySubID) -> bool {
        self.bits.has(sub.0)
    }

    /// Sets or clears `sub`'s flag, growing the bitset as needed. Does not
    /// maintain a prefix sum (none exists) and does not invoke any dense
    /// storage hook, since a `FlagManager` has no payload.
    pub fn set(&mut self, sub: EntitySubID, value: bool) {
        if value {
            self.bits.set(sub.0);
        } else {
            self.bits.clear(sub.0);
        }
    }
}

/// A debug-locked shared handle to a component, returned by
/// [`TypedManager::get`] (and, typically, [`Context::get`](crate::context::Context::get)).
pub struct ComponentRef<'a, T> {
    index: u16,
    value: &'a T,
    _lock: AccessLock<'a>,
}

impl<'a, T> ComponentRef<'a, T> {
    pub(crate) fn new(index: u16, value: &'a T, access: &'a DebugAccessCheck) -> Self {
        Self {
            index,
            value,
            _lock: AccessLock::new(access),
        }
    }

    /// The dense index this component currently occupies in its manager.
    #[must_use]
    pub fn index(&self) -> u16 {
        self.index
    }
}

impl<T> Deref for ComponentRef<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value
    }
}

/// A debug-locked mutable handle to a component, returned by
/// [`TypedManager::get_mut`]/[`TypedManager::add`] (and, typically,
/// [`Context::get_mut`](crate::context::Context::get_mut)/[`Context::add`](crate::context::Context::add)).
pub struct ComponentRefMut<'a, T> {
    index: u16,
    value: &'a mut T,
    _lock: AccessLock<'a>,
}

impl<'a, T> ComponentRefMut<'a, T> {
    pub(crate) fn new(index: u16, value: &'a mut T, access: &'a DebugAccessCheck) -> Self {
        Self {
            index,
            value,
            _lock: AccessLock::new(access),
        }
    }

    /// The dense index this component currently occupies in its manager.
    #[must_use]
    pub fn index(&self) -> u16 {
        self.index
    }
}

impl<T> Deref for ComponentRefMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value
    }
}

impl<T> DerefMut for ComponentRefMut<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct Vec3(f32, f32, f32);

    #[test]
    fn scenario_add_in_order() {
        let mut position = TypedManager::<Vec3>::new();

        position.add(EntitySubID(1), Vec3(1.0, 2.0, 3.0));
        assert_eq!(position.component_count(), 1);
        assert_eq!(position.component_index(EntitySubID(1)), 0);
        assert_eq!(*position.get(EntitySubID(1)), Vec3(1.0, 2.0, 3.0));

        position.add(EntitySubID(0), Vec3(9.0, 9.0, 9.0));
        assert_eq!(position.component_index(EntitySubID(0)), 0);
        assert_eq!(position.component_index(EntitySubID(1)), 1);
        assert_eq!(position.component_count(), 2);
        assert_eq!(
            position.data(),
            &[Vec3(9.0, 9.0, 9.0), Vec3(1.0, 2.0, 3.0)]
        );

        position.remove(EntitySubID(0));
        assert_eq!(position.component_index(EntitySubID(1)), 0);
        assert_eq!(position.component_count(), 1);
        assert_eq!(position.data(), &[Vec3(1.0, 2.0, 3.0)]);
    }

    #[test]
    #[should_panic(expected = "already present")]
    fn double_add_panics() {
        let mut position = TypedManager::<Vec3>::new();
        position.add(EntitySubID(0), Vec3::default());
        position.add(EntitySubID(0), Vec3::default());
    }

    #[test]
    #[should_panic(expected = "no component present")]
    fn remove_absent_panics() {
        let mut position = TypedManager::<Vec3>::new();
        position.remove(EntitySubID(0));
    }

    #[test]
    fn flag_manager_has_no_dense_storage() {
        let mut dead = FlagManager::new();
        assert!(!dead.has(EntitySubID(0)));
        dead.set(EntitySubID(0), true);
        assert!(dead.has(EntitySubID(0)));
        dead.set(EntitySubID(0), false);
        assert!(!dead.has(EntitySubID(0)));
    }

    #[test]
    fn flag_manager_set_auto_grows() {
        let mut dead = FlagManager::new();
        dead.set(EntitySubID(500), true);
        assert!(dead.has(EntitySubID(500)));
    }
}
