//! A group: a fixed registry of component managers plus an entity allocator.

use core::any::{Any, TypeId};

use rustc_hash::FxHashMap;

use crate::entity::EntitySubID;
use crate::manager::{ComponentManagerDyn, FlagManager};

/// A registry of component managers shared by every entity in the group,
/// plus a free-list entity allocator.
///
/// The manager registry is built once, by a [`GroupSchema`](crate::context::GroupSchema),
/// before any entity is allocated; see [`EntityGroup::add_manager`]/[`EntityGroup::add_flag`].
#[derive(Default)]
pub struct EntityGroup {
    entity_max: u16,
    free_list: Vec<EntitySubID>,
    managers: FxHashMap<TypeId, Box<dyn ComponentManagerDyn>>,
    flags: FxHashMap<TypeId, FlagManager>,
}

impl EntityGroup {
    /// Creates a group with no managers and no entities.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value-carrying or custom manager of concrete type `M`.
    ///
    /// # Panics
    ///
    /// Panics if the group already has entities allocated, or if `M` is
    /// already registered.
    pub fn add_manager<M: ComponentManagerDyn + Default + 'static>(&mut self) {
        assert_eq!(
            self.entity_max, 0,
            "add_manager: group registry is frozen once entities exist"
        );
        let key = TypeId::of::<M>();
        assert!(
            self.managers.insert(key, Box::new(M::default())).is_none(),
            "add_manager: {} already registered",
            core::any::type_name::<M>()
        );
    }

    /// Registers a flag (tag-only) manager keyed by the zero-sized type `F`.
    ///
    /// # Panics
    ///
    /// Panics if the group already has entities allocated, or if `F` is
    /// already registered.
    pub fn add_flag<F: 'static>(&mut self) {
        assert_eq!(
            self.entity_max, 0,
            "add_flag: group registry is frozen once entities exist"
        );
        let key = TypeId::of::<F>();
        assert!(
            self.flags.insert(key, FlagManager::new()).is_none(),
            "add_flag: {} already registered",
            core::any::type_name::<F>()
        );
    }

    /// Borrows the manager of concrete type `M`.
    ///
    /// # Panics
    ///
    /// Panics if `M` was never registered via [`EntityGroup::add_manager`].
    #[must_use]
    pub fn manager<M: ComponentManagerDyn + 'static>(&self) -> &M {
        self.managers
            .get(&TypeId::of::<M>())
            .unwrap_or_else(|| panic_missing_manager::<M>())
            .as_any()
            .downcast_ref::<M>()
            .expect("manager registry corrupted: TypeId/concrete type mismatch")
    }

    /// Mutably borrows the manager of concrete type `M`.
    ///
    /// # Panics
    ///
    /// Panics if `M` was never registered via [`EntityGroup::add_manager`].
    pub fn manager_mut<M: ComponentManagerDyn + 'static>(&mut self) -> &mut M {
        self.managers
            .get_mut(&TypeId::of::<M>())
            .unwrap_or_else(|| panic_missing_manager::<M>())
            .as_any_mut()
            .downcast_mut::<M>()
            .expect("manager registry corrupted: TypeId/concrete type mismatch")
    }

    /// Borrows the flag manager keyed by `F`.
    ///
    /// # Panics
    ///
    /// Panics if `F` was never registered via [`EntityGroup::add_flag`].
    #[must_use]
    pub fn flag<F: 'static>(&self) -> &FlagManager {
        self.flags
            .get(&TypeId::of::<F>())
            .unwrap_or_else(|| panic!("no flag registered for {}", core::any::type_name::<F>()))
    }

    /// Mutably borrows the flag manager keyed by `F`.
    ///
    /// # Panics
    ///
    /// Panics if `F` was never registered via [`EntityGroup::add_flag`].
    pub fn flag_mut<F: 'static>(&mut self) -> &mut FlagManager {
        self.flags
            .get_mut(&TypeId::of::<F>())
            .unwrap_or_else(|| panic!("no flag registered for {}", core::any::type_name::<F>()))
    }

    /// Allocates a sub-id: reuses the most recently freed one if any, else
    /// issues a fresh one and grows `entity_max`.
    ///
    /// # Panics
    ///
    /// Panics if the group already has `u16::MAX` live sub-ids.
    pub fn add_entity(&mut self) -> EntitySubID {
        if let Some(sub) = self.free_list.pop() {
            return sub;
        }

        assert!(self.entity_max < u16::MAX, "add_entity: group is full");
        let sub = EntitySubID(self.entity_max);
        self.entity_max += 1;
        sub
    }

    /// Clears every component/flag bit set for `sub`, then recycles it onto
    /// the free list.
    ///
    /// # Panics
    ///
    /// Panics if `sub` is out of range for this group.
    pub fn remove_entity(&mut self, sub: EntitySubID) {
        assert!(
            self.is_valid_sub(sub),
            "remove_entity: {sub:?} out of range"
        );

        for manager in self.managers.values_mut() {
            manager.remove_if_present(sub);
        }
        for flag in self.flags.values_mut() {
            flag.set(sub, false);
        }
        self.free_list.push(sub);
    }

    /// Hints every manager to reserve capacity for `n` entities.
    pub fn reserve_entities(&mut self, n: u16) {
        for manager in self.managers.values_mut() {
            manager.reserve_dyn(n);
        }
    }

    /// The upper bound on sub-ids ever issued by this group.
    #[must_use]
    pub fn entity_max(&self) -> u16 {
        self.entity_max
    }

    /// Whether `sub` is within the range of sub-ids this group has issued.
    ///
    /// A `true` result does not imply `sub` is currently live; a freed
    /// sub-id still satisfies this check until it is reused.
    #[must_use]
    pub fn is_valid_sub(&self, sub: EntitySubID) -> bool {
        sub.0 < self.entity_max
    }
}

#[cold]
#[inline(never)]
fn panic_missing_manager<M: 'static>() -> ! {
    panic!(
        "no manager registered for {}",
        core::any::type_name::<M>()
    )
}
