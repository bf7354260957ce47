//! The front door: `Context<S>` owns every group of a schema `S` and
//! dispatches add/remove/query operations to them.

use core::fmt;
use core::marker::PhantomData;
use std::error::Error;

use crate::entity::{EntityID, EntitySubID, GroupID};
use crate::group::EntityGroup;
use crate::manager::{ComponentRef, ComponentRefMut, TypedManager};

/// Fixes, at the type level, which managers every group owned by a
/// `Context<S>` has.
///
/// A `GroupSchema` is a zero-sized marker type; `build` is the Rust
/// equivalent of a hand-written `EntityGroup` subclass constructor that
/// calls `add_manager`/`add_flag` once for each manager the group needs.
/// It runs exactly once per group, before any entity is allocated.
pub trait GroupSchema: 'static {
    /// Registers every manager this schema's groups own.
    fn build(group: &mut EntityGroup);
}

/// Owns a sparse vector of groups, all built from the same [`GroupSchema`].
///
/// Removed groups leave a vacancy (`None`) that [`Context::add_group`]
/// refills before appending a new slot.
pub struct Context<S: GroupSchema> {
    groups: Vec<Option<EntityGroup>>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: GroupSchema> Default for Context<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GroupSchema> Context<S> {
    /// Creates a context with no groups.
    #[must_use]
    pub fn new() -> Self {
        Self {
            groups: Vec::new(),
            _schema: PhantomData,
        }
    }

    /// Builds a fresh group via `S::build`, filling the first vacant slot if
    /// any, else appending.
    pub fn add_group(&mut self) -> GroupID {
        let mut group = EntityGroup::new();
        S::build(&mut group);

        if let Some(index) = self.groups.iter().position(Option::is_none) {
            self.groups[index] = Some(group);
            return GroupID(index as u16);
        }

        assert!(self.groups.len() < usize::from(u16::MAX), "add_group: context is full");
        self.groups.push(Some(group));
        GroupID((self.groups.len() - 1) as u16)
    }

    /// Drops group `g`, cascading to every manager it owns. The slot becomes
    /// vacant and may be reused by a later [`Context::add_group`].
    ///
    /// # Panics
    ///
    /// Panics if `g` is not valid.
    pub fn remove_group(&mut self, g: GroupID) {
        assert!(self.is_valid_group(g), "remove_group: {g:?} is not valid");
        self.groups[g.0 as usize] = None;
    }

    /// Whether `g` refers to a currently-occupied slot.
    #[must_use]
    pub fn is_valid_group(&self, g: GroupID) -> bool {
        self.groups
            .get(g.0 as usize)
            .is_some_and(Option::is_some)
    }

    /// Whether `e`'s group is valid and `e.sub` is within the range of
    /// sub-ids that group has issued.
    #[must_use]
    pub fn is_valid(&self, e: EntityID) -> bool {
        self.is_valid_group(e.group) && self.group(e.group).is_valid_sub(e.sub)
    }

    /// Allocates a new entity in group `g`.
    ///
    /// # Panics
    ///
    /// Panics if `g` is not valid.
    pub fn add_entity(&mut self, g: GroupID) -> EntityID {
        let sub = self.group_mut(g).add_entity();
        EntityID::new(g, sub)
    }

    /// Clears every component of `e` and recycles its sub-id.
    ///
    /// # Panics
    ///
    /// Panics if `e` is not valid.
    pub fn remove_entity(&mut self, e: EntityID) {
        assert!(self.is_valid(e), "remove_entity: {e:?} is not valid");
        self.group_mut(e.group).remove_entity(e.sub);
    }

    /// Whether `e` has a component of type `T`.
    ///
    /// # Panics
    ///
    /// Panics if `e` is not valid or `T` was never registered by the schema.
    #[must_use]
    pub fn has<T: 'static>(&self, e: EntityID) -> bool {
        assert!(self.is_valid(e), "has: {e:?} is not valid");
        self.group(e.group).manager::<TypedManager<T>>().has(e.sub)
    }

    /// Borrows `e`'s `T` component.
    ///
    /// # Panics
    ///
    /// Panics if `e` is not valid or does not have a `T` component.
    #[must_use]
    pub fn get<T: 'static>(&self, e: EntityID) -> ComponentRef<'_, T> {
        assert!(self.is_valid(e), "get: {e:?} is not valid");
        self.group(e.group).manager::<TypedManager<T>>().get(e.sub)
    }

    /// Mutably borrows `e`'s `T` component.
    ///
    /// # Panics
    ///
    /// Panics if `e` is not valid or does not have a `T` component.
    pub fn get_mut<T: 'static>(&mut self, e: EntityID) -> ComponentRefMut<'_, T> {
        assert!(self.is_valid(e), "get_mut: {e:?} is not valid");
        self.group_mut(e.group)
            .manager_mut::<TypedManager<T>>()
            .get_mut(e.sub)
    }

    /// Adds `value` as `e`'s `T` component.
    ///
    /// # Panics
    ///
    /// Panics if `e` is not valid or already has a `T` component.
    pub fn add<T: 'static>(&mut self, e: EntityID, value: T) -> ComponentRefMut<'_, T> {
        assert!(self.is_valid(e), "add: {e:?} is not valid");
        let manager = self.group_mut(e.group).manager_mut::<TypedManager<T>>();
        manager.add(e.sub, value);
        manager.get_mut(e.sub)
    }

    /// Removes `e`'s `T` component.
    ///
    /// # Panics
    ///
    /// Panics if `e` is not valid or does not have a `T` component.
    pub fn remove<T: 'static>(&mut self, e: EntityID) {
        assert!(self.is_valid(e), "remove: {e:?} is not valid");
        self.group_mut(e.group)
            .manager_mut::<TypedManager<T>>()
            .remove(e.sub);
    }

    /// Whether `e` has flag `F` set.
    ///
    /// # Panics
    ///
    /// Panics if `e` is not valid or `F` was never registered by the schema.
    #[must_use]
    pub fn has_flag<F: 'static>(&self, e: EntityID) -> bool {
        assert!(self.is_valid(e), "has_flag: {e:?} is not valid");
        self.group(e.group).flag::<F>().has(e.sub)
    }

    /// Sets or clears flag `F` on `e`.
    ///
    /// # Panics
    ///
    /// Panics if `e` is not valid or `F` was never registered by the schema.
    pub fn set_flag<F: 'static>(&mut self, e: EntityID, value: bool) {
        assert!(self.is_valid(e), "set_flag: {e:?} is not valid");
        self.group_mut(e.group).flag_mut::<F>().set(e.sub, value);
    }

    /// Reserves capacity for `n` groups.
    pub fn reserve_groups(&mut self, n: u16) {
        self.groups.reserve(usize::from(n));
    }

    /// Hints group `g`'s managers to reserve capacity for `n` entities.
    ///
    /// # Panics
    ///
    /// Panics if `g` is not valid.
    pub fn reserve_entities(&mut self, g: GroupID, n: u16) {
        self.group_mut(g).reserve_entities(n);
    }

    /// Hints `T`'s manager in group `g` to reserve capacity for `n`
    /// components.
    ///
    /// # Panics
    ///
    /// Panics if `g` is not valid or `T` was never registered by the schema.
    pub fn reserve<T: 'static>(&mut self, g: GroupID, n: u16) {
        self.group_mut(g).manager_mut::<TypedManager<T>>().reserve(n);
    }

    /// Adds `value` as `e`'s `T` component, or reports why it could not be
    /// added, rather than asserting.
    ///
    /// # Errors
    ///
    /// Returns [`TryAddError::InvalidEntity`] if `e` is not valid, or
    /// [`TryAddError::AlreadyPresent`] if `e` already has a `T` component.
    pub fn try_add<T: 'static>(
        &mut self,
        e: EntityID,
        value: T,
    ) -> Result<ComponentRefMut<'_, T>, TryAddError> {
        if !self.is_valid(e) {
            return Err(TryAddError::InvalidEntity);
        }

        let manager = self.group_mut(e.group).manager_mut::<TypedManager<T>>();
        if manager.has(e.sub) {
            return Err(TryAddError::AlreadyPresent);
        }

        manager.add(e.sub, value);
        Ok(manager.get_mut(e.sub))
    }

    /// Removes `e`'s `T` component, or reports why it could not be removed,
    /// rather than asserting.
    ///
    /// # Errors
    ///
    /// Returns [`TryRemoveError::InvalidEntity`] if `e` is not valid, or
    /// [`TryRemoveError::NotPresent`] if `e` has no `T` component.
    pub fn try_remove<T: 'static>(&mut self, e: EntityID) -> Result<(), TryRemoveError> {
        if !self.is_valid(e) {
            return Err(TryRemoveError::InvalidEntity);
        }

        let manager = self.group_mut(e.group).manager_mut::<TypedManager<T>>();
        if !manager.has(e.sub) {
            return Err(TryRemoveError::NotPresent);
        }

        manager.remove(e.sub);
        Ok(())
    }

    fn group(&self, g: GroupID) -> &EntityGroup {
        self.groups
            .get(g.0 as usize)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("no such group: {g:?}"))
    }

    fn group_mut(&mut self, g: GroupID) -> &mut EntityGroup {
        self.groups
            .get_mut(g.0 as usize)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("no such group: {g:?}"))
    }
}

/// Why [`Context::try_add`] could not add a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TryAddError {
    /// The entity is not valid.
    InvalidEntity,
    /// The entity already has this component.
    AlreadyPresent,
}

impl fmt::Display for TryAddError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEntity => write!(f, "entity is not valid"),
            Self::AlreadyPresent => write!(f, "component already present"),
        }
    }
}

impl Error for TryAddError {}

/// Why [`Context::try_remove`] could not remove a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TryRemoveError {
    /// The entity is not valid.
    InvalidEntity,
    /// The entity does not have this component.
    NotPresent,
}

impl fmt::Display for TryRemoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEntity => write!(f, "entity is not valid"),
            Self::NotPresent => write!(f, "component not present"),
        }
    }
}

impl Error for TryRemoveError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    struct Position(f32, f32, f32);

    struct Dead;

    struct DemoSchema;

    impl GroupSchema for DemoSchema {
        fn build(group: &mut EntityGroup) {
            group.add_manager::<TypedManager<Position>>();
            group.add_flag::<Dead>();
        }
    }

    fn new_context() -> Context<DemoSchema> {
        Context::new()
    }

    #[test]
    fn scenario_add_remove_across_entities() {
        let mut ctx = new_context();
        let g0 = ctx.add_group();

        let e0 = ctx.add_entity(g0);
        let e1 = ctx.add_entity(g0);
        let _e2 = ctx.add_entity(g0);

        ctx.add::<Position>(e1, Position(1.0, 2.0, 3.0));
        assert_eq!(ctx.get::<Position>(e1).0, 1.0);

        ctx.add::<Position>(e0, Position(9.0, 9.0, 9.0));
        assert_eq!(*ctx.get::<Position>(e0), Position(9.0, 9.0, 9.0));
        assert_eq!(*ctx.get::<Position>(e1), Position(1.0, 2.0, 3.0));

        ctx.remove::<Position>(e0);
        assert!(!ctx.has::<Position>(e0));
        assert_eq!(*ctx.get::<Position>(e1), Position(1.0, 2.0, 3.0));

        ctx.remove_entity(e1);
        assert!(ctx.is_valid(e0));
        assert!(!ctx.has::<Position>(e1));
    }

    #[test]
    fn removed_entity_sub_id_is_reused_without_stale_components() {
        let mut ctx = new_context();
        let g0 = ctx.add_group();

        let e0 = ctx.add_entity(g0);
        ctx.add::<Position>(e0, Position(1.0, 1.0, 1.0));
        ctx.remove_entity(e0);

        let reused = ctx.add_entity(g0);
        assert_eq!(reused.sub, e0.sub);
        assert!(!ctx.has::<Position>(reused));
    }

    #[test]
    fn flags_do_not_touch_dense_storage() {
        let mut ctx = new_context();
        let g0 = ctx.add_group();
        let e0 = ctx.add_entity(g0);

        assert!(!ctx.has_flag::<Dead>(e0));
        ctx.set_flag::<Dead>(e0, true);
        assert!(ctx.has_flag::<Dead>(e0));
        ctx.set_flag::<Dead>(e0, false);
        assert!(!ctx.has_flag::<Dead>(e0));
    }

    #[test]
    fn try_add_reports_already_present_without_mutating() {
        let mut ctx = new_context();
        let g0 = ctx.add_group();
        let e0 = ctx.add_entity(g0);

        ctx.add::<Position>(e0, Position(1.0, 2.0, 3.0));
        let err = ctx.try_add::<Position>(e0, Position(9.0, 9.0, 9.0)).unwrap_err();
        assert_eq!(err, TryAddError::AlreadyPresent);
        assert_eq!(*ctx.get::<Position>(e0), Position(1.0, 2.0, 3.0));
    }

    #[test]
    fn try_remove_reports_invalid_entity() {
        let mut ctx = new_context();
        let g0 = ctx.add_group();
        let e0 = ctx.add_entity(g0);
        ctx.remove_entity(e0);

        let stale = EntityID::new(g0, EntitySubID(999));
        let err = ctx.try_remove::<Position>(stale).unwrap_err();
        assert_eq!(err, TryRemoveError::InvalidEntity);
    }

    #[test]
    fn remove_group_frees_slot_for_reuse() {
        let mut ctx = new_context();
        let g0 = ctx.add_group();
        ctx.remove_group(g0);
        assert!(!ctx.is_valid_group(g0));

        let g1 = ctx.add_group();
        assert_eq!(g1, g0);
    }
}
