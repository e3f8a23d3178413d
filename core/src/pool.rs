//! Generic reusable-object pool with generation-checked handles.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Capability implemented by every pooled entity.
pub trait Poolable {
    /// Restores the object to its pristine, inactive state.
    fn reset(&mut self);

    /// Reports whether the object is currently live.
    fn is_active(&self) -> bool;

    /// Marks the object live or idle. Called by the pool only.
    fn set_active(&mut self, active: bool);
}

/// Stable handle to a pooled object.
///
/// The generation advances every time the slot is released, so a handle kept
/// past its object's lifetime never aliases the slot's next occupant.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Creates a handle from a slot index and generation.
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index of the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the handle.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Failure raised by an external reset hook.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The hook could not restore the object.
    #[error("reset hook rejected pooled object: {0}")]
    ResetRejected(String),
}

/// Optional hook applied after an object's own reset.
pub type ResetHook<T> = Box<dyn FnMut(&mut T) -> Result<(), PoolError>>;

struct Slot<T> {
    value: T,
    generation: u32,
    active: bool,
}

/// Reusable pool partitioning objects into active and free sets.
pub struct Pool<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    active_count: usize,
    factory: Box<dyn Fn() -> T>,
    reset_hook: Option<ResetHook<T>>,
}

impl<T: Poolable> Pool<T> {
    /// Creates a pool pre-filled with `prefill` idle objects built by `factory`.
    #[must_use]
    pub fn new<F>(factory: F, prefill: usize) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let mut pool = Self {
            slots: Vec::with_capacity(prefill),
            free: Vec::with_capacity(prefill),
            active_count: 0,
            factory: Box::new(factory),
            reset_hook: None,
        };
        for _ in 0..prefill {
            let index = pool.push_slot();
            pool.free.push(index);
        }
        // Hand out low indices first.
        pool.free.reverse();
        pool
    }

    /// Installs a hook applied to every object after its own reset.
    #[must_use]
    pub fn with_reset_hook(mut self, hook: ResetHook<T>) -> Self {
        self.reset_hook = Some(hook);
        self
    }

    /// Takes an idle object, creating one when none is free, and marks it active.
    pub fn acquire(&mut self) -> EntityId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => self.push_slot(),
        };
        let slot = &mut self.slots[index as usize];
        slot.active = true;
        slot.value.set_active(true);
        self.active_count += 1;
        EntityId::new(index, slot.generation)
    }

    /// Acquires an object and initialises it in place.
    pub fn acquire_with<F>(&mut self, init: F) -> EntityId
    where
        F: FnOnce(EntityId, &mut T),
    {
        let id = self.acquire();
        if let Some(value) = self.get_mut(id) {
            init(id, value);
        }
        id
    }

    /// Returns an object to the free list.
    ///
    /// Releasing a stale handle or an object that is not active is ignored and
    /// reported as `false`.
    pub fn release(&mut self, id: EntityId) -> bool {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            warn!(?id, "release of unknown pool slot ignored");
            return false;
        };
        if !slot.active || slot.generation != id.generation {
            warn!(?id, "release of inactive pooled object ignored");
            return false;
        }

        Self::retire(slot, &mut self.reset_hook, id);
        self.free.push(id.index);
        self.active_count -= 1;
        true
    }

    /// Releases every active object, returning how many were drained.
    ///
    /// Hook failures are logged and never stop the drain.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !slot.active {
                continue;
            }
            let id = EntityId::new(index as u32, slot.generation);
            Self::retire(slot, &mut self.reset_hook, id);
            self.free.push(id.index);
            released += 1;
        }
        self.active_count = 0;
        released
    }

    /// Shared access to an active object.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.active && slot.generation == id.generation)
            .map(|slot| &slot.value)
    }

    /// Exclusive access to an active object.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.active && slot.generation == id.generation)
            .map(|slot| &mut slot.value)
    }

    /// Reports whether the handle refers to a live object.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Iterates over every active object with its handle, in slot order.
    pub fn iter_active(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .map(|(index, slot)| (EntityId::new(index as u32, slot.generation), &slot.value))
    }

    /// Number of objects currently handed out.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Number of idle objects ready for reuse.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of objects ever created by the pool.
    #[must_use]
    pub fn total_created(&self) -> usize {
        self.slots.len()
    }

    fn push_slot(&mut self) -> u32 {
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            value: (self.factory)(),
            generation: 0,
            active: false,
        });
        index
    }

    fn retire(slot: &mut Slot<T>, hook: &mut Option<ResetHook<T>>, id: EntityId) {
        slot.value.reset();
        if let Some(hook) = hook.as_mut() {
            if let Err(error) = hook(&mut slot.value) {
                warn!(?id, %error, "pool reset hook failed");
            }
        }
        slot.value.set_active(false);
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
    }
}

impl<T> std::fmt::Debug for Pool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pool")
            .field("total", &self.slots.len())
            .field("active", &self.active_count)
            .field("free", &self.free.len())
            .finish()
    }
}
