#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed stat overrides with guaranteed restoration.
//!
//! Each active effect remembers the value it replaced and owns a one-shot
//! expiry callback. The callback receives the caller's context together with
//! the remembered original and runs exactly once, whether the effect times
//! out, is ended early, or is cleared at teardown.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

/// Callback restoring the overridden value; receives the stored original.
pub type OnExpire<C> = Box<dyn FnOnce(&mut C, f32)>;

/// Reasons an effect could not be started.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EffectError {
    /// An effect with the same key is still running.
    #[error("effect {key} is already active")]
    AlreadyActive {
        /// Debug rendering of the rejected key.
        key: String,
    },
}

struct ActiveEffect<C> {
    original: f32,
    current: f32,
    remaining: f32,
    on_expire: OnExpire<C>,
}

/// Registry of active effects keyed by `K`, restoring values in a context `C`.
pub struct TemporaryEffects<K, C> {
    active: BTreeMap<K, ActiveEffect<C>>,
}

impl<K, C> Default for TemporaryEffects<K, C> {
    fn default() -> Self {
        Self {
            active: BTreeMap::new(),
        }
    }
}

impl<K, C> TemporaryEffects<K, C>
where
    K: Ord + Copy + fmt::Debug,
{
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an override of `original` by `value` lasting `duration` seconds.
    ///
    /// The caller applies `value` itself; the registry only tracks the
    /// override and invokes `on_expire` with `original` when it ends.
    ///
    /// # Errors
    ///
    /// Returns [`EffectError::AlreadyActive`] when `key` is still running;
    /// the running effect is left untouched and `on_expire` is dropped
    /// without being called.
    pub fn start_effect(
        &mut self,
        key: K,
        original: f32,
        value: f32,
        duration: f32,
        on_expire: OnExpire<C>,
    ) -> Result<(), EffectError> {
        if self.active.contains_key(&key) {
            return Err(EffectError::AlreadyActive {
                key: format!("{key:?}"),
            });
        }
        let _ = self.active.insert(
            key,
            ActiveEffect {
                original,
                current: value,
                remaining: duration,
                on_expire,
            },
        );
        Ok(())
    }

    /// Counts down every effect and expires those that ran out, in key order.
    pub fn update(&mut self, dt: f32, ctx: &mut C) {
        let mut expired = Vec::new();
        for (key, effect) in &mut self.active {
            effect.remaining -= dt;
            if effect.remaining <= 0.0 {
                expired.push(*key);
            }
        }
        for key in expired {
            let _ = self.expire(key, ctx);
        }
    }

    /// Expires `key` immediately, reporting whether it was active.
    pub fn end_effect(&mut self, key: K, ctx: &mut C) -> bool {
        self.expire(key, ctx)
    }

    /// Expires every active effect.
    pub fn clear(&mut self, ctx: &mut C) {
        let keys: Vec<K> = self.active.keys().copied().collect();
        for key in keys {
            let _ = self.expire(key, ctx);
        }
    }

    /// Replaces the stored original and current value of a running effect.
    ///
    /// Used when the underlying stat changes while overridden, so that expiry
    /// restores the new baseline rather than a stale one.
    pub fn rebase(&mut self, key: K, original: f32, value: f32) -> bool {
        match self.active.get_mut(&key) {
            Some(effect) => {
                effect.original = original;
                effect.current = value;
                true
            }
            None => false,
        }
    }

    /// Reports whether `key` is running.
    #[must_use]
    pub fn has_effect(&self, key: K) -> bool {
        self.active.contains_key(&key)
    }

    /// Seconds left on `key`.
    #[must_use]
    pub fn remaining(&self, key: K) -> Option<f32> {
        self.active.get(&key).map(|effect| effect.remaining)
    }

    /// Value `key` replaced.
    #[must_use]
    pub fn original_value(&self, key: K) -> Option<f32> {
        self.active.get(&key).map(|effect| effect.original)
    }

    /// Value `key` currently imposes.
    #[must_use]
    pub fn current_value(&self, key: K) -> Option<f32> {
        self.active.get(&key).map(|effect| effect.current)
    }

    /// Number of running effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Reports whether no effect is running.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    fn expire(&mut self, key: K, ctx: &mut C) -> bool {
        let Some(effect) = self.active.remove(&key) else {
            return false;
        };
        debug!(effect = ?key, restored = effect.original, "temporary effect expired");
        (effect.on_expire)(ctx, effect.original);
        true
    }
}

impl<K: fmt::Debug, C> fmt::Debug for TemporaryEffects<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryEffects")
            .field("active", &self.active.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
    enum Key {
        Boost,
        Frenzy,
    }

    #[derive(Default)]
    struct Stat {
        value: f32,
        restored: u32,
    }

    fn restore() -> OnExpire<Stat> {
        Box::new(|stat: &mut Stat, original| {
            stat.value = original;
            stat.restored += 1;
        })
    }

    fn boosted(effects: &mut TemporaryEffects<Key, Stat>, stat: &mut Stat, duration: f32) {
        effects
            .start_effect(Key::Boost, stat.value, stat.value * 2.0, duration, restore())
            .expect("fresh key");
        stat.value *= 2.0;
    }

    #[test]
    fn expiry_restores_the_original_exactly_once() {
        let mut effects = TemporaryEffects::new();
        let mut stat = Stat {
            value: 2.0,
            restored: 0,
        };
        boosted(&mut effects, &mut stat, 3.0);

        effects.update(2.0, &mut stat);
        assert_eq!(stat.value, 4.0);

        effects.update(1.0, &mut stat);
        effects.update(1.0, &mut stat);

        assert_eq!(stat.value, 2.0);
        assert_eq!(stat.restored, 1);
        assert!(effects.is_empty());
    }

    #[test]
    fn duplicate_key_is_rejected_without_touching_the_running_effect() {
        let mut effects = TemporaryEffects::new();
        let mut stat = Stat {
            value: 1.0,
            restored: 0,
        };
        boosted(&mut effects, &mut stat, 3.0);

        let error = effects
            .start_effect(Key::Boost, 9.0, 9.0, 10.0, restore())
            .expect_err("duplicate");

        assert_eq!(
            error,
            EffectError::AlreadyActive {
                key: "Boost".to_owned()
            }
        );
        assert_eq!(effects.remaining(Key::Boost), Some(3.0));
        assert_eq!(effects.original_value(Key::Boost), Some(1.0));
    }

    #[test]
    fn ending_early_restores_once() {
        let mut effects = TemporaryEffects::new();
        let mut stat = Stat {
            value: 5.0,
            restored: 0,
        };
        boosted(&mut effects, &mut stat, 3.0);

        assert!(effects.end_effect(Key::Boost, &mut stat));
        assert!(!effects.end_effect(Key::Boost, &mut stat));
        effects.update(5.0, &mut stat);

        assert_eq!(stat.value, 5.0);
        assert_eq!(stat.restored, 1);
    }

    #[test]
    fn clear_expires_everything() {
        let mut effects = TemporaryEffects::new();
        let mut stat = Stat::default();
        effects
            .start_effect(Key::Boost, 0.0, 1.0, 3.0, restore())
            .expect("fresh key");
        effects
            .start_effect(Key::Frenzy, 0.0, 1.0, 5.0, restore())
            .expect("fresh key");

        effects.clear(&mut stat);

        assert_eq!(stat.restored, 2);
        assert_eq!(effects.len(), 0);
    }

    #[test]
    fn rebase_changes_the_restored_value() {
        let mut effects = TemporaryEffects::new();
        let mut stat = Stat {
            value: 2.0,
            restored: 0,
        };
        boosted(&mut effects, &mut stat, 3.0);

        assert!(effects.rebase(Key::Boost, 2.5, 5.0));
        assert!(!effects.rebase(Key::Frenzy, 1.0, 1.0));
        assert_eq!(effects.current_value(Key::Boost), Some(5.0));
        effects.update(3.0, &mut stat);

        assert_eq!(stat.value, 2.5);
    }
}
