//! Character attribute allocation during character creation.

use serde::Serialize;

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};

/// Points distributed across the configured attributes.
///
/// Values stay within `0..=max`. Increments stop once the pool is spent,
/// so confirmation is only reachable with an exact distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CharacterAllocation {
    stats: Vec<(String, u32)>,
    pool: u32,
    max: u32,
}

impl CharacterAllocation {
    /// A fresh allocation with every attribute at its default.
    pub fn new(config: &SessionConfig) -> Self {
        let start = config.stat_default.min(config.stat_max);
        Self {
            stats: config
                .attributes
                .iter()
                .map(|name| (name.clone(), start))
                .collect(),
            pool: config.stat_pool,
            max: config.stat_max,
        }
    }

    /// The value of an attribute (case-insensitive name).
    pub fn get(&self, name: &str) -> Option<u32> {
        self.position(name).map(|i| self.stats[i].1)
    }

    /// Set an attribute, clamped to `0..=max`. Returns the stored value.
    pub fn set(&mut self, name: &str, value: u32) -> SessionResult<u32> {
        let i = self
            .position(name)
            .ok_or_else(|| SessionError::UnknownAttribute(name.to_string()))?;
        self.stats[i].1 = value.min(self.max);
        Ok(self.stats[i].1)
    }

    /// Move an attribute by `delta`. Increases are limited by the points
    /// remaining; decreases stop at zero. Returns the new value.
    pub fn adjust(&mut self, name: &str, delta: i32) -> SessionResult<u32> {
        let i = self
            .position(name)
            .ok_or_else(|| SessionError::UnknownAttribute(name.to_string()))?;
        let current = self.stats[i].1;
        let next = if delta >= 0 {
            let room = u32::try_from(self.remaining().max(0)).unwrap_or(0);
            current
                .saturating_add(delta.unsigned_abs().min(room))
                .min(self.max)
        } else {
            current.saturating_sub(delta.unsigned_abs())
        };
        self.stats[i].1 = next;
        Ok(next)
    }

    /// Sum of all attributes.
    pub fn total(&self) -> u32 {
        self.stats.iter().map(|(_, v)| v).sum()
    }

    /// Points left to distribute; negative when over-allocated.
    pub fn remaining(&self) -> i64 {
        i64::from(self.pool) - i64::from(self.total())
    }

    /// Whether the allocation spends the pool exactly.
    pub fn is_complete(&self) -> bool {
        self.total() == self.pool
    }

    /// The required total.
    pub fn pool(&self) -> u32 {
        self.pool
    }

    /// Attributes and values, in configured order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.stats.iter().map(|(name, v)| (name.as_str(), *v))
    }

    /// Fail unless the allocation spends the pool exactly.
    pub fn validate(&self) -> SessionResult<()> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(SessionError::InvalidAllocation {
                total: self.total(),
                pool: self.pool,
            })
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.stats
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
    }
}
