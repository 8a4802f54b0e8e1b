//! Selection policy: pick one action from the executable candidates
//!
//! Selection reads history but never writes it. When sequential mode
//! saturates a bucket it signals the reset through [`Selection`] and the
//! walk controller performs the clear; keeping the policy side-effect
//! free makes every branch a pure function of its inputs.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use webwalk_core::Action;

/// How the policy picks among equally eligible candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Uniform random choice
    Random,
    /// First candidate not yet attempted at this base key; when all have
    /// been attempted, signal a bucket reset and start over
    Sequential,
}

/// Per-base-key record of attempted action names.
///
/// Attempts are recorded regardless of execution outcome; a failed
/// action still counts as tried at that location.
#[derive(Debug, Default)]
pub struct ExecutionHistory {
    attempted: HashMap<String, HashSet<String>>,
}

impl ExecutionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `action_name` was attempted at `base`
    pub fn record(&mut self, base: &str, action_name: &str) {
        self.attempted
            .entry(base.to_string())
            .or_default()
            .insert(action_name.to_string());
    }

    pub fn is_attempted(&self, base: &str, action_name: &str) -> bool {
        self.attempted
            .get(base)
            .is_some_and(|names| names.contains(action_name))
    }

    /// Drop the bucket for `base` (sequential-mode reset)
    pub fn clear_base(&mut self, base: &str) {
        self.attempted.remove(base);
    }

    /// Number of distinct actions attempted at `base`
    pub fn attempted_count(&self, base: &str) -> usize {
        self.attempted.get(base).map_or(0, |names| names.len())
    }
}

/// The policy's verdict: which action to run, and whether the controller
/// should clear this base's history bucket first
#[derive(Debug)]
pub struct Selection<'a> {
    pub action: &'a Action,
    pub reset_history: bool,
}

/// Select one action from `candidates` for the page keyed by `base`.
///
/// Required actions restrict the pool: if any candidate is required,
/// only required candidates are eligible, in both modes. Returns `None`
/// only when `candidates` is empty.
pub fn select<'a, R: Rng>(
    candidates: &'a [Action],
    base: &str,
    mode: SelectionMode,
    history: &ExecutionHistory,
    rng: &mut R,
) -> Option<Selection<'a>> {
    if candidates.is_empty() {
        return None;
    }

    let required: Vec<&Action> = candidates.iter().filter(|a| a.required).collect();
    let pool: Vec<&Action> = if required.is_empty() {
        candidates.iter().collect()
    } else {
        required
    };

    match mode {
        SelectionMode::Random => {
            let action = *pool.choose(rng)?;
            debug!(action = %action.name, "Selected (random)");
            Some(Selection {
                action,
                reset_history: false,
            })
        }
        SelectionMode::Sequential => {
            if let Some(action) = pool
                .iter()
                .find(|a| !history.is_attempted(base, &a.name))
                .copied()
            {
                debug!(action = %action.name, "Selected (sequential)");
                return Some(Selection {
                    action,
                    reset_history: false,
                });
            }
            // Every eligible action has been tried here; cycle the bucket
            let action = pool[0];
            debug!(action = %action.name, base, "Bucket saturated, signalling reset");
            Some(Selection {
                action,
                reset_history: true,
            })
        }
    }
}
