//! Scheduled effects owned by the session
//!
//! Timed side effects (narration auto-clear, threat flash decay) live in a
//! small queue that the frame loop drains. At most one effect of each kind is
//! pending: scheduling replaces the older one, so a stale timer can never
//! clobber newer state.

use serde::{Deserialize, Serialize};

/// Kinds of deferred effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Put the baseline narration back
    RestoreNarration,
    /// Drop the threat flash to zero
    ClearThreatFlash,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    kind: EffectKind,
    remaining: f32,
}

/// Pending deferred effects
#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    pending: Vec<Pending>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire after `delay` seconds, replacing any pending one
    pub fn schedule(&mut self, kind: EffectKind, delay: f32) {
        self.cancel(kind);
        self.pending.push(Pending {
            kind,
            remaining: delay.max(0.0),
        });
    }

    pub fn cancel(&mut self, kind: EffectKind) {
        self.pending.retain(|p| p.kind != kind);
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, kind: EffectKind) -> bool {
        self.pending.iter().any(|p| p.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance time and return the effects that came due, earliest first
    pub fn advance(&mut self, dt: f32) -> Vec<EffectKind> {
        for p in &mut self.pending {
            p.remaining -= dt;
        }
        let mut due: Vec<Pending> = self
            .pending
            .iter()
            .copied()
            .filter(|p| p.remaining <= 0.0)
            .collect();
        self.pending.retain(|p| p.remaining > 0.0);
        due.sort_by(|a, b| a.remaining.total_cmp(&b.remaining));
        due.into_iter().map(|p| p.kind).collect()
    }
}
