#![forbid(unsafe_code)]

//! Rebuild scheduling.
//!
//! Two timers drive rebuilds:
//! - a one-shot **settle** timer armed at startup, giving the host page time
//!   to load its own content, and
//! - a **debounce** timer armed by the first mutation batch with added nodes.
//!   Later batches are coalesced into it until it fires, so a streaming reply
//!   produces one rebuild per window instead of one per mutation.
//!
//! The scheduler owns no real timers. Hosts arm one for the delay reported by
//! [`SchedulerSignal::Scheduled`] and call [`RebuildScheduler::poll`] when it
//! fires; [`RebuildScheduler::next_deadline`] tells them what is outstanding.

use core::time::Duration;

use tracing::trace;

/// Result of [`Debouncer::signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceSignal {
    /// Nothing was pending; the action is now due at `due`.
    Scheduled { due: Duration },
    /// Already pending; the signal was absorbed.
    Coalesced { due: Duration },
}

/// Schedule-if-not-already-pending.
///
/// The deadline is fixed by the first signal of a burst and is not pushed back
/// by later ones, so a continuous stream of signals still fires once per
/// window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    due: Option<Duration>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window, due: None }
    }

    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }

    pub fn signal(&mut self, now: Duration) -> DebounceSignal {
        match self.due {
            Some(due) => DebounceSignal::Coalesced { due },
            None => {
                let due = now.saturating_add(self.window);
                self.due = Some(due);
                DebounceSignal::Scheduled { due }
            }
        }
    }

    /// Fire if due. Returns `true` exactly once per scheduled action.
    pub fn poll(&mut self, now: Duration) -> bool {
        match self.due {
            Some(due) if due <= now => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub const fn pending(&self) -> Option<Duration> {
        self.due
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }
}

/// Kind of a host mutation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
    CharacterData,
}

/// Summary of one host mutation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub added_nodes: u32,
}

impl MutationRecord {
    #[must_use]
    pub const fn child_list(added_nodes: u32) -> Self {
        Self {
            kind: MutationKind::ChildList,
            added_nodes,
        }
    }

    /// Whether this record can mean a new message appeared.
    #[must_use]
    pub const fn adds_nodes(&self) -> bool {
        matches!(self.kind, MutationKind::ChildList) && self.added_nodes > 0
    }
}

/// Why a rebuild fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildTrigger {
    /// The startup settle delay elapsed.
    Initial,
    /// A debounced mutation burst.
    Mutation,
}

/// Result of [`RebuildScheduler::on_mutations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerSignal {
    /// No record in the batch added nodes.
    Ignored,
    /// A new rebuild is pending; the host should arm a timer for `delay`.
    Scheduled { due: Duration, delay: Duration },
    /// A rebuild was already pending.
    Coalesced { due: Duration },
}

/// Observable scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    PendingRebuild { due: Duration },
}

/// Settle timer plus mutation debouncer.
#[derive(Debug, Clone)]
pub struct RebuildScheduler {
    settle_delay: Duration,
    initial_due: Option<Duration>,
    debounce: Debouncer,
    fired: u64,
    coalesced: u64,
}

impl RebuildScheduler {
    #[must_use]
    pub const fn new(settle_delay: Duration, debounce_window: Duration) -> Self {
        Self {
            settle_delay,
            initial_due: None,
            debounce: Debouncer::new(debounce_window),
            fired: 0,
            coalesced: 0,
        }
    }

    /// Arm the one-shot settle rebuild; returns its deadline.
    pub fn arm_initial(&mut self, now: Duration) -> Duration {
        let due = now.saturating_add(self.settle_delay);
        self.initial_due = Some(due);
        due
    }

    /// Feed one observer batch.
    pub fn on_mutations(&mut self, records: &[MutationRecord], now: Duration) -> SchedulerSignal {
        if !records.iter().any(MutationRecord::adds_nodes) {
            return SchedulerSignal::Ignored;
        }
        match self.debounce.signal(now) {
            DebounceSignal::Scheduled { due } => SchedulerSignal::Scheduled {
                due,
                delay: self.debounce.window(),
            },
            DebounceSignal::Coalesced { due } => {
                self.coalesced = self.coalesced.saturating_add(1);
                trace!(due = ?due, "mutation batch coalesced");
                SchedulerSignal::Coalesced { due }
            }
        }
    }

    /// Fire whatever is due. Both timers being due yields a single rebuild.
    pub fn poll(&mut self, now: Duration) -> Option<RebuildTrigger> {
        let initial = matches!(self.initial_due, Some(due) if due <= now);
        if initial {
            self.initial_due = None;
        }
        let mutation = self.debounce.poll(now);
        let trigger = if initial {
            Some(RebuildTrigger::Initial)
        } else if mutation {
            Some(RebuildTrigger::Mutation)
        } else {
            None
        };
        if trigger.is_some() {
            self.fired = self.fired.saturating_add(1);
        }
        trigger
    }

    /// Earliest outstanding deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.initial_due, self.debounce.pending()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        match self.next_deadline() {
            Some(due) => SchedulerState::PendingRebuild { due },
            None => SchedulerState::Idle,
        }
    }

    pub fn cancel_all(&mut self) {
        self.initial_due = None;
        self.debounce.cancel();
    }

    /// Rebuilds fired so far.
    #[must_use]
    pub const fn fired(&self) -> u64 {
        self.fired
    }

    /// Mutation batches absorbed into an already-pending rebuild.
    #[must_use]
    pub const fn coalesced(&self) -> u64 {
        self.coalesced
    }
}
