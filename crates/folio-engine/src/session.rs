//! Conversation sessions
//!
//! A session holds the turn history for one chat. Turns are append-only and
//! kept in chronological order; once the stored history exceeds its turn or
//! character bound the oldest turns are evicted first.

use folio_domain::{SessionId, Turn};
use std::collections::VecDeque;
use std::time::Duration;

/// Bounds on stored history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    /// Maximum stored turns
    pub max_turns: usize,
    /// Maximum stored characters across all turns
    pub max_chars: usize,
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created, no exchange yet
    New,
    /// At least one exchange recorded
    Active,
    /// Idle past the timeout; terminal
    Expired,
}

/// Turn history for one chat
#[derive(Debug, Clone)]
pub struct ConversationSession {
    id: SessionId,
    turns: VecDeque<Turn>,
    created_at_ms: u64,
    last_active_ms: u64,
    total_chars: usize,
    appended_total: usize,
    limits: SessionLimits,
}

impl ConversationSession {
    /// Create an empty session
    pub fn new(id: SessionId, now_ms: u64, limits: SessionLimits) -> Self {
        Self {
            id,
            turns: VecDeque::new(),
            created_at_ms: now_ms,
            last_active_ms: now_ms,
            total_chars: 0,
            appended_total: 0,
            limits,
        }
    }

    /// Session id
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Creation time (ms since epoch)
    pub fn created_at_ms(&self) -> u64 {
        self.created_at_ms
    }

    /// Time of the last append (ms since epoch)
    pub fn last_active_ms(&self) -> u64 {
        self.last_active_ms
    }

    /// Append one turn, then evict down to the bounds
    pub fn append(&mut self, turn: Turn) {
        self.push(turn);
        self.evict();
    }

    /// Append a user turn and its reply in one step
    pub fn append_exchange(&mut self, user: Turn, assistant: Turn) {
        self.push(user);
        self.push(assistant);
        self.evict();
    }

    fn push(&mut self, mut turn: Turn) {
        // Keep timestamps strictly increasing even if the clock stalls or steps back
        if let Some(last) = self.turns.back() {
            if turn.timestamp_ms <= last.timestamp_ms {
                turn.timestamp_ms = last.timestamp_ms + 1;
            }
        }
        self.last_active_ms = self.last_active_ms.max(turn.timestamp_ms);
        self.total_chars += turn.char_len();
        self.appended_total += 1;
        self.turns.push_back(turn);
    }

    /// FIFO eviction; the newest turn always survives
    fn evict(&mut self) {
        while self.turns.len() > 1
            && (self.turns.len() > self.limits.max_turns || self.total_chars > self.limits.max_chars)
        {
            if let Some(oldest) = self.turns.pop_front() {
                self.total_chars -= oldest.char_len();
            }
        }
    }

    /// The most recent turns fitting both bounds, oldest first
    ///
    /// Always a suffix of the stored history: stops at the first turn (from
    /// the newest) that would break either bound.
    pub fn history(&self, max_turns: usize, max_chars: usize) -> Vec<Turn> {
        let mut chars = 0;
        let mut taken = 0;
        for turn in self.turns.iter().rev() {
            if taken == max_turns || chars + turn.char_len() > max_chars {
                break;
            }
            chars += turn.char_len();
            taken += 1;
        }

        self.turns
            .iter()
            .skip(self.turns.len() - taken)
            .cloned()
            .collect()
    }

    /// Stored turns, oldest first
    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Number of stored turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Characters across stored turns
    pub fn total_chars(&self) -> usize {
        self.total_chars
    }

    /// Turns ever appended, including evicted ones
    pub fn appended_total(&self) -> usize {
        self.appended_total
    }

    /// Whether the session has been idle for at least `idle_timeout`
    pub fn is_expired(&self, now_ms: u64, idle_timeout: Duration) -> bool {
        let idle_ms = u64::try_from(idle_timeout.as_millis()).unwrap_or(u64::MAX);
        now_ms.saturating_sub(self.last_active_ms) >= idle_ms
    }

    /// Lifecycle state at `now_ms`
    pub fn state(&self, now_ms: u64, idle_timeout: Duration) -> SessionState {
        if self.is_expired(now_ms, idle_timeout) {
            SessionState::Expired
        } else if self.appended_total == 0 {
            SessionState::New
        } else {
            SessionState::Active
        }
    }
}
