use dashmap::DashMap;
use parking_lot::RwLock;

use checkin_model::UserId;

/// The broadcast currently awaiting answers.
///
/// `seq` is a monotonic counter rather than the rotation position: the
/// position wraps modulo the catalog length, so after a full cycle it
/// would collide with a user's earlier answer.
#[derive(Debug, Clone)]
struct OpenCheckin {
    seq: u64,
    question: String,
}

/// A successful claim: the question this user's reply answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuestion {
    pub seq: u64,
    pub question: String,
}

/// Per-user conversation state.
///
/// There is no subscriber roster, so a broadcast does not pre-populate
/// per-user entries. Instead the table holds the single current open
/// check-in and, per user, the sequence number of the last check-in that
/// user answered; a user is awaiting exactly when the two differ. A new
/// broadcast supersedes the previous one: late replies to the old
/// question are no longer matched.
#[derive(Debug, Default)]
pub struct ConversationTable {
    current: RwLock<Option<OpenCheckin>>,
    answered: DashMap<UserId, u64>,
}

impl ConversationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new check-in after a successful broadcast. Broadcaster only.
    pub fn open_checkin(&self, question: &str) -> u64 {
        let mut current = self.current.write();
        let seq = current.as_ref().map(|open| open.seq + 1).unwrap_or(1);
        *current = Some(OpenCheckin {
            seq,
            question: question.to_string(),
        });
        seq
    }

    /// Atomically claims the current check-in for `user`.
    ///
    /// Returns `None` when nothing has been broadcast yet or the user
    /// already answered the current one. The check-and-set runs under the
    /// map's per-shard lock, so of two racing replies from the same user
    /// exactly one receives `Some`. Unrelated users only ever contend on
    /// their own shard.
    pub fn claim(&self, user: UserId) -> Option<PendingQuestion> {
        let open = self.current.read().clone()?;
        let mut answered_seq = self.answered.entry(user).or_insert(0);
        if *answered_seq == open.seq {
            return None;
        }
        *answered_seq = open.seq;
        drop(answered_seq);
        Some(PendingQuestion {
            seq: open.seq,
            question: open.question,
        })
    }

    /// Rolls a claim back after a failed insert so the user may resend.
    ///
    /// Only undoes the claim if the user's marker still carries `seq`; a
    /// newer broadcast in between leaves the newer state untouched.
    pub fn reopen(&self, user: UserId, seq: u64) {
        self.answered.remove_if(&user, |_, answered| *answered == seq);
    }

    /// Whether a reply from `user` would currently be matched.
    pub fn is_awaiting(&self, user: UserId) -> bool {
        let Some(open) = self.current.read().clone() else {
            return false;
        };
        self.answered
            .get(&user)
            .map(|answered| *answered != open.seq)
            .unwrap_or(true)
    }
}
