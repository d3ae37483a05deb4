//! In-memory history of legacy chat conversations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use mindforge_core::{defaults, ChatTurn};

#[derive(Debug)]
struct Conversation {
    turns: Vec<ChatTurn>,
    last_active: Instant,
}

/// Conversation turns keyed by client-chosen conversation id.
///
/// Each conversation keeps at most `max_messages` turns; the oldest
/// user/assistant pair is dropped first.
#[derive(Debug)]
pub struct ConversationStore {
    inner: Mutex<HashMap<String, Conversation>>,
    max_messages: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(defaults::CONVERSATION_MAX_MESSAGES)
    }
}

impl ConversationStore {
    pub fn new(max_messages: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            max_messages,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Conversation>> {
        // A poisoned map only means a panic mid-insert; the data is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record one exchange. Returns the number of turns kept.
    pub fn append_exchange(&self, conversation_id: &str, user: &str, assistant: &str) -> usize {
        let mut map = self.lock();
        let conversation = map
            .entry(conversation_id.to_string())
            .or_insert_with(|| Conversation {
                turns: Vec::new(),
                last_active: Instant::now(),
            });

        conversation.turns.push(ChatTurn::user(user));
        conversation.turns.push(ChatTurn::assistant(assistant));
        while conversation.turns.len() > self.max_messages {
            let excess = conversation.turns.len().min(2);
            conversation.turns.drain(..excess);
        }
        conversation.last_active = Instant::now();
        conversation.turns.len()
    }

    pub fn history(&self, conversation_id: &str) -> Vec<ChatTurn> {
        self.lock()
            .get(conversation_id)
            .map(|c| c.turns.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove conversations idle for longer than `max_idle`. Returns how many
    /// were removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let mut map = self.lock();
        let before = map.len();
        map.retain(|_, c| now.duration_since(c.last_active) <= max_idle);
        before - map.len()
    }

    /// Run `evict_idle(max_idle)` every `every` until the task is aborted.
    pub fn spawn_eviction(self: Arc<Self>, every: Duration, max_idle: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = self.evict_idle(max_idle);
                if evicted > 0 {
                    info!(
                        subsystem = "inference",
                        component = "conversation_store",
                        evicted,
                        remaining = self.len(),
                        "Evicted idle conversations"
                    );
                } else {
                    debug!(component = "conversation_store", "No idle conversations");
                }
            }
        })
    }
}
