//! Conversation state and the transitions that update it.
//!
//! Everything the screen shows lives in [`ChatState`]: the append-only
//! [`Conversation`], the pending flag, the selected [`Mode`], the input buffer and the
//! health status line. The state is only changed through the transition methods here,
//! so the append/clear/pending rules can be exercised without a terminal or a network.

use crate::api::{self, ChatResponse, HealthInfo, STATUS_LOADING};
use crate::error::{ApiError, error_display_text};
use crate::events::{ConversationEntry, Mode};

/// Ordered, append-only list of entries
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    entries: Vec<ConversationEntry>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }
}

/// Text being composed, with a cursor counted in characters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    content: String,
    cursor: usize,
}

impl InputBuffer {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn set(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.char_len();
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Take the content out, leaving the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.content)
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
        true
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let at = self.byte_index(self.cursor);
        self.content.remove(at);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }
}

/// A chat request that has been recorded in the state and must now be issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub seq: u64,
    pub message: String,
    pub mode: Mode,
}

/// Why a send did not go out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejected {
    /// Input was empty or whitespace only
    Empty,
    /// A request is already outstanding
    Pending,
}

/// Result of applying a chat or health resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The resolution did not belong to the latest request and was dropped
    Stale,
}

/// Centralized client state owned by a single controller
#[derive(Debug, Clone)]
pub struct ChatState {
    conversation: Conversation,
    input: InputBuffer,
    mode: Mode,
    status: String,
    in_flight: Option<u64>,
    next_seq: u64,
    health_seq: u64,
}

impl ChatState {
    pub fn new(mode: Mode) -> Self {
        Self {
            conversation: Conversation::new(),
            input: InputBuffer::default(),
            mode,
            status: STATUS_LOADING.to_string(),
            in_flight: None,
            next_seq: 1,
            health_seq: 0,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn input(&self) -> &InputBuffer {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputBuffer {
        &mut self.input
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<u64> {
        self.in_flight
    }

    pub fn select_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    /// Start sending the current input buffer.
    ///
    /// On success the raw input has been appended as a user entry, the buffer is empty and
    /// the state is pending; the caller must issue the returned request and later hand
    /// its outcome to [`ChatState::resolve_chat`]. Nothing changes when rejected.
    pub fn begin_send(&mut self) -> Result<PendingRequest, SendRejected> {
        if self.input.content().trim().is_empty() {
            return Err(SendRejected::Empty);
        }
        if self.is_pending() {
            return Err(SendRejected::Pending);
        }

        let message = self.input.take();
        self.conversation.push(ConversationEntry::user(message.clone()));

        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);

        Ok(PendingRequest {
            seq,
            message,
            mode: self.mode,
        })
    }

    /// Replace the input buffer with `text` and start sending it.
    pub fn send_text(&mut self, text: &str) -> Result<PendingRequest, SendRejected> {
        if text.trim().is_empty() {
            return Err(SendRejected::Empty);
        }
        if self.is_pending() {
            return Err(SendRejected::Pending);
        }
        self.input.set(text);
        self.begin_send()
    }

    /// Apply the outcome of request `seq`: exactly one assistant entry for the in-flight
    /// request, nothing for anything else.
    pub fn resolve_chat(
        &mut self,
        seq: u64,
        outcome: Result<ChatResponse, ApiError>,
    ) -> Resolution {
        if self.in_flight != Some(seq) {
            return Resolution::Stale;
        }

        let entry = match outcome {
            Ok(response) => ConversationEntry::assistant(response.reply, response.sources),
            Err(err) => ConversationEntry::assistant_error(error_display_text(&err)),
        };
        self.conversation.push(entry);
        self.in_flight = None;
        Resolution::Applied
    }

    /// Start a health check. The status line reads loading until the check tagged with
    /// the returned number resolves; any earlier check still outstanding is superseded.
    pub fn begin_health(&mut self) -> u64 {
        self.health_seq += 1;
        self.status = STATUS_LOADING.to_string();
        self.health_seq
    }

    /// Apply the outcome of health check `seq`. Only the latest check may set the line.
    pub fn apply_health(&mut self, seq: u64, result: &Result<HealthInfo, ApiError>) -> Resolution {
        if seq != self.health_seq {
            return Resolution::Stale;
        }
        self.status = api::status_from_health(result);
        Resolution::Applied
    }
}
