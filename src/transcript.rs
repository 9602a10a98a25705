use std::time::SystemTime;

/// Who a turn is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One contiguous utterance attributed to a single role.
#[derive(Debug, Clone)]
pub struct Turn {
    role: Role,
    text: String,
    created_at: SystemTime,
}

impl Turn {
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }
}

/// Accumulates streamed transcript fragments into complete turns.
///
/// The protocol can report the same completed turn more than once (an
/// incremental done event followed by a whole-response done event), so
/// finalization is idempotent: a finalize only records a turn when the history
/// is empty, the last turn has a different role, or its text differs.
#[derive(Default)]
pub struct TranscriptAssembler {
    turns: Vec<Turn>,
    user_buffer: String,
    assistant_buffer: String,
}

impl TranscriptAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_delta(&mut self, role: Role, fragment: &str) {
        self.buffer_mut(role).push_str(fragment);
    }

    /// True when no fragments are buffered for `role`.
    pub fn buffer_is_empty(&self, role: Role) -> bool {
        match role {
            Role::User => self.user_buffer.is_empty(),
            Role::Assistant => self.assistant_buffer.is_empty(),
        }
    }

    /// Close out the in-progress buffer for `role`. Returns the recorded turn,
    /// or `None` when the buffer was blank or the turn was already recorded.
    pub fn finalize(&mut self, role: Role) -> Option<Turn> {
        let text = std::mem::take(self.buffer_mut(role));
        let text = text.trim().to_string();
        if text.is_empty() {
            return None;
        }
        if let Some(last) = self.turns.last() {
            if last.role == role && last.text == text {
                tracing::debug!("skipping duplicate finalize for {:?} turn", role);
                return None;
            }
        }
        let turn = Turn {
            role,
            text,
            created_at: SystemTime::now(),
        };
        self.turns.push(turn.clone());
        Some(turn)
    }

    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    fn buffer_mut(&mut self, role: Role) -> &mut String {
        match role {
            Role::User => &mut self.user_buffer,
            Role::Assistant => &mut self.assistant_buffer,
        }
    }
}
