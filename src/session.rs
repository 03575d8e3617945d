use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Handle to an indexed document: which Qdrant collection holds it and
/// where it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentIndex {
    pub collection: String,
    pub source: String,
    pub chunks: usize,
}

/// In-memory chat state. Lives for one process run only.
#[derive(Debug, Default)]
pub struct Session {
    messages: Vec<ChatMessage>,
    document: Option<DocumentIndex>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn document(&self) -> Option<&DocumentIndex> {
        self.document.as_ref()
    }

    pub fn set_document(&mut self, index: DocumentIndex) {
        self.document = Some(index);
    }

    /// Detach the current document, returning the handle so the caller can
    /// delete its collection. All document-related fields are cleared.
    pub fn clear_document(&mut self) -> Option<DocumentIndex> {
        self.document.take()
    }
}
