use crate::ollama::ChatMessage;

/// Message history of one image's exchange with the model.
///
/// Always ordered: the user prompt, then the assistant reply, then the tool
/// results for that reply.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new(prompt: ChatMessage) -> Self {
        Self {
            messages: vec![prompt],
        }
    }

    pub fn push_assistant(&mut self, reply: ChatMessage) {
        self.messages.push(reply);
    }

    pub fn push_tool_results(&mut self, results: impl IntoIterator<Item = ChatMessage>) {
        self.messages.extend(results);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}
