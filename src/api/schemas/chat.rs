use crate::domain::conversation::Conversation;
use crate::domain::message::MessageView;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SentMessage {
    pub message: MessageView,
}

#[derive(Debug, Serialize)]
pub struct ConversationList {
    pub conversations: Vec<Conversation>,
    pub count: usize,
}
