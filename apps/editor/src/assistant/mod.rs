pub mod chat;
pub mod prompts;

pub use chat::{
    build_context, chat_request, ChatAssistant, ChatReply, ChatRequest, ColspanSuggestion,
    Replacement,
};
