//! Chatbots and chat-session status.

mod service;
mod types;

#[cfg(test)]
mod service_tests;

pub use service::ChatbotsService;
pub use types::{
    Action, ChatStatus, ChatStatusResponse, Chatbot, ChatbotResponse, ChatbotsResponse, Condition,
    CreateChatbotRequest, Response, Rule, StartChatbotRequest, Trigger, UpdateChatStatusRequest,
    UpdateChatbotRequest,
};
