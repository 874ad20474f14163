//! Chatbots façade.

use std::sync::Arc;

use crate::api::{ApiError, ApiExecutor, ApiRequest, Error, ValidationError, path_segment};
use crate::context::Context;

use super::types::ChatbotEnvelope;
use super::{
    ChatStatus, ChatStatusResponse, Chatbot, ChatbotResponse, ChatbotsResponse,
    CreateChatbotRequest, Response, StartChatbotRequest, UpdateChatStatusRequest,
    UpdateChatbotRequest,
};

fn require_id(id: &str) -> Result<(), Error> {
    if id.is_empty() {
        return Err(ValidationError::new("id", "chatbot ID is required").into());
    }
    Ok(())
}

fn chatbot_path(id: &str) -> String {
    format!("/api/v1/chatbots/{}", path_segment(id))
}

/// Chatbot definitions and the chat sessions they drive.
pub struct ChatbotsService<E> {
    executor: Arc<E>,
}

impl<E> Clone for ChatbotsService<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E> std::fmt::Debug for ChatbotsService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatbotsService").finish_non_exhaustive()
    }
}

impl<E> ChatbotsService<E> {
    #[must_use]
    pub const fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }
}

impl<E: ApiExecutor> ChatbotsService<E> {
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_chatbots(&self, ctx: &Context) -> Result<ChatbotsResponse, Error> {
        self.executor
            .execute(ctx, ApiRequest::get("/api/v1/chatbots"))
            .await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, otherwise the
    /// executor's error.
    pub async fn get_chatbot(&self, ctx: &Context, id: &str) -> Result<Chatbot, Error> {
        require_id(id)?;
        let envelope: ChatbotEnvelope = self
            .executor
            .execute(ctx, ApiRequest::get(chatbot_path(id)))
            .await?;
        Ok(envelope.chatbot)
    }

    /// Starts a chatbot session with one number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the request is incomplete, otherwise
    /// the executor's error.
    pub async fn start_chatbot(
        &self,
        ctx: &Context,
        request: &StartChatbotRequest,
    ) -> Result<ChatbotResponse, Error> {
        request.validate()?;
        let request = ApiRequest::post("/api/v1/startChatbot").json(request)?;
        self.executor.execute(ctx, request).await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, otherwise the
    /// executor's error.
    pub async fn stop_chatbot(&self, ctx: &Context, id: &str) -> Result<(), Error> {
        require_id(id)?;
        let path = format!("/api/v1/stopChatbot/{}", path_segment(id));
        self.executor
            .execute_discarding(ctx, ApiRequest::post(path))
            .await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a missing number or a status
    /// outside [`ChatStatus`], otherwise the executor's error.
    pub async fn update_chat_status(
        &self,
        ctx: &Context,
        request: &UpdateChatStatusRequest,
    ) -> Result<ChatStatusResponse, Error> {
        request.validate()?;
        let request = ApiRequest::post("/api/v1/updateChatStatus").json(request)?;
        self.executor.execute(ctx, request).await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the request is incomplete, otherwise
    /// the executor's error.
    pub async fn create_chatbot(
        &self,
        ctx: &Context,
        request: &CreateChatbotRequest,
    ) -> Result<Chatbot, Error> {
        request.validate()?;
        let request = ApiRequest::post("/api/v1/chatbots").json(request)?;
        let envelope: ChatbotEnvelope = self.executor.execute(ctx, request).await?;
        Ok(envelope.chatbot)
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, otherwise the
    /// executor's error.
    pub async fn update_chatbot(
        &self,
        ctx: &Context,
        id: &str,
        request: &UpdateChatbotRequest,
    ) -> Result<Chatbot, Error> {
        require_id(id)?;
        let request = ApiRequest::put(chatbot_path(id)).json(request)?;
        let envelope: ChatbotEnvelope = self.executor.execute(ctx, request).await?;
        Ok(envelope.chatbot)
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, otherwise the
    /// executor's error.
    pub async fn delete_chatbot(&self, ctx: &Context, id: &str) -> Result<(), Error> {
        require_id(id)?;
        self.executor
            .execute_discarding(ctx, ApiRequest::delete(chatbot_path(id)))
            .await
    }

    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_active_chatbots(&self, ctx: &Context) -> Result<Vec<Chatbot>, Error> {
        let mut chatbots = self.get_chatbots(ctx).await?.chatbots;
        chatbots.retain(Chatbot::is_active);
        Ok(chatbots)
    }

    /// # Errors
    ///
    /// As [`ChatbotsService::update_chatbot`].
    pub async fn activate_chatbot(&self, ctx: &Context, id: &str) -> Result<Chatbot, Error> {
        self.set_active(ctx, id, true).await
    }

    /// # Errors
    ///
    /// As [`ChatbotsService::update_chatbot`].
    pub async fn deactivate_chatbot(&self, ctx: &Context, id: &str) -> Result<Chatbot, Error> {
        self.set_active(ctx, id, false).await
    }

    async fn set_active(&self, ctx: &Context, id: &str, active: bool) -> Result<Chatbot, Error> {
        let request = UpdateChatbotRequest {
            is_active: Some(active),
            ..UpdateChatbotRequest::default()
        };
        self.update_chatbot(ctx, id, &request).await
    }

    /// # Errors
    ///
    /// As [`ChatbotsService::start_chatbot`].
    pub async fn start_chatbot_for_contact(
        &self,
        ctx: &Context,
        chatbot_id: &str,
        whatsapp_number: &str,
    ) -> Result<ChatbotResponse, Error> {
        let request = StartChatbotRequest::new(chatbot_id, whatsapp_number);
        self.start_chatbot(ctx, &request).await
    }

    /// # Errors
    ///
    /// As [`ChatbotsService::start_chatbot`].
    pub async fn start_chatbot_with_message(
        &self,
        ctx: &Context,
        chatbot_id: &str,
        whatsapp_number: &str,
        initial_message: &str,
    ) -> Result<ChatbotResponse, Error> {
        let request = StartChatbotRequest {
            initial_message: Some(initial_message.to_string()),
            ..StartChatbotRequest::new(chatbot_id, whatsapp_number)
        };
        self.start_chatbot(ctx, &request).await
    }

    /// Marks the chat `ASSIGNED` to `user_id`.
    ///
    /// # Errors
    ///
    /// As [`ChatbotsService::update_chat_status`].
    pub async fn assign_chat_to_user(
        &self,
        ctx: &Context,
        whatsapp_number: &str,
        user_id: &str,
    ) -> Result<ChatStatusResponse, Error> {
        let request = UpdateChatStatusRequest {
            assigned_to: Some(user_id.to_string()),
            ..UpdateChatStatusRequest::new(whatsapp_number, ChatStatus::Assigned)
        };
        self.update_chat_status(ctx, &request).await
    }

    /// Hands the chat from the bot to `user_id`, leaving `notes` for them.
    ///
    /// # Errors
    ///
    /// As [`ChatbotsService::update_chat_status`].
    pub async fn transfer_chat_to_human(
        &self,
        ctx: &Context,
        whatsapp_number: &str,
        user_id: &str,
        notes: &str,
    ) -> Result<ChatStatusResponse, Error> {
        let request = UpdateChatStatusRequest {
            assigned_to: Some(user_id.to_string()),
            notes: non_empty(notes),
            ..UpdateChatStatusRequest::new(whatsapp_number, ChatStatus::Assigned)
        };
        self.update_chat_status(ctx, &request).await
    }

    /// # Errors
    ///
    /// As [`ChatbotsService::update_chat_status`].
    pub async fn close_chat_session(
        &self,
        ctx: &Context,
        whatsapp_number: &str,
        notes: &str,
    ) -> Result<ChatStatusResponse, Error> {
        self.set_chat_status(ctx, whatsapp_number, ChatStatus::Closed, notes)
            .await
    }

    /// # Errors
    ///
    /// As [`ChatbotsService::update_chat_status`].
    pub async fn resolve_chat_session(
        &self,
        ctx: &Context,
        whatsapp_number: &str,
        notes: &str,
    ) -> Result<ChatStatusResponse, Error> {
        self.set_chat_status(ctx, whatsapp_number, ChatStatus::Resolved, notes)
            .await
    }

    async fn set_chat_status(
        &self,
        ctx: &Context,
        whatsapp_number: &str,
        status: ChatStatus,
        notes: &str,
    ) -> Result<ChatStatusResponse, Error> {
        let request = UpdateChatStatusRequest {
            notes: non_empty(notes),
            ..UpdateChatStatusRequest::new(whatsapp_number, status)
        };
        self.update_chat_status(ctx, &request).await
    }

    /// Tags the chat. The API requires a status alongside, so the chat is
    /// also set `OPEN`.
    ///
    /// # Errors
    ///
    /// As [`ChatbotsService::update_chat_status`].
    pub async fn add_tags_to_chat(
        &self,
        ctx: &Context,
        whatsapp_number: &str,
        tags: Vec<String>,
    ) -> Result<ChatStatusResponse, Error> {
        let request = UpdateChatStatusRequest {
            tags,
            ..UpdateChatStatusRequest::new(whatsapp_number, ChatStatus::Open)
        };
        self.update_chat_status(ctx, &request).await
    }

    /// Looks a chatbot up by exact name.
    ///
    /// # Errors
    ///
    /// Returns a `not_found` [`ApiError`] when no chatbot has that name.
    pub async fn get_chatbot_by_name(&self, ctx: &Context, name: &str) -> Result<Chatbot, Error> {
        if name.is_empty() {
            return Err(ValidationError::new("name", "chatbot name is required").into());
        }
        self.get_chatbots(ctx)
            .await?
            .chatbots
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ApiError::not_found(format!("chatbot with name '{name}' not found")).into())
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty keyword, otherwise the
    /// executor's error.
    pub async fn get_chatbots_by_keyword(
        &self,
        ctx: &Context,
        keyword: &str,
    ) -> Result<Vec<Chatbot>, Error> {
        if keyword.is_empty() {
            return Err(ValidationError::new("keyword", "keyword is required").into());
        }
        let mut chatbots = self.get_chatbots(ctx).await?.chatbots;
        chatbots.retain(|c| c.has_keyword(keyword));
        Ok(chatbots)
    }

    /// Replaces the chatbot's keywords.
    ///
    /// # Errors
    ///
    /// As [`ChatbotsService::update_chatbot`].
    pub async fn update_chatbot_keywords(
        &self,
        ctx: &Context,
        id: &str,
        keywords: Vec<String>,
    ) -> Result<Chatbot, Error> {
        let request = UpdateChatbotRequest {
            keywords,
            ..UpdateChatbotRequest::default()
        };
        self.update_chatbot(ctx, id, &request).await
    }

    /// Replaces the chatbot's canned responses.
    ///
    /// # Errors
    ///
    /// As [`ChatbotsService::update_chatbot`].
    pub async fn update_chatbot_responses(
        &self,
        ctx: &Context,
        id: &str,
        responses: Vec<Response>,
    ) -> Result<Chatbot, Error> {
        let request = UpdateChatbotRequest {
            responses,
            ..UpdateChatbotRequest::default()
        };
        self.update_chatbot(ctx, id, &request).await
    }
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}
