//! Messages façade.

use std::sync::Arc;

use crate::api::{
    ApiError, ApiExecutor, ApiRequest, Error, Parameter, ValidationError, ValidationErrors,
    path_segment, with_query,
};
use crate::context::Context;

use super::types::{MessageEnvelope, StatusEnvelope};
use super::{
    BulkMessageResponse, GetMessagesParams, InteractiveButton, InteractiveButtonMessageRequest,
    InteractiveListMessageRequest, InteractiveListRow, InteractiveSection, MAX_BUTTONS, Message,
    MessageResponse, MessageStatus, MessagesResponse, SendTemplateMessageRequest,
    SendTemplateMessagesRequest, Template, TemplatesResponse,
};

fn require(value: &str, field: &str, message: &str) -> Result<(), Error> {
    if value.is_empty() {
        return Err(ValidationError::new(field, message).into());
    }
    Ok(())
}

/// Row id for item `n` (1-based) of a list menu section.
fn menu_row_id(section: &str, n: usize) -> String {
    format!("{}_{n}", section.replace(' ', "_").to_lowercase())
}

/// Template sends, interactive messages and message history.
pub struct MessagesService<E> {
    executor: Arc<E>,
}

impl<E> Clone for MessagesService<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E> std::fmt::Debug for MessagesService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagesService").finish_non_exhaustive()
    }
}

impl<E> MessagesService<E> {
    #[must_use]
    pub const fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }
}

impl<E: ApiExecutor> MessagesService<E> {
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the request is incomplete, otherwise
    /// the executor's error.
    pub async fn send_template_message(
        &self,
        ctx: &Context,
        request: &SendTemplateMessageRequest,
    ) -> Result<MessageResponse, Error> {
        request.validate()?;
        let request = ApiRequest::post("/api/v1/sendTemplateMessage").json(request)?;
        self.executor.execute(ctx, request).await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the batch is empty, has more than
    /// 100 recipients or any invalid number, otherwise the executor's error.
    pub async fn send_template_messages(
        &self,
        ctx: &Context,
        request: &SendTemplateMessagesRequest,
    ) -> Result<BulkMessageResponse, Error> {
        request.validate()?;
        let request = ApiRequest::post("/api/v1/sendTemplateMessages").json(request)?;
        self.executor.execute(ctx, request).await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the request is incomplete, otherwise
    /// the executor's error.
    pub async fn send_interactive_list_message(
        &self,
        ctx: &Context,
        request: &InteractiveListMessageRequest,
    ) -> Result<MessageResponse, Error> {
        request.validate()?;
        let request = ApiRequest::post("/api/v1/sendInteractiveListMessage").json(request)?;
        self.executor.execute(ctx, request).await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the request is incomplete or has
    /// more than three buttons, otherwise the executor's error.
    pub async fn send_interactive_button_message(
        &self,
        ctx: &Context,
        request: &InteractiveButtonMessageRequest,
    ) -> Result<MessageResponse, Error> {
        request.validate()?;
        let request = ApiRequest::post("/api/v1/sendInteractiveButtonMessage").json(request)?;
        self.executor.execute(ctx, request).await
    }

    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_message_templates(&self, ctx: &Context) -> Result<TemplatesResponse, Error> {
        self.executor
            .execute(ctx, ApiRequest::get("/api/v1/getMessageTemplates"))
            .await
    }

    /// Looks a template up by exact name.
    ///
    /// # Errors
    ///
    /// Returns a `not_found` [`ApiError`] when no template has that name.
    pub async fn get_message_template(&self, ctx: &Context, name: &str) -> Result<Template, Error> {
        require(name, "name", "template name is required")?;
        self.get_message_templates(ctx)
            .await?
            .templates
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ApiError::not_found(format!("template '{name}' not found")).into())
    }

    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_messages(
        &self,
        ctx: &Context,
        params: &GetMessagesParams,
    ) -> Result<MessagesResponse, Error> {
        let path = with_query("/api/v1/getMessages", params.query());
        self.executor.execute(ctx, ApiRequest::get(path)).await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, otherwise the
    /// executor's error.
    pub async fn get_message(&self, ctx: &Context, id: &str) -> Result<Message, Error> {
        require(id, "id", "message ID is required")?;
        let path = format!("/api/v1/getMessage/{}", path_segment(id));
        let envelope: MessageEnvelope = self.executor.execute(ctx, ApiRequest::get(path)).await?;
        Ok(envelope.message)
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, otherwise the
    /// executor's error.
    pub async fn get_message_status(&self, ctx: &Context, id: &str) -> Result<MessageStatus, Error> {
        require(id, "id", "message ID is required")?;
        let path = format!("/api/v1/getMessageStatus/{}", path_segment(id));
        let envelope: StatusEnvelope = self.executor.execute(ctx, ApiRequest::get(path)).await?;
        Ok(envelope.status)
    }

    /// History with one number; `params` supplies paging.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty phone, otherwise the
    /// executor's error.
    pub async fn get_messages_by_phone(
        &self,
        ctx: &Context,
        phone: &str,
        params: GetMessagesParams,
    ) -> Result<MessagesResponse, Error> {
        require(phone, "phone", "phone number is required")?;
        let params = GetMessagesParams {
            phone: Some(phone.to_string()),
            ..params
        };
        self.get_messages(ctx, &params).await
    }

    /// History between two dates; `params` supplies paging.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] unless both dates are given, otherwise
    /// the executor's error.
    pub async fn get_messages_by_date_range(
        &self,
        ctx: &Context,
        from_date: &str,
        to_date: &str,
        params: GetMessagesParams,
    ) -> Result<MessagesResponse, Error> {
        if from_date.is_empty() || to_date.is_empty() {
            return Err(ValidationError::new(
                "dateRange",
                "both fromDate and toDate are required",
            )
            .into());
        }
        let params = GetMessagesParams {
            from_date: Some(from_date.to_string()),
            to_date: Some(to_date.to_string()),
            ..params
        };
        self.get_messages(ctx, &params).await
    }

    /// Sends a template that takes no parameters.
    ///
    /// # Errors
    ///
    /// As [`MessagesService::send_template_message`].
    pub async fn send_simple_template_message(
        &self,
        ctx: &Context,
        phone: &str,
        template_name: &str,
        broadcast_name: &str,
    ) -> Result<MessageResponse, Error> {
        let request = SendTemplateMessageRequest::new(phone, template_name, broadcast_name);
        self.send_template_message(ctx, &request).await
    }

    /// Sends a template with named parameters, in iteration order.
    ///
    /// # Errors
    ///
    /// As [`MessagesService::send_template_message`].
    pub async fn send_template_message_with_params<I, K, V>(
        &self,
        ctx: &Context,
        phone: &str,
        template_name: &str,
        broadcast_name: &str,
        params: I,
    ) -> Result<MessageResponse, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let request = SendTemplateMessageRequest {
            parameters: params
                .into_iter()
                .map(|(name, value)| Parameter::new(name, value))
                .collect(),
            ..SendTemplateMessageRequest::new(phone, template_name, broadcast_name)
        };
        self.send_template_message(ctx, &request).await
    }

    /// Sends 1 to 3 reply buttons with ids `btn_1`, `btn_2`, `btn_3`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a bad button count, otherwise as
    /// [`MessagesService::send_interactive_button_message`].
    pub async fn send_quick_reply_buttons(
        &self,
        ctx: &Context,
        phone: &str,
        body: &str,
        titles: &[&str],
    ) -> Result<MessageResponse, Error> {
        if titles.is_empty() || titles.len() > MAX_BUTTONS {
            let mut errors = ValidationErrors::new();
            errors.add(
                "buttons",
                format!("must provide 1-{MAX_BUTTONS} button titles, got {}", titles.len()),
            );
            return Err(errors.into());
        }
        let buttons = titles
            .iter()
            .enumerate()
            .map(|(i, title)| InteractiveButton::reply(format!("btn_{}", i + 1), *title))
            .collect();
        let request = InteractiveButtonMessageRequest::new(phone, body, buttons);
        self.send_interactive_button_message(ctx, &request).await
    }

    /// Sends a list menu built from `(section title, item titles)` pairs.
    ///
    /// Row ids are the section title in snake case plus the 1-based item
    /// index, e.g. `main_dishes_2`.
    ///
    /// # Errors
    ///
    /// As [`MessagesService::send_interactive_list_message`].
    pub async fn send_list_menu(
        &self,
        ctx: &Context,
        phone: &str,
        body: &str,
        button: &str,
        menu: &[(&str, Vec<&str>)],
    ) -> Result<MessageResponse, Error> {
        let sections = menu
            .iter()
            .map(|(title, items)| InteractiveSection {
                title: (*title).to_string(),
                rows: items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| InteractiveListRow {
                        id: menu_row_id(title, i + 1),
                        title: (*item).to_string(),
                        description: None,
                    })
                    .collect(),
            })
            .collect();
        let request = InteractiveListMessageRequest::new(phone, body, button, sections);
        self.send_interactive_list_message(ctx, &request).await
    }

    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_templates_by_category(
        &self,
        ctx: &Context,
        category: &str,
    ) -> Result<Vec<Template>, Error> {
        let mut templates = self.get_message_templates(ctx).await?.templates;
        templates.retain(|t| t.category == category);
        Ok(templates)
    }

    /// Templates whose status is `APPROVED` or `ACTIVE`.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_active_templates(&self, ctx: &Context) -> Result<Vec<Template>, Error> {
        let mut templates = self.get_message_templates(ctx).await?.templates;
        templates.retain(Template::is_active);
        Ok(templates)
    }
}
