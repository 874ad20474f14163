//! Messages: templates, interactive messages and history.

mod service;
mod types;


pub use service::MessagesService;
pub use types::{
    BulkMessageError, BulkMessageResponse, GetMessagesParams, InteractiveButton,
    InteractiveButtonAction, InteractiveButtonMessageRequest, InteractiveButtonReply,
    InteractiveHeader, InteractiveListAction, InteractiveListMessageRequest, InteractiveListRow,
    InteractiveSection, InteractiveText, MAX_BUTTONS, Message, MessageResponse, MessageStatus,
    MessagesResponse, Model, SendTemplateMessageRequest, SendTemplateMessagesRequest, Template,
    TemplateButton, TemplateComponent, TemplateInfo, TemplateMessageRecipient, TemplateParameter,
    TemplatesResponse,
};
