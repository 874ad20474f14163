//! Contacts: list, search, create, update and delete.

mod service;
mod types;


pub use service::ContactsService;
pub use types::{
    BulkContactError, BulkContactResponse, Contact, ContactFilter, ContactsResponse,
    CreateContactRequest, GetContactsParams, UpdateContactRequest,
};
