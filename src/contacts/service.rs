//! Contacts façade.

use std::sync::Arc;

use crate::api::{
    ApiError, ApiExecutor, ApiRequest, BaseResponse, CustomParam, Error, ValidationError,
    ValidationErrors, path_segment, with_query,
};
use crate::config::defaults;
use crate::context::Context;

use super::types::ContactResponse;
use super::{
    BulkContactResponse, Contact, ContactFilter, ContactsResponse, CreateContactRequest,
    GetContactsParams, UpdateContactRequest,
};

fn require_id(id: &str) -> Result<(), Error> {
    if id.is_empty() {
        return Err(ValidationError::new("id", "contact ID is required").into());
    }
    Ok(())
}

/// Contact management endpoints.
pub struct ContactsService<E> {
    executor: Arc<E>,
}

impl<E> Clone for ContactsService<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<E> std::fmt::Debug for ContactsService<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContactsService").finish_non_exhaustive()
    }
}

impl<E> ContactsService<E> {
    #[must_use]
    pub const fn new(executor: Arc<E>) -> Self {
        Self { executor }
    }
}

impl<E: ApiExecutor> ContactsService<E> {
    /// Lists contacts, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_contacts(
        &self,
        ctx: &Context,
        params: &GetContactsParams,
    ) -> Result<ContactsResponse, Error> {
        let path = with_query("/api/v1/getContacts", params.query());
        self.executor.execute(ctx, ApiRequest::get(path)).await
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, otherwise the
    /// executor's error.
    pub async fn get_contact(&self, ctx: &Context, id: &str) -> Result<Contact, Error> {
        require_id(id)?;
        let path = format!("/api/v1/getContact/{}", path_segment(id));
        let response: ContactResponse = self.executor.execute(ctx, ApiRequest::get(path)).await?;
        Ok(response.contact)
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] if `contact` is incomplete, otherwise
    /// the executor's error.
    pub async fn add_contact(
        &self,
        ctx: &Context,
        contact: &CreateContactRequest,
    ) -> Result<Contact, Error> {
        contact.validate()?;
        let request = ApiRequest::post("/api/v1/addContact").json(contact)?;
        let response: ContactResponse = self.executor.execute(ctx, request).await?;
        Ok(response.contact)
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, otherwise the
    /// executor's error.
    pub async fn update_contact(
        &self,
        ctx: &Context,
        id: &str,
        update: &UpdateContactRequest,
    ) -> Result<Contact, Error> {
        require_id(id)?;
        let path = format!("/api/v1/updateContact/{}", path_segment(id));
        let request = ApiRequest::put(path).json(update)?;
        let response: ContactResponse = self.executor.execute(ctx, request).await?;
        Ok(response.contact)
    }

    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, otherwise the
    /// executor's error.
    pub async fn delete_contact(&self, ctx: &Context, id: &str) -> Result<(), Error> {
        require_id(id)?;
        let path = format!("/api/v1/deleteContact/{}", path_segment(id));
        self.executor
            .execute::<BaseResponse>(ctx, ApiRequest::delete(path))
            .await
            .map(drop)
    }

    /// Lists contacts whose name matches `query`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty query, otherwise the
    /// executor's error.
    pub async fn search_contacts(
        &self,
        ctx: &Context,
        query: &str,
    ) -> Result<ContactsResponse, Error> {
        if query.is_empty() {
            return Err(ValidationError::new("query", "search query is required").into());
        }
        let params = GetContactsParams {
            name: Some(query.to_string()),
            ..GetContactsParams::default()
        };
        self.get_contacts(ctx, &params).await
    }

    /// Lists contacts by name and creation date.
    ///
    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn filter_contacts(
        &self,
        ctx: &Context,
        filter: &ContactFilter,
    ) -> Result<ContactsResponse, Error> {
        let params = GetContactsParams {
            name: filter.name.clone(),
            created_date: filter
                .created_after
                .map(|t| t.format("%Y-%m-%d").to_string()),
            ..GetContactsParams::default()
        };
        self.get_contacts(ctx, &params).await
    }

    /// Creates up to 100 contacts in one call.
    ///
    /// Every contact is validated first; failures name the offending index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty or oversized batch or any
    /// invalid contact, otherwise the executor's error.
    pub async fn add_contacts(
        &self,
        ctx: &Context,
        contacts: &[CreateContactRequest],
    ) -> Result<BulkContactResponse, Error> {
        let mut errors = ValidationErrors::new();
        errors.check(
            contacts.is_empty(),
            "contacts",
            "at least one contact is required",
        );
        errors.check(
            contacts.len() > defaults::MAX_BULK_ITEMS,
            "contacts",
            format!(
                "maximum {} contacts allowed per request, got {}",
                defaults::MAX_BULK_ITEMS,
                contacts.len()
            ),
        );
        for (i, contact) in contacts.iter().enumerate() {
            if let Err(invalid) = contact.validate() {
                for e in invalid.errors() {
                    errors.add(format!("contacts[{i}].{}", e.field), e.message.clone());
                }
            }
        }
        errors.into_result()?;

        let body = serde_json::json!({ "contacts": contacts });
        let request = ApiRequest::post("/api/v1/addContacts").json(&body)?;
        self.executor.execute(ctx, request).await
    }

    /// # Errors
    ///
    /// Returns the executor's error.
    pub async fn get_contacts_by_page(
        &self,
        ctx: &Context,
        page: u32,
        page_size: u32,
    ) -> Result<ContactsResponse, Error> {
        self.get_contacts(ctx, &GetContactsParams::page(page, page_size))
            .await
    }

    /// Walks every page and concatenates the results.
    ///
    /// Stops at the last page reported by the API or at the first empty page.
    ///
    /// # Errors
    ///
    /// Returns the first page error; contacts already fetched are dropped.
    pub async fn get_all_contacts(&self, ctx: &Context) -> Result<Vec<Contact>, Error> {
        let mut all = Vec::new();
        let mut page = 1;
        loop {
            let response = self
                .get_contacts_by_page(ctx, page, defaults::ALL_CONTACTS_PAGE_SIZE)
                .await?;
            let done = response.contacts.is_empty() || page >= response.pagination.total_pages;
            all.extend(response.contacts);
            if done {
                return Ok(all);
            }
            page += 1;
        }
    }

    /// Finds the contact with `phone`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty phone and a `not_found`
    /// [`ApiError`] when no contact matches.
    pub async fn get_contact_by_phone(&self, ctx: &Context, phone: &str) -> Result<Contact, Error> {
        if phone.is_empty() {
            return Err(ValidationError::new("phone", "phone number is required").into());
        }
        let path = with_query(
            "/api/v1/getContacts",
            [
                ("phone", Some(phone.to_string())),
                ("pageSize", Some("1".to_string())),
            ],
        );
        let response: ContactsResponse = self.executor.execute(ctx, ApiRequest::get(path)).await?;
        response
            .contacts
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found(format!("contact with phone {phone} not found")).into())
    }

    /// Replaces the tags of contact `id`.
    ///
    /// # Errors
    ///
    /// As [`ContactsService::update_contact`].
    pub async fn update_contact_tags(
        &self,
        ctx: &Context,
        id: &str,
        tags: Vec<String>,
    ) -> Result<Contact, Error> {
        let update = UpdateContactRequest {
            tags,
            ..UpdateContactRequest::default()
        };
        self.update_contact(ctx, id, &update).await
    }

    /// Replaces the custom parameters of contact `id`.
    ///
    /// # Errors
    ///
    /// As [`ContactsService::update_contact`].
    pub async fn update_contact_custom_params(
        &self,
        ctx: &Context,
        id: &str,
        custom_params: Vec<CustomParam>,
    ) -> Result<Contact, Error> {
        let update = UpdateContactRequest {
            custom_params,
            ..UpdateContactRequest::default()
        };
        self.update_contact(ctx, id, &update).await
    }
}
