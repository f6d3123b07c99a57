//! Typed back-office operations
//!
//! One method per route. Queries are answered through the [`QueryCache`];
//! mutations go straight to the backend and invalidate the endpoint's tags
//! once the backend accepted them.

use super::cache::{cache_key, QueryCache};
use super::client::BaseClient;
use super::endpoints::{self as ep, Endpoint, PathParams};
use super::errors::ApiError;
use crate::common::types::*;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct BackofficeApi {
    client: BaseClient,
    cache: Arc<QueryCache>,
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn id(name: &'static str, value: i64) -> (&'static str, String) {
    (name, value.to_string())
}

impl BackofficeApi {
    /// Typed API over `client`; any logout of its session, including one
    /// forced by a `401`, empties `cache`
    pub fn new(client: BaseClient, cache: Arc<QueryCache>) -> Self {
        let weak = Arc::downgrade(&cache);
        client.session().on_logout(move || {
            if let Some(cache) = weak.upgrade() {
                cache.clear();
            }
        });
        Self { client, cache }
    }

    pub fn client(&self) -> &BaseClient {
        &self.client
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    /// Store a backend-issued token for subsequent requests
    pub fn login(&self, token: &str) -> std::io::Result<()> {
        self.cache.clear();
        self.client.session().login(token)
    }

    /// End the session and drop everything fetched under it
    pub fn logout(&self) {
        self.client.session().logout();
    }

    async fn query<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        params: &PathParams<'_>,
        query: Vec<(String, String)>,
    ) -> Result<T, ApiError> {
        let path = endpoint.render_path(params)?;
        let key = cache_key(endpoint, params, &query);
        let tags = endpoint.provided_tags(params);
        let client = self.client.clone();
        let method = endpoint.verb.method();

        let value = self
            .cache
            .query(key, tags, move || async move {
                client.request_value(method, &path, &query, None).await
            })
            .await?;
        decode(value)
    }

    async fn mutate<B: Serialize + ?Sized>(
        &self,
        endpoint: &Endpoint,
        params: &PathParams<'_>,
        body: Option<&B>,
    ) -> Result<Value, ApiError> {
        let path = endpoint.render_path(params)?;
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        let value = self
            .client
            .request_value(endpoint.verb.method(), &path, &[], body.as_ref())
            .await?;

        let removed = self.cache.invalidate(&endpoint.invalidated_tags(params));
        debug!("{} succeeded, {} cached queries invalidated", endpoint.name, removed);
        Ok(value)
    }

    async fn remove(&self, endpoint: &Endpoint, params: &PathParams<'_>) -> Result<(), ApiError> {
        self.mutate::<Value>(endpoint, params, None).await.map(|_| ())
    }

    // Casinos

    pub async fn list_casinos(&self) -> Result<Vec<Casino>, ApiError> {
        self.query(&ep::LIST_CASINOS, &[], Vec::new()).await
    }

    pub async fn get_casino(&self, casino_id: i64) -> Result<Casino, ApiError> {
        self.query(&ep::GET_CASINO, &[id("id", casino_id)], Vec::new()).await
    }

    pub async fn create_casino(&self, casino: &NewCasino) -> Result<Casino, ApiError> {
        casino.validate()?;
        decode(self.mutate(&ep::CREATE_CASINO, &[], Some(casino)).await?)
    }

    pub async fn update_casino(&self, casino_id: i64, casino: &NewCasino) -> Result<Casino, ApiError> {
        casino.validate()?;
        decode(self.mutate(&ep::UPDATE_CASINO, &[id("id", casino_id)], Some(casino)).await?)
    }

    pub async fn delete_casino(&self, casino_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_CASINO, &[id("id", casino_id)]).await
    }

    // Profile fields and values

    pub async fn list_profile_fields(&self) -> Result<Vec<ProfileField>, ApiError> {
        self.query(&ep::LIST_PROFILE_FIELDS, &[], Vec::new()).await
    }

    pub async fn create_profile_field(&self, field: &NewProfileField) -> Result<ProfileField, ApiError> {
        field.validate()?;
        decode(self.mutate(&ep::CREATE_PROFILE_FIELD, &[], Some(field)).await?)
    }

    pub async fn update_profile_field(&self, field_id: i64, field: &NewProfileField) -> Result<ProfileField, ApiError> {
        field.validate()?;
        decode(self.mutate(&ep::UPDATE_PROFILE_FIELD, &[id("id", field_id)], Some(field)).await?)
    }

    pub async fn delete_profile_field(&self, field_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_PROFILE_FIELD, &[id("id", field_id)]).await
    }

    pub async fn get_profile_values(&self, casino_id: i64) -> Result<Vec<ProfileValue>, ApiError> {
        self.query(&ep::GET_PROFILE_VALUES, &[id("casino_id", casino_id)], Vec::new())
            .await
    }

    /// Set or clear (`None`) one profile attribute of a casino
    pub async fn set_profile_value(
        &self,
        casino_id: i64,
        field_id: i64,
        value: Option<&str>,
    ) -> Result<ProfileValue, ApiError> {
        let params = [id("casino_id", casino_id), id("field_id", field_id)];
        decode(self.mutate(&ep::SET_PROFILE_VALUE, &params, Some(&json!({ "value": value }))).await?)
    }

    // Profile contexts and the settings matrix

    pub async fn list_profile_contexts(&self) -> Result<Vec<ProfileContext>, ApiError> {
        self.query(&ep::LIST_PROFILE_CONTEXTS, &[], Vec::new()).await
    }

    pub async fn create_profile_context(&self, context: &NewProfileContext) -> Result<ProfileContext, ApiError> {
        context.validate()?;
        decode(self.mutate(&ep::CREATE_PROFILE_CONTEXT, &[], Some(context)).await?)
    }

    pub async fn update_profile_context(
        &self,
        context_id: i64,
        context: &NewProfileContext,
    ) -> Result<ProfileContext, ApiError> {
        context.validate()?;
        decode(self.mutate(&ep::UPDATE_PROFILE_CONTEXT, &[id("id", context_id)], Some(context)).await?)
    }

    pub async fn delete_profile_context(&self, context_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_PROFILE_CONTEXT, &[id("id", context_id)]).await
    }

    pub async fn get_profile_settings(&self, casino_id: i64) -> Result<Vec<ProfileSetting>, ApiError> {
        self.query(&ep::GET_PROFILE_SETTINGS, &[id("casino_id", casino_id)], Vec::new())
            .await
    }

    pub async fn update_profile_settings(&self, casino_id: i64, changes: &[SettingChange]) -> Result<(), ApiError> {
        for change in changes {
            if change.geo.trim().is_empty() {
                return Err(ApiError::required("geo"));
            }
        }
        self.mutate(&ep::UPDATE_PROFILE_SETTINGS, &[id("casino_id", casino_id)], Some(changes))
            .await
            .map(|_| ())
    }

    // Bonuses

    pub async fn list_bonuses(&self, casino_id: i64) -> Result<Vec<Bonus>, ApiError> {
        self.query(&ep::LIST_BONUSES, &[id("casino_id", casino_id)], Vec::new()).await
    }

    pub async fn create_bonus(&self, casino_id: i64, bonus: &NewBonus) -> Result<Bonus, ApiError> {
        bonus.validate()?;
        decode(self.mutate(&ep::CREATE_BONUS, &[id("casino_id", casino_id)], Some(bonus)).await?)
    }

    pub async fn update_bonus(&self, bonus_id: i64, bonus: &NewBonus) -> Result<Bonus, ApiError> {
        bonus.validate()?;
        decode(self.mutate(&ep::UPDATE_BONUS, &[id("id", bonus_id)], Some(bonus)).await?)
    }

    pub async fn delete_bonus(&self, bonus_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_BONUS, &[id("id", bonus_id)]).await
    }

    pub async fn list_bonus_images(&self, bonus_id: i64) -> Result<Vec<ImageAttachment>, ApiError> {
        self.query(&ep::LIST_BONUS_IMAGES, &[id("id", bonus_id)], Vec::new()).await
    }

    pub async fn delete_bonus_image(&self, image_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_BONUS_IMAGE, &[id("id", image_id)]).await
    }

    // Payments

    pub async fn list_payments(&self, casino_id: i64) -> Result<Vec<Payment>, ApiError> {
        self.query(&ep::LIST_PAYMENTS, &[id("casino_id", casino_id)], Vec::new()).await
    }

    pub async fn create_payment(&self, casino_id: i64, payment: &NewPayment) -> Result<Payment, ApiError> {
        payment.validate()?;
        decode(self.mutate(&ep::CREATE_PAYMENT, &[id("casino_id", casino_id)], Some(payment)).await?)
    }

    pub async fn update_payment(&self, payment_id: i64, payment: &NewPayment) -> Result<Payment, ApiError> {
        payment.validate()?;
        decode(self.mutate(&ep::UPDATE_PAYMENT, &[id("id", payment_id)], Some(payment)).await?)
    }

    pub async fn delete_payment(&self, payment_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_PAYMENT, &[id("id", payment_id)]).await
    }

    pub async fn list_payment_images(&self, payment_id: i64) -> Result<Vec<ImageAttachment>, ApiError> {
        self.query(&ep::LIST_PAYMENT_IMAGES, &[id("id", payment_id)], Vec::new()).await
    }

    pub async fn delete_payment_image(&self, image_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_PAYMENT_IMAGE, &[id("id", image_id)]).await
    }

    // Promos

    pub async fn list_promos(&self, casino_id: i64) -> Result<Vec<Promo>, ApiError> {
        self.query(&ep::LIST_PROMOS, &[id("casino_id", casino_id)], Vec::new()).await
    }

    pub async fn create_promo(&self, casino_id: i64, promo: &NewPromo) -> Result<Promo, ApiError> {
        promo.validate()?;
        decode(self.mutate(&ep::CREATE_PROMO, &[id("casino_id", casino_id)], Some(promo)).await?)
    }

    pub async fn update_promo(&self, promo_id: i64, promo: &NewPromo) -> Result<Promo, ApiError> {
        promo.validate()?;
        decode(self.mutate(&ep::UPDATE_PROMO, &[id("id", promo_id)], Some(promo)).await?)
    }

    pub async fn delete_promo(&self, promo_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_PROMO, &[id("id", promo_id)]).await
    }

    // Test accounts

    pub async fn list_accounts(&self, casino_id: i64) -> Result<Vec<Account>, ApiError> {
        self.query(&ep::LIST_ACCOUNTS, &[id("casino_id", casino_id)], Vec::new()).await
    }

    pub async fn create_account(&self, casino_id: i64, account: &NewAccount) -> Result<Account, ApiError> {
        account.validate()?;
        decode(self.mutate(&ep::CREATE_ACCOUNT, &[id("casino_id", casino_id)], Some(account)).await?)
    }

    pub async fn update_account(&self, account_id: i64, account: &NewAccount) -> Result<Account, ApiError> {
        account.validate()?;
        decode(self.mutate(&ep::UPDATE_ACCOUNT, &[id("id", account_id)], Some(account)).await?)
    }

    pub async fn delete_account(&self, account_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_ACCOUNT, &[id("id", account_id)]).await
    }

    pub async fn list_account_transactions(&self, account_id: i64) -> Result<Vec<AccountTransaction>, ApiError> {
        self.query(&ep::LIST_ACCOUNT_TRANSACTIONS, &[id("account_id", account_id)], Vec::new())
            .await
    }

    pub async fn create_account_transaction(
        &self,
        account_id: i64,
        transaction: &NewAccountTransaction,
    ) -> Result<AccountTransaction, ApiError> {
        transaction.validate()?;
        let params = [id("account_id", account_id)];
        decode(self.mutate(&ep::CREATE_ACCOUNT_TRANSACTION, &params, Some(transaction)).await?)
    }

    pub async fn delete_account_transaction(&self, transaction_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_ACCOUNT_TRANSACTION, &[id("id", transaction_id)]).await
    }

    // Emails

    pub async fn list_emails(&self, filter: &EmailFilter) -> Result<Vec<Email>, ApiError> {
        let mut query = Vec::new();
        if let Some(casino_id) = filter.casino_id {
            query.push(("casino_id".to_string(), casino_id.to_string()));
        }
        if let Some(recipient) = &filter.recipient {
            query.push(("recipient".to_string(), recipient.clone()));
        }
        if let Some(unread) = filter.unread {
            query.push(("unread".to_string(), unread.to_string()));
        }
        self.query(&ep::LIST_EMAILS, &[], query).await
    }

    pub async fn get_email(&self, email_id: i64) -> Result<Email, ApiError> {
        self.query(&ep::GET_EMAIL, &[id("id", email_id)], Vec::new()).await
    }

    /// Toggle the read flag or link the email to a casino
    pub async fn update_email(&self, email_id: i64, patch: &EmailPatch) -> Result<Email, ApiError> {
        decode(self.mutate(&ep::UPDATE_EMAIL, &[id("id", email_id)], Some(patch)).await?)
    }

    pub async fn list_email_recipients(&self) -> Result<Vec<String>, ApiError> {
        self.query(&ep::LIST_EMAIL_RECIPIENTS, &[], Vec::new()).await
    }

    // Comments and tags

    pub async fn list_comments(&self, casino_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.query(&ep::LIST_COMMENTS, &[id("casino_id", casino_id)], Vec::new()).await
    }

    pub async fn create_comment(&self, casino_id: i64, comment: &NewComment) -> Result<Comment, ApiError> {
        comment.validate()?;
        decode(self.mutate(&ep::CREATE_COMMENT, &[id("casino_id", casino_id)], Some(comment)).await?)
    }

    pub async fn update_comment(&self, comment_id: i64, comment: &NewComment) -> Result<Comment, ApiError> {
        comment.validate()?;
        decode(self.mutate(&ep::UPDATE_COMMENT, &[id("id", comment_id)], Some(comment)).await?)
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_COMMENT, &[id("id", comment_id)]).await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.query(&ep::LIST_TAGS, &[], Vec::new()).await
    }

    pub async fn create_tag(&self, tag: &NewTag) -> Result<Tag, ApiError> {
        tag.validate()?;
        decode(self.mutate(&ep::CREATE_TAG, &[], Some(tag)).await?)
    }

    pub async fn delete_tag(&self, tag_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DELETE_TAG, &[id("id", tag_id)]).await
    }

    pub async fn attach_tag(&self, comment_id: i64, tag_id: i64) -> Result<(), ApiError> {
        let params = [id("id", comment_id), id("tag_id", tag_id)];
        self.mutate::<Value>(&ep::ATTACH_TAG, &params, None).await.map(|_| ())
    }

    pub async fn detach_tag(&self, comment_id: i64, tag_id: i64) -> Result<(), ApiError> {
        self.remove(&ep::DETACH_TAG, &[id("id", comment_id), id("tag_id", tag_id)])
            .await
    }

    // History

    pub async fn list_history(&self, casino_id: i64) -> Result<Vec<HistoryEntry>, ApiError> {
        self.query(&ep::LIST_HISTORY, &[id("casino_id", casino_id)], Vec::new()).await
    }
}
