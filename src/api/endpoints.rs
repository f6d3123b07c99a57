//! Declarative endpoint table
//!
//! One entry per backend route: path template, verb, and the cache tags it
//! provides (queries) or invalidates (mutations). Tag ids come from the
//! endpoint's `tag_param` so that, for example, bonus lists are scoped per
//! casino.

use super::errors::ApiError;
use reqwest::Method;
use std::fmt;

/// Resource families used as cache tag types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagKind {
    Casino,
    ProfileField,
    ProfileValue,
    ProfileContext,
    ProfileSetting,
    Bonus,
    BonusImage,
    Payment,
    PaymentImage,
    Promo,
    Account,
    AccountTransaction,
    Email,
    EmailRecipient,
    Comment,
    Tag,
    History,
}

/// Concrete tag attached to a cache entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheTag {
    pub kind: TagKind,
    /// `None` is the list-level tag of the kind
    pub id: Option<String>,
}

impl CacheTag {
    pub fn list(kind: TagKind) -> Self {
        Self { kind, id: None }
    }

    pub fn item(kind: TagKind, id: impl ToString) -> Self {
        Self { kind, id: Some(id.to_string()) }
    }

    /// Whether invalidating `self` drops an entry that provided `provided`
    pub fn matches(&self, provided: &CacheTag) -> bool {
        if self.kind != provided.kind {
            return false;
        }
        match (&self.id, &provided.id) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(a), Some(b)) => a == b,
        }
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{:?}:{}", self.kind, id),
            None => write!(f, "{:?}:*", self.kind),
        }
    }
}

/// Tag declaration on an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagRule {
    pub kind: TagKind,
    /// Take the id from the endpoint's `tag_param`
    pub scoped: bool,
}

pub const fn scoped(kind: TagKind) -> TagRule {
    TagRule { kind, scoped: true }
}

pub const fn every(kind: TagKind) -> TagRule {
    TagRule { kind, scoped: false }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn method(&self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }
}

/// Path parameters bound to an endpoint call
pub type PathParams<'a> = [(&'a str, String)];

#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub name: &'static str,
    pub verb: Verb,
    /// Template relative to the base URL, `{param}` placeholders
    pub path: &'static str,
    pub tag_param: Option<&'static str>,
    pub provides: &'static [TagRule],
    pub invalidates: &'static [TagRule],
}

impl Endpoint {
    pub fn is_query(&self) -> bool {
        self.verb == Verb::Get
    }

    /// Substitute every `{param}` in the path template
    pub fn render_path(&self, params: &PathParams<'_>) -> Result<String, ApiError> {
        let mut path = self.path.to_string();
        for (name, value) in params {
            path = path.replace(&format!("{{{}}}", name), value);
        }
        if path.contains('{') {
            return Err(ApiError::InvalidUrl(format!(
                "{}: unbound parameter in '{}'",
                self.name, path
            )));
        }
        Ok(path)
    }

    pub fn provided_tags(&self, params: &PathParams<'_>) -> Vec<CacheTag> {
        self.resolve(self.provides, params)
    }

    pub fn invalidated_tags(&self, params: &PathParams<'_>) -> Vec<CacheTag> {
        self.resolve(self.invalidates, params)
    }

    fn resolve(&self, rules: &[TagRule], params: &PathParams<'_>) -> Vec<CacheTag> {
        let scope = self
            .tag_param
            .and_then(|name| params.iter().find(|(p, _)| *p == name))
            .map(|(_, value)| value.clone());

        rules
            .iter()
            .map(|rule| CacheTag {
                kind: rule.kind,
                id: if rule.scoped { scope.clone() } else { None },
            })
            .collect()
    }
}

use TagKind::*;

macro_rules! endpoint {
    ($const_name:ident, $name:literal, $verb:ident, $path:literal, $tag_param:expr, provides [$($p:expr),*], invalidates [$($i:expr),*]) => {
        pub const $const_name: Endpoint = Endpoint {
            name: $name,
            verb: Verb::$verb,
            path: $path,
            tag_param: $tag_param,
            provides: &[$($p),*],
            invalidates: &[$($i),*],
        };
    };
}

// Casinos
endpoint!(LIST_CASINOS, "list_casinos", Get, "casinos", None, provides [every(Casino)], invalidates []);
endpoint!(GET_CASINO, "get_casino", Get, "casinos/{id}", Some("id"), provides [scoped(Casino)], invalidates []);
endpoint!(CREATE_CASINO, "create_casino", Post, "casinos", None, provides [], invalidates [every(Casino)]);
endpoint!(UPDATE_CASINO, "update_casino", Put, "casinos/{id}", Some("id"),
    provides [], invalidates [scoped(Casino), scoped(History)]);
endpoint!(DELETE_CASINO, "delete_casino", Delete, "casinos/{id}", Some("id"),
    provides [], invalidates [scoped(Casino), scoped(ProfileValue), scoped(ProfileSetting), scoped(Bonus),
        scoped(Payment), scoped(Promo), scoped(Account), scoped(Comment), scoped(History), every(Email)]);

// Profile fields, values, contexts, settings
endpoint!(LIST_PROFILE_FIELDS, "list_profile_fields", Get, "profile-fields", None, provides [every(ProfileField)], invalidates []);
endpoint!(CREATE_PROFILE_FIELD, "create_profile_field", Post, "profile-fields", None, provides [], invalidates [every(ProfileField)]);
endpoint!(UPDATE_PROFILE_FIELD, "update_profile_field", Put, "profile-fields/{id}", None, provides [], invalidates [every(ProfileField)]);
endpoint!(DELETE_PROFILE_FIELD, "delete_profile_field", Delete, "profile-fields/{id}", None,
    provides [], invalidates [every(ProfileField), every(ProfileValue), every(ProfileSetting)]);
endpoint!(GET_PROFILE_VALUES, "get_profile_values", Get, "casinos/{casino_id}/profile", Some("casino_id"),
    provides [scoped(ProfileValue)], invalidates []);
endpoint!(SET_PROFILE_VALUE, "set_profile_value", Put, "casinos/{casino_id}/profile/{field_id}", Some("casino_id"),
    provides [], invalidates [scoped(ProfileValue), scoped(History)]);
endpoint!(LIST_PROFILE_CONTEXTS, "list_profile_contexts", Get, "profile-contexts", None, provides [every(ProfileContext)], invalidates []);
endpoint!(CREATE_PROFILE_CONTEXT, "create_profile_context", Post, "profile-contexts", None, provides [], invalidates [every(ProfileContext)]);
endpoint!(UPDATE_PROFILE_CONTEXT, "update_profile_context", Put, "profile-contexts/{id}", None, provides [], invalidates [every(ProfileContext)]);
endpoint!(DELETE_PROFILE_CONTEXT, "delete_profile_context", Delete, "profile-contexts/{id}", None,
    provides [], invalidates [every(ProfileContext), every(ProfileSetting)]);
endpoint!(GET_PROFILE_SETTINGS, "get_profile_settings", Get, "casinos/{casino_id}/profile-settings", Some("casino_id"),
    provides [scoped(ProfileSetting)], invalidates []);
endpoint!(UPDATE_PROFILE_SETTINGS, "update_profile_settings", Patch, "casinos/{casino_id}/profile-settings", Some("casino_id"),
    provides [], invalidates [scoped(ProfileSetting), scoped(History)]);

// Bonuses
endpoint!(LIST_BONUSES, "list_bonuses", Get, "casinos/{casino_id}/bonuses", Some("casino_id"), provides [scoped(Bonus)], invalidates []);
endpoint!(CREATE_BONUS, "create_bonus", Post, "casinos/{casino_id}/bonuses", Some("casino_id"),
    provides [], invalidates [scoped(Bonus), scoped(History)]);
endpoint!(UPDATE_BONUS, "update_bonus", Put, "bonuses/{id}", None, provides [], invalidates [every(Bonus), every(History)]);
endpoint!(DELETE_BONUS, "delete_bonus", Delete, "bonuses/{id}", None,
    provides [], invalidates [every(Bonus), every(BonusImage), every(History)]);
endpoint!(LIST_BONUS_IMAGES, "list_bonus_images", Get, "bonuses/{id}/images", Some("id"), provides [scoped(BonusImage)], invalidates []);
endpoint!(DELETE_BONUS_IMAGE, "delete_bonus_image", Delete, "bonus-images/{id}", None, provides [], invalidates [every(BonusImage)]);

// Payments
endpoint!(LIST_PAYMENTS, "list_payments", Get, "casinos/{casino_id}/payments", Some("casino_id"), provides [scoped(Payment)], invalidates []);
endpoint!(CREATE_PAYMENT, "create_payment", Post, "casinos/{casino_id}/payments", Some("casino_id"),
    provides [], invalidates [scoped(Payment), scoped(History)]);
endpoint!(UPDATE_PAYMENT, "update_payment", Put, "payments/{id}", None, provides [], invalidates [every(Payment), every(History)]);
endpoint!(DELETE_PAYMENT, "delete_payment", Delete, "payments/{id}", None,
    provides [], invalidates [every(Payment), every(PaymentImage), every(History)]);
endpoint!(LIST_PAYMENT_IMAGES, "list_payment_images", Get, "payments/{id}/images", Some("id"), provides [scoped(PaymentImage)], invalidates []);
endpoint!(DELETE_PAYMENT_IMAGE, "delete_payment_image", Delete, "payment-images/{id}", None, provides [], invalidates [every(PaymentImage)]);

// Promos
endpoint!(LIST_PROMOS, "list_promos", Get, "casinos/{casino_id}/promos", Some("casino_id"), provides [scoped(Promo)], invalidates []);
endpoint!(CREATE_PROMO, "create_promo", Post, "casinos/{casino_id}/promos", Some("casino_id"),
    provides [], invalidates [scoped(Promo), scoped(History)]);
endpoint!(UPDATE_PROMO, "update_promo", Put, "promos/{id}", None, provides [], invalidates [every(Promo), every(History)]);
endpoint!(DELETE_PROMO, "delete_promo", Delete, "promos/{id}", None, provides [], invalidates [every(Promo), every(History)]);

// Test accounts and their transactions
endpoint!(LIST_ACCOUNTS, "list_accounts", Get, "casinos/{casino_id}/accounts", Some("casino_id"), provides [scoped(Account)], invalidates []);
endpoint!(CREATE_ACCOUNT, "create_account", Post, "casinos/{casino_id}/accounts", Some("casino_id"),
    provides [], invalidates [scoped(Account), scoped(History)]);
endpoint!(UPDATE_ACCOUNT, "update_account", Put, "accounts/{id}", None, provides [], invalidates [every(Account), every(History)]);
endpoint!(DELETE_ACCOUNT, "delete_account", Delete, "accounts/{id}", None,
    provides [], invalidates [every(Account), every(AccountTransaction), every(History)]);
endpoint!(LIST_ACCOUNT_TRANSACTIONS, "list_account_transactions", Get, "accounts/{account_id}/transactions", Some("account_id"),
    provides [scoped(AccountTransaction)], invalidates []);
endpoint!(CREATE_ACCOUNT_TRANSACTION, "create_account_transaction", Post, "accounts/{account_id}/transactions", Some("account_id"),
    provides [], invalidates [scoped(AccountTransaction), every(Account)]);
endpoint!(DELETE_ACCOUNT_TRANSACTION, "delete_account_transaction", Delete, "account-transactions/{id}", None,
    provides [], invalidates [every(AccountTransaction), every(Account)]);

// Emails
endpoint!(LIST_EMAILS, "list_emails", Get, "emails", None, provides [every(Email)], invalidates []);
endpoint!(GET_EMAIL, "get_email", Get, "emails/{id}", Some("id"), provides [scoped(Email)], invalidates []);
endpoint!(UPDATE_EMAIL, "update_email", Patch, "emails/{id}", Some("id"), provides [], invalidates [scoped(Email)]);
endpoint!(LIST_EMAIL_RECIPIENTS, "list_email_recipients", Get, "email-recipients", None, provides [every(EmailRecipient)], invalidates []);

// Comments and tags
endpoint!(LIST_COMMENTS, "list_comments", Get, "casinos/{casino_id}/comments", Some("casino_id"), provides [scoped(Comment)], invalidates []);
endpoint!(CREATE_COMMENT, "create_comment", Post, "casinos/{casino_id}/comments", Some("casino_id"),
    provides [], invalidates [scoped(Comment), scoped(History)]);
endpoint!(UPDATE_COMMENT, "update_comment", Put, "comments/{id}", None, provides [], invalidates [every(Comment), every(History)]);
endpoint!(DELETE_COMMENT, "delete_comment", Delete, "comments/{id}", None, provides [], invalidates [every(Comment), every(History)]);
endpoint!(LIST_TAGS, "list_tags", Get, "tags", None, provides [every(Tag)], invalidates []);
endpoint!(CREATE_TAG, "create_tag", Post, "tags", None, provides [], invalidates [every(Tag)]);
endpoint!(DELETE_TAG, "delete_tag", Delete, "tags/{id}", None, provides [], invalidates [every(Tag), every(Comment)]);
endpoint!(ATTACH_TAG, "attach_tag", Post, "comments/{id}/tags/{tag_id}", None, provides [], invalidates [every(Comment)]);
endpoint!(DETACH_TAG, "detach_tag", Delete, "comments/{id}/tags/{tag_id}", None, provides [], invalidates [every(Comment)]);

// History
endpoint!(LIST_HISTORY, "list_history", Get, "casinos/{casino_id}/history", Some("casino_id"), provides [scoped(History)], invalidates []);

#[cfg(test)]
mod tests {
    use super::*;
    use super::TagKind::*;

    #[test]
    fn test_render_path() {
        let path = SET_PROFILE_VALUE
            .render_path(&[("casino_id", "7".to_string()), ("field_id", "3".to_string())])
            .unwrap();
        assert_eq!(path, "casinos/7/profile/3");
    }

    #[test]
    fn test_unbound_parameter_rejected() {
        assert!(GET_CASINO.render_path(&[]).is_err());
    }

    #[test]
    fn test_scoped_tags_take_the_tag_param() {
        let params = [("casino_id", "7".to_string())];
        assert_eq!(LIST_BONUSES.provided_tags(&params), vec![CacheTag::item(Bonus, 7)]);
        assert_eq!(
            CREATE_BONUS.invalidated_tags(&params),
            vec![CacheTag::item(Bonus, 7), CacheTag::item(History, 7)]
        );
        assert_eq!(
            UPDATE_BONUS.invalidated_tags(&[("id", "99".to_string())]),
            vec![CacheTag::list(Bonus), CacheTag::list(History)]
        );
    }

    #[test]
    fn test_comment_mutations_invalidate_history() {
        let by_id = [("id", "3".to_string())];
        for endpoint in [&UPDATE_COMMENT, &DELETE_COMMENT] {
            assert!(endpoint.invalidated_tags(&by_id).contains(&CacheTag::list(History)));
        }
        let by_casino = [("casino_id", "7".to_string())];
        assert!(CREATE_COMMENT.invalidated_tags(&by_casino).contains(&CacheTag::item(History, 7)));
    }

    #[test]
    fn test_tag_matching() {
        let list = CacheTag::list(Casino);
        let item = CacheTag::item(Casino, 5);
        let other = CacheTag::item(Casino, 6);

        // kind-wide invalidation drops everything of that kind
        assert!(list.matches(&item));
        assert!(list.matches(&list));
        // item invalidation drops that item and the lists
        assert!(item.matches(&item));
        assert!(item.matches(&list));
        assert!(!item.matches(&other));
        assert!(!CacheTag::list(Bonus).matches(&item));
    }

    #[test]
    fn test_queries_and_mutations() {
        assert!(LIST_CASINOS.is_query());
        assert!(!UPDATE_PROFILE_SETTINGS.is_query());
        assert_eq!(UPDATE_PROFILE_SETTINGS.verb.method(), Method::PATCH);
    }
}
