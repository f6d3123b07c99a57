//! Back-office records mirrored from the backend
//!
//! Invariants (unique keys, required fields) are enforced by the backend.
//! The `New*` payloads only check what a form would reject before sending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::errors::ApiError;

/// Casino profile root record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Casino {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub geos: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// User-defined profile attribute
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileField {
    pub id: i64,
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileValue {
    pub id: i64,
    pub casino_id: i64,
    pub field_id: i64,
    #[serde(default)]
    pub value: Option<String>,
}

/// Operational context, a column of the settings matrix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileContext {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

/// One cell of the per-GEO boolean settings matrix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProfileSetting {
    #[serde(default)]
    pub id: i64,
    pub casino_id: i64,
    pub field_id: i64,
    pub context_id: i64,
    pub geo: String,
    pub value: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    Deposit,
    NoDeposit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BonusType {
    Cash,
    Freespin,
    Combo,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BonusCategory {
    Casino,
    Sport,
}

impl fmt::Display for BonusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusKind::Deposit => write!(f, "Deposit"),
            BonusKind::NoDeposit => write!(f, "No deposit"),
        }
    }
}

impl fmt::Display for BonusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusType::Cash => write!(f, "Cash"),
            BonusType::Freespin => write!(f, "Freespin"),
            BonusType::Combo => write!(f, "Cash + freespin"),
        }
    }
}

impl fmt::Display for BonusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusCategory::Casino => write!(f, "Casino"),
            BonusCategory::Sport => write!(f, "Sport"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bonus {
    pub id: i64,
    pub casino_id: i64,
    pub name: String,
    pub geo: String,
    pub kind: BonusKind,
    pub bonus_type: BonusType,
    pub category: BonusCategory,
    #[serde(default)]
    pub min_deposit: Option<f64>,
    #[serde(default)]
    pub max_bonus: Option<f64>,
    #[serde(default)]
    pub max_cashout: Option<f64>,
    #[serde(default)]
    pub wager: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub freespins: Option<u32>,
    #[serde(default)]
    pub valid_days: Option<u32>,
    #[serde(default)]
    pub promo_code: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    Deposit,
    Withdrawal,
}

impl PaymentDirection {
    /// Value used in `data-direction` attributes and query strings
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentDirection::Deposit => "deposit",
            PaymentDirection::Withdrawal => "withdrawal",
        }
    }
}

impl fmt::Display for PaymentDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentDirection::Deposit => write!(f, "Deposit"),
            PaymentDirection::Withdrawal => write!(f, "Withdrawal"),
        }
    }
}

impl std::str::FromStr for PaymentDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deposit" => Ok(PaymentDirection::Deposit),
            "withdrawal" | "withdraw" => Ok(PaymentDirection::Withdrawal),
            other => Err(format!("unknown payment direction '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: i64,
    pub casino_id: i64,
    pub geo: String,
    pub direction: PaymentDirection,
    pub method: String,
    #[serde(default)]
    pub min_amount: Option<f64>,
    #[serde(default)]
    pub max_amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub fee: Option<String>,
    #[serde(default)]
    pub processing_time: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Promo {
    pub id: i64,
    pub casino_id: i64,
    pub title: String,
    #[serde(default)]
    pub geo: Option<String>,
    #[serde(default)]
    pub promo_type: Option<String>,
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Test account registered at a casino
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: i64,
    pub casino_id: i64,
    pub geo: String,
    pub login: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub balance: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountTransaction {
    pub id: i64,
    pub account_id: i64,
    pub direction: PaymentDirection,
    pub amount: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Inbound correspondence, body is already HTML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Email {
    pub id: i64,
    #[serde(default)]
    pub casino_id: Option<i64>,
    pub sender: String,
    pub recipient: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_read: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Tagged comment on a casino, text is already HTML
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub casino_id: i64,
    #[serde(default)]
    pub author: Option<String>,
    pub text_html: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: i64,
    pub casino_id: i64,
    #[serde(default)]
    pub author: Option<String>,
    pub action: String,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Screenshot attached to a bonus or payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageAttachment {
    pub id: i64,
    pub owner_id: i64,
    pub url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::required(field));
    }
    Ok(())
}

/// Create/update payload for [`Casino`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCasino {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub geos: Vec<String>,
}

impl NewCasino {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)?;
        for geo in &self.geos {
            require("geos", geo)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfileField {
    pub key: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    pub sort_order: i32,
}

impl NewProfileField {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("key", &self.key)?;
        require("label", &self.label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfileContext {
    pub name: String,
    pub sort_order: i32,
}

impl NewProfileContext {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)
    }
}

/// Single cell change sent with `PATCH casinos/{id}/profile-settings`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingChange {
    pub field_id: i64,
    pub context_id: i64,
    pub geo: String,
    pub value: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBonus {
    pub name: String,
    pub geo: String,
    pub kind: BonusKind,
    pub bonus_type: BonusType,
    pub category: BonusCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_deposit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bonus: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_cashout: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub freespins: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewBonus {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)?;
        require("geo", &self.geo)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub geo: String,
    pub direction: PaymentDirection,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewPayment {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("geo", &self.geo)?;
        require("method", &self.method)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPromo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NewPromo {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("title", &self.title)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAccount {
    pub geo: String,
    pub login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("geo", &self.geo)?;
        require("login", &self.login)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccountTransaction {
    pub direction: PaymentDirection,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl NewAccountTransaction {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ApiError::invalid_field("amount", "Amount must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewComment {
    pub text_html: String,
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

impl NewComment {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("text_html", &self.text_html)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl NewTag {
    pub fn validate(&self) -> Result<(), ApiError> {
        require("name", &self.name)
    }
}

/// Partial update sent with `PATCH emails/{id}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_read: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub casino_id: Option<i64>,
}

/// Filter for `GET emails`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EmailFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub casino_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unread: Option<bool>,
}
