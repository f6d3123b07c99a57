//! In-memory snapshot of one casino, the export input

use crate::common::types::*;
use std::collections::{BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct ExportSnapshot {
    pub casino: Casino,
    /// Every profile field with the casino's value for it, if set
    pub profile: Vec<(ProfileField, Option<ProfileValue>)>,
    pub bonuses: Vec<Bonus>,
    pub payments: Vec<Payment>,
    pub promos: Vec<Promo>,
    pub setting_fields: Vec<ProfileField>,
    pub setting_contexts: Vec<ProfileContext>,
    pub settings: Vec<ProfileSetting>,
    pub emails: Vec<Email>,
    pub comments: Vec<Comment>,
    /// GEO codes in scope, one settings matrix each
    pub geos: Vec<String>,
    pub recipients: Vec<String>,
    pub bonus_images: HashMap<i64, Vec<String>>,
    pub payment_images: HashMap<i64, Vec<String>>,
}

impl ExportSnapshot {
    /// Snapshot with no related records
    pub fn new(casino: Casino) -> Self {
        Self {
            casino,
            profile: Vec::new(),
            bonuses: Vec::new(),
            payments: Vec::new(),
            promos: Vec::new(),
            setting_fields: Vec::new(),
            setting_contexts: Vec::new(),
            settings: Vec::new(),
            emails: Vec::new(),
            comments: Vec::new(),
            geos: Vec::new(),
            recipients: Vec::new(),
            bonus_images: HashMap::new(),
            payment_images: HashMap::new(),
        }
    }

    /// Distinct bonus GEOs, sorted
    pub fn bonus_geos(&self) -> Vec<String> {
        distinct(self.bonuses.iter().map(|b| b.geo.as_str()))
    }

    /// Distinct payment GEOs, sorted
    pub fn payment_geos(&self) -> Vec<String> {
        distinct(self.payments.iter().map(|p| p.geo.as_str()))
    }

    /// Setting value for one matrix cell, unset cells are `false`
    pub fn setting(&self, geo: &str, field_id: i64, context_id: i64) -> bool {
        self.settings
            .iter()
            .any(|s| s.geo == geo && s.field_id == field_id && s.context_id == context_id && s.value)
    }

    /// Every image referenced by bonuses, payments and comments, each URL once
    /// in first-seen order
    pub fn image_urls(&self) -> Vec<String> {
        let bonus_urls = self
            .bonuses
            .iter()
            .flat_map(|b| self.bonus_images.get(&b.id).into_iter().flatten());
        let payment_urls = self
            .payments
            .iter()
            .flat_map(|p| self.payment_images.get(&p.id).into_iter().flatten());
        let comment_urls = self.comments.iter().flat_map(|c| c.images.iter());

        let mut seen = HashSet::new();
        bonus_urls
            .chain(payment_urls)
            .chain(comment_urls)
            .filter(|url| !url.trim().is_empty() && seen.insert(url.to_string()))
            .cloned()
            .collect()
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn casino() -> Casino {
        Casino {
            id: 7,
            name: "Lucky Star".to_string(),
            website: Some("https://luckystar.example".to_string()),
            owner: None,
            status: Some("active".to_string()),
            geos: vec!["DE".to_string()],
            created_at: None,
            updated_at: None,
        }
    }

    pub fn bonus(id: i64, geo: &str) -> Bonus {
        Bonus {
            id,
            casino_id: 7,
            name: format!("Bonus {}", id),
            geo: geo.to_string(),
            kind: BonusKind::Deposit,
            bonus_type: BonusType::Cash,
            category: BonusCategory::Casino,
            min_deposit: Some(20.0),
            max_bonus: Some(500.0),
            max_cashout: None,
            wager: Some(35.0),
            currency: Some("EUR".to_string()),
            freespins: None,
            valid_days: Some(7),
            promo_code: None,
            notes: None,
        }
    }

    pub fn payment(id: i64, geo: &str, direction: PaymentDirection) -> Payment {
        Payment {
            id,
            casino_id: 7,
            geo: geo.to_string(),
            direction,
            method: "Visa".to_string(),
            min_amount: Some(10.0),
            max_amount: Some(5000.0),
            currency: Some("EUR".to_string()),
            fee: None,
            processing_time: Some("instant".to_string()),
            notes: None,
        }
    }
}
