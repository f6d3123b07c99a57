//! Snapshot assembly from the backend
//!
//! Every read goes through the query cache, so exporting right after
//! browsing the same casino costs no extra round-trips.

use super::snapshot::ExportSnapshot;
use crate::api::errors::ApiError;
use crate::api::resources::BackofficeApi;
use crate::common::types::{EmailFilter, ImageAttachment};
use futures::future::try_join_all;
use std::collections::{BTreeSet, HashMap};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct SnapshotOptions {
    /// Restrict bonuses, payments and settings to these GEO codes
    pub geos: Option<Vec<String>>,
}

impl SnapshotOptions {
    pub fn with_geos<I, S>(geos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let geos: Vec<String> = geos
            .into_iter()
            .map(|g| g.as_ref().trim().to_ascii_uppercase())
            .filter(|g| !g.is_empty())
            .collect();
        Self {
            geos: (!geos.is_empty()).then_some(geos),
        }
    }

    fn allows(&self, geo: &str) -> bool {
        match &self.geos {
            Some(geos) => geos.iter().any(|g| g.eq_ignore_ascii_case(geo)),
            None => true,
        }
    }
}

fn image_urls(images: Vec<ImageAttachment>) -> Vec<String> {
    images.into_iter().map(|i| i.url).collect()
}

/// Fetch everything the report shows for one casino
pub async fn load_snapshot(
    api: &BackofficeApi,
    casino_id: i64,
    options: &SnapshotOptions,
) -> Result<ExportSnapshot, ApiError> {
    let email_filter = EmailFilter {
        casino_id: Some(casino_id),
        ..Default::default()
    };

    let (casino, mut fields, values, bonuses, payments, promos, mut contexts, settings, emails, comments) = tokio::try_join!(
        api.get_casino(casino_id),
        api.list_profile_fields(),
        api.get_profile_values(casino_id),
        api.list_bonuses(casino_id),
        api.list_payments(casino_id),
        api.list_promos(casino_id),
        api.list_profile_contexts(),
        api.get_profile_settings(casino_id),
        api.list_emails(&email_filter),
        api.list_comments(casino_id),
    )?;

    fields.sort_by_key(|f| (f.sort_order, f.id));
    contexts.sort_by_key(|c| (c.sort_order, c.id));

    let bonuses: Vec<_> = bonuses.into_iter().filter(|b| options.allows(&b.geo)).collect();
    let payments: Vec<_> = payments.into_iter().filter(|p| options.allows(&p.geo)).collect();
    let settings: Vec<_> = settings.into_iter().filter(|s| options.allows(&s.geo)).collect();

    let (bonus_images, payment_images) = tokio::try_join!(
        try_join_all(bonuses.iter().map(|b| async move {
            Ok::<_, ApiError>((b.id, image_urls(api.list_bonus_images(b.id).await?)))
        })),
        try_join_all(payments.iter().map(|p| async move {
            Ok::<_, ApiError>((p.id, image_urls(api.list_payment_images(p.id).await?)))
        })),
    )?;

    let geos: BTreeSet<String> = casino
        .geos
        .iter()
        .chain(bonuses.iter().map(|b| &b.geo))
        .chain(payments.iter().map(|p| &p.geo))
        .chain(settings.iter().map(|s| &s.geo))
        .map(|g| g.trim())
        .filter(|g| !g.is_empty() && options.allows(g))
        .map(str::to_string)
        .collect();

    let recipients: BTreeSet<String> = emails.iter().map(|e| e.recipient.clone()).collect();

    let profile = fields
        .iter()
        .map(|field| {
            let value = values.iter().find(|v| v.field_id == field.id).cloned();
            (field.clone(), value)
        })
        .collect();

    info!(
        "Loaded snapshot of '{}': {} bonuses, {} payments, {} emails, {} comments",
        casino.name,
        bonuses.len(),
        payments.len(),
        emails.len(),
        comments.len()
    );

    Ok(ExportSnapshot {
        casino,
        profile,
        bonuses,
        payments,
        promos,
        setting_fields: fields,
        setting_contexts: contexts,
        settings,
        emails,
        comments,
        geos: geos.into_iter().collect(),
        recipients: recipients.into_iter().collect(),
        bonus_images: bonus_images.into_iter().collect::<HashMap<_, _>>(),
        payment_images: payment_images.into_iter().collect::<HashMap<_, _>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_options() {
        let options = SnapshotOptions::with_geos(["de", " ", "PL "]);
        assert_eq!(options.geos, Some(vec!["DE".to_string(), "PL".to_string()]));
        assert!(options.allows("DE"));
        assert!(options.allows("pl"));
        assert!(!options.allows("RU"));

        assert!(SnapshotOptions::with_geos(Vec::<String>::new()).geos.is_none());
        assert!(SnapshotOptions::default().allows("RU"));
    }
}
