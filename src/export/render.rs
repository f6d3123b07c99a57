//! HTML assembly
//!
//! The whole document is built into one `String`. Every user-supplied value
//! goes through [`escape_html`] (directly or via the `fmt_*` helpers) except
//! email bodies and comment texts, which are already HTML.

use super::assets::{SCRIPT, STYLE};
use super::escape::escape_html;
use super::format::{fmt, fmt_amount, fmt_date, fmt_text, PLACEHOLDER};
use super::snapshot::ExportSnapshot;
use crate::common::types::{Bonus, Payment, PaymentDirection};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::{self, Write};

struct Report<'a> {
    snapshot: &'a ExportSnapshot,
    /// Remote URL → embedded `data:` URI
    images: &'a HashMap<String, String>,
}

pub fn render_document(
    snapshot: &ExportSnapshot,
    images: &HashMap<String, String>,
    generated_at: DateTime<Utc>,
) -> Result<String, fmt::Error> {
    let report = Report { snapshot, images };
    let mut out = String::with_capacity(64 * 1024);

    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">")?;
    writeln!(out, "<title>{} profile</title>", escape_html(&snapshot.casino.name))?;
    writeln!(out, "<style>{}</style>", STYLE)?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;

    report.header(&mut out, generated_at)?;
    writeln!(out, "<main>")?;
    report.profile(&mut out)?;
    report.bonuses(&mut out)?;
    report.payments(&mut out)?;
    report.promos(&mut out)?;
    report.settings(&mut out)?;
    report.emails(&mut out)?;
    report.comments(&mut out)?;
    writeln!(out, "</main>")?;
    modal(&mut out)?;

    writeln!(out, "<script>{}</script>", SCRIPT)?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}

fn filter_bar(out: &mut String, id: &str, with_all: bool, values: &[(String, String)]) -> fmt::Result {
    write!(out, "<div class=\"filter-bar\" id=\"{}\">", id)?;
    if with_all {
        write!(out, "<button type=\"button\" class=\"active\" data-value=\"\">All</button>")?;
    }
    let options = values.iter().filter(|(value, _)| !value.is_empty());
    for (i, (value, label)) in options.enumerate() {
        let active = if !with_all && i == 0 { " class=\"active\"" } else { "" };
        write!(
            out,
            "<button type=\"button\"{} data-value=\"{}\">{}</button>",
            active,
            escape_html(value),
            escape_html(label)
        )?;
    }
    writeln!(out, "</div>")
}

fn value_options(geos: &[String]) -> Vec<(String, String)> {
    geos.iter().map(|g| (g.clone(), g.clone())).collect()
}

fn detail_row(out: &mut String, label: &str, value: &str) -> fmt::Result {
    write!(out, "<tr><th>{}</th><td>{}</td></tr>", label, value)
}

fn modal(out: &mut String) -> fmt::Result {
    writeln!(
        out,
        "<div class=\"modal hidden\" id=\"detail-modal\"><div class=\"modal-dialog\">\
         <button type=\"button\" class=\"modal-close\">&times;</button>\
         <div id=\"modal-body\"></div></div></div>"
    )
}

impl Report<'_> {
    fn image_src<'u>(&'u self, url: &'u str) -> &'u str {
        self.images.get(url).map(String::as_str).unwrap_or(url)
    }

    fn gallery(&self, out: &mut String, urls: Option<&Vec<String>>) -> fmt::Result {
        for url in urls.into_iter().flatten() {
            write!(out, "<img src=\"{}\" alt=\"\" loading=\"lazy\">", escape_html(self.image_src(url)))?;
        }
        Ok(())
    }

    fn header(&self, out: &mut String, generated_at: DateTime<Utc>) -> fmt::Result {
        let casino = &self.snapshot.casino;
        writeln!(out, "<header>")?;
        writeln!(out, "<h1>{}</h1>", escape_html(&casino.name))?;

        let website = match casino.website.as_deref().map(str::trim).filter(|w| !w.is_empty()) {
            Some(url) => {
                let url = escape_html(url);
                format!("<a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>", url, url)
            }
            None => PLACEHOLDER.to_string(),
        };
        let geos = if casino.geos.is_empty() {
            PLACEHOLDER.to_string()
        } else {
            escape_html(&casino.geos.join(", "))
        };
        writeln!(
            out,
            "<div class=\"meta\">Website: {} &middot; Status: {} &middot; Owner: {} &middot; GEO: {} &middot; Exported {}</div>",
            website,
            fmt_text(casino.status.as_deref()),
            fmt_text(casino.owner.as_deref()),
            geos,
            generated_at.format("%Y-%m-%d %H:%M UTC")
        )?;
        writeln!(out, "</header>")
    }

    fn profile(&self, out: &mut String) -> fmt::Result {
        writeln!(out, "<section id=\"profile\"><h2>Profile</h2>")?;
        if self.snapshot.profile.is_empty() {
            writeln!(out, "<p class=\"empty\">No profile fields</p>")?;
        } else {
            writeln!(out, "<table class=\"profile-table\"><tbody>")?;
            for (field, value) in &self.snapshot.profile {
                let value = value.as_ref().and_then(|v| v.value.as_deref());
                writeln!(
                    out,
                    "<tr><th>{}</th><td>{}</td></tr>",
                    escape_html(&field.label),
                    fmt_text(value)
                )?;
            }
            writeln!(out, "</tbody></table>")?;
        }
        writeln!(out, "</section>")
    }

    fn bonuses(&self, out: &mut String) -> fmt::Result {
        let bonuses = &self.snapshot.bonuses;
        writeln!(out, "<section id=\"bonuses\"><h2>Bonuses ({})</h2>", bonuses.len())?;
        if bonuses.is_empty() {
            writeln!(out, "<p class=\"empty\">No bonuses</p>")?;
            return writeln!(out, "</section>");
        }

        filter_bar(out, "bonus-geo-filter", true, &value_options(&self.snapshot.bonus_geos()))?;
        writeln!(
            out,
            "<table class=\"bonus-table\"><thead><tr><th>Name</th><th>GEO</th><th>Kind</th><th>Type</th>\
             <th>Category</th><th>Min deposit</th><th>Max bonus</th><th>Wager</th><th>Freespins</th><th></th></tr></thead><tbody>"
        )?;
        for bonus in bonuses {
            let currency = bonus.currency.as_deref();
            writeln!(
                out,
                "<tr class=\"bonus-row\" data-geo=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><button type=\"button\" class=\"details-btn\" data-target=\"bonus-detail-{}\">Details</button></td></tr>",
                escape_html(&bonus.geo),
                escape_html(&bonus.name),
                escape_html(&bonus.geo),
                bonus.kind,
                bonus.bonus_type,
                bonus.category,
                fmt_amount(bonus.min_deposit, currency),
                fmt_amount(bonus.max_bonus, currency),
                bonus.wager.map(|w| format!("x{}", fmt(w))).unwrap_or_else(|| PLACEHOLDER.to_string()),
                bonus.freespins.map(|f| f.to_string()).unwrap_or_else(|| PLACEHOLDER.to_string()),
                bonus.id
            )?;
        }
        writeln!(out, "</tbody></table>")?;

        for bonus in bonuses {
            self.bonus_detail(out, bonus)?;
        }
        writeln!(out, "</section>")
    }

    fn bonus_detail(&self, out: &mut String, bonus: &Bonus) -> fmt::Result {
        let currency = bonus.currency.as_deref();
        write!(out, "<div class=\"detail-content\" id=\"bonus-detail-{}\">", bonus.id)?;
        write!(out, "<h3>{}</h3><table><tbody>", escape_html(&bonus.name))?;
        detail_row(out, "GEO", &escape_html(&bonus.geo))?;
        detail_row(out, "Kind", &bonus.kind.to_string())?;
        detail_row(out, "Type", &bonus.bonus_type.to_string())?;
        detail_row(out, "Category", &bonus.category.to_string())?;
        detail_row(out, "Min deposit", &fmt_amount(bonus.min_deposit, currency))?;
        detail_row(out, "Max bonus", &fmt_amount(bonus.max_bonus, currency))?;
        detail_row(out, "Max cashout", &fmt_amount(bonus.max_cashout, currency))?;
        detail_row(
            out,
            "Wager",
            &bonus.wager.map(|w| format!("x{}", fmt(w))).unwrap_or_else(|| PLACEHOLDER.to_string()),
        )?;
        detail_row(
            out,
            "Freespins",
            &bonus.freespins.map(|f| f.to_string()).unwrap_or_else(|| PLACEHOLDER.to_string()),
        )?;
        detail_row(
            out,
            "Valid for",
            &bonus.valid_days.map(|d| format!("{} days", d)).unwrap_or_else(|| PLACEHOLDER.to_string()),
        )?;
        detail_row(out, "Promo code", &fmt_text(bonus.promo_code.as_deref()))?;
        detail_row(out, "Notes", &fmt_text(bonus.notes.as_deref()))?;
        write!(out, "</tbody></table>")?;
        self.gallery(out, self.snapshot.bonus_images.get(&bonus.id))?;
        writeln!(out, "</div>")
    }

    fn payments(&self, out: &mut String) -> fmt::Result {
        let payments = &self.snapshot.payments;
        writeln!(out, "<section id=\"payments\"><h2>Payments ({})</h2>", payments.len())?;
        if payments.is_empty() {
            writeln!(out, "<p class=\"empty\">No payment methods</p>")?;
            return writeln!(out, "</section>");
        }

        filter_bar(out, "payment-geo-filter", true, &value_options(&self.snapshot.payment_geos()))?;
        let directions: Vec<(String, String)> = [PaymentDirection::Deposit, PaymentDirection::Withdrawal]
            .iter()
            .map(|d| (d.as_str().to_string(), d.to_string()))
            .collect();
        filter_bar(out, "payment-direction-filter", true, &directions)?;

        writeln!(
            out,
            "<table class=\"payment-table\"><thead><tr><th>Method</th><th>GEO</th><th>Direction</th>\
             <th>Min</th><th>Max</th><th>Fee</th><th>Processing</th><th></th></tr></thead><tbody>"
        )?;
        for payment in payments {
            let currency = payment.currency.as_deref();
            writeln!(
                out,
                "<tr class=\"payment-row\" data-geo=\"{}\" data-direction=\"{}\"><td>{}</td><td>{}</td><td>{}</td>\
                 <td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
                 <td><button type=\"button\" class=\"details-btn\" data-target=\"payment-detail-{}\">Details</button></td></tr>",
                escape_html(&payment.geo),
                payment.direction.as_str(),
                escape_html(&payment.method),
                escape_html(&payment.geo),
                payment.direction,
                fmt_amount(payment.min_amount, currency),
                fmt_amount(payment.max_amount, currency),
                fmt_text(payment.fee.as_deref()),
                fmt_text(payment.processing_time.as_deref()),
                payment.id
            )?;
        }
        writeln!(out, "</tbody></table>")?;

        for payment in payments {
            self.payment_detail(out, payment)?;
        }
        writeln!(out, "</section>")
    }

    fn payment_detail(&self, out: &mut String, payment: &Payment) -> fmt::Result {
        let currency = payment.currency.as_deref();
        write!(out, "<div class=\"detail-content\" id=\"payment-detail-{}\">", payment.id)?;
        write!(
            out,
            "<h3>{} &middot; {}</h3><table><tbody>",
            escape_html(&payment.method),
            payment.direction
        )?;
        detail_row(out, "GEO", &escape_html(&payment.geo))?;
        detail_row(out, "Min amount", &fmt_amount(payment.min_amount, currency))?;
        detail_row(out, "Max amount", &fmt_amount(payment.max_amount, currency))?;
        detail_row(out, "Fee", &fmt_text(payment.fee.as_deref()))?;
        detail_row(out, "Processing time", &fmt_text(payment.processing_time.as_deref()))?;
        detail_row(out, "Notes", &fmt_text(payment.notes.as_deref()))?;
        write!(out, "</tbody></table>")?;
        self.gallery(out, self.snapshot.payment_images.get(&payment.id))?;
        writeln!(out, "</div>")
    }

    fn promos(&self, out: &mut String) -> fmt::Result {
        let promos = &self.snapshot.promos;
        writeln!(out, "<section id=\"promos\"><h2>Promotions ({})</h2>", promos.len())?;
        if promos.is_empty() {
            writeln!(out, "<p class=\"empty\">No promotions</p>")?;
            return writeln!(out, "</section>");
        }

        writeln!(
            out,
            "<table class=\"promo-table\"><thead><tr><th>Title</th><th>GEO</th><th>Type</th><th>Starts</th>\
             <th>Ends</th><th>Link</th><th>Description</th></tr></thead><tbody>"
        )?;
        for promo in promos {
            let link = match promo.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
                Some(url) => format!("<a href=\"{}\" target=\"_blank\" rel=\"noopener\">open</a>", escape_html(url)),
                None => PLACEHOLDER.to_string(),
            };
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape_html(&promo.title),
                fmt_text(promo.geo.as_deref()),
                fmt_text(promo.promo_type.as_deref()),
                fmt_date(promo.starts_at),
                fmt_date(promo.ends_at),
                link,
                fmt_text(promo.description.as_deref())
            )?;
        }
        writeln!(out, "</tbody></table>")?;
        writeln!(out, "</section>")
    }

    fn settings(&self, out: &mut String) -> fmt::Result {
        let snapshot = self.snapshot;
        writeln!(out, "<section id=\"settings\"><h2>Profile settings</h2>")?;
        if snapshot.geos.is_empty() || snapshot.setting_fields.is_empty() || snapshot.setting_contexts.is_empty() {
            writeln!(out, "<p class=\"empty\">No settings</p>")?;
            return writeln!(out, "</section>");
        }

        filter_bar(out, "settings-geo-switch", false, &value_options(&snapshot.geos))?;
        for (i, geo) in snapshot.geos.iter().enumerate() {
            let hidden = if i == 0 { "" } else { " hidden" };
            write!(
                out,
                "<table class=\"settings-matrix{}\" data-geo=\"{}\"><thead><tr><th>Field</th>",
                hidden,
                escape_html(geo)
            )?;
            for context in &snapshot.setting_contexts {
                write!(out, "<th>{}</th>", escape_html(&context.name))?;
            }
            write!(out, "</tr></thead><tbody>")?;
            for field in &snapshot.setting_fields {
                write!(out, "<tr><th>{}</th>", escape_html(&field.label))?;
                for context in &snapshot.setting_contexts {
                    if snapshot.setting(geo, field.id, context.id) {
                        write!(out, "<td class=\"on\">&#10003;</td>")?;
                    } else {
                        write!(out, "<td class=\"off\">&#10007;</td>")?;
                    }
                }
                write!(out, "</tr>")?;
            }
            writeln!(out, "</tbody></table>")?;
        }
        writeln!(out, "</section>")
    }

    fn emails(&self, out: &mut String) -> fmt::Result {
        let emails = &self.snapshot.emails;
        writeln!(out, "<section id=\"emails\"><h2>Emails ({})</h2>", emails.len())?;
        if emails.is_empty() {
            writeln!(out, "<p class=\"empty\">No emails</p>")?;
            return writeln!(out, "</section>");
        }

        if !self.snapshot.recipients.is_empty() {
            filter_bar(out, "email-recipient-filter", true, &value_options(&self.snapshot.recipients))?;
        }
        for email in emails {
            writeln!(
                out,
                "<div class=\"email-item\" data-recipient=\"{}\"><div class=\"email-head\">\
                 <div><div class=\"subject\">{}</div><div class=\"from\">{} &rarr; {}</div></div>\
                 <div class=\"from\">{}</div></div>\
                 <div class=\"email-body hidden\">{}</div></div>",
                escape_html(&email.recipient),
                fmt_text(email.subject.as_deref()),
                escape_html(&email.sender),
                escape_html(&email.recipient),
                fmt_date(email.received_at),
                email.body_html.as_deref().unwrap_or_default()
            )?;
        }
        writeln!(out, "</section>")
    }

    fn comments(&self, out: &mut String) -> fmt::Result {
        let comments = &self.snapshot.comments;
        writeln!(out, "<section id=\"comments\"><h2>Comments ({})</h2>", comments.len())?;
        if comments.is_empty() {
            writeln!(out, "<p class=\"empty\">No comments</p>")?;
            return writeln!(out, "</section>");
        }

        for comment in comments {
            write!(
                out,
                "<div class=\"comment\"><div class=\"meta\">{} &middot; {} ",
                fmt_text(comment.author.as_deref()),
                fmt_date(comment.created_at)
            )?;
            for tag in &comment.tags {
                write!(out, "<span class=\"tag\">{}</span>", escape_html(&tag.name))?;
            }
            write!(out, "</div><div class=\"comment-text\">{}</div>", comment.text_html)?;
            self.gallery(out, Some(&comment.images))?;
            writeln!(out, "</div>")?;
        }
        writeln!(out, "</section>")
    }
}
