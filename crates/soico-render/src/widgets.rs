//! The five widget renderers.
//!
//! Each function maps already-resolved records and an attribute bag to an
//! HTML fragment. A record without a usable affiliate URL never produces a
//! link: the widget renders nothing, or a diagnostic comment in debug mode.

use crate::{
    blocks::{
        ComparisonTableAttrs, ConclusionBoxAttrs, InlineCtaAttrs, SingleButtonAttrs,
        SubtleBannerAttrs, Widget,
    },
    copy::{copy_for, FamilyCopy},
    text::{diagnostic, display_value, fill, present},
};
use chrono::{Datelike, NaiveDate};
use soico_core::{
    html::{escape_html, escape_url},
    sanitize::sanitize_key,
};
use soico_records::{LoanTerms, RecordFamily, ResolvedRecord, TrackingSettings};

const LINK_ATTRS: &str = r#"target="_blank" rel="noopener noreferrer sponsored""#;
const BADGE_COLOR: &str = "#E53935";
const TABLE_BUTTON_COLOR: &str = "#666666";
const EMPTY_CELL: &str = "-";

/// Everything a widget needs besides its records and attributes.
#[derive(Debug, Clone, Copy)]
pub struct WidgetContext<'a> {
    /// Family being rendered
    pub family: RecordFamily,
    /// Tracking settings of that family
    pub tracking: &'a TrackingSettings,
    /// Emit diagnostic comments for skipped widgets
    pub debug: bool,
    /// Date printed in the comparison table footer
    pub today: NaiveDate,
}

impl WidgetContext<'_> {
    fn copy(&self) -> &'static FamilyCopy {
        copy_for(self.family)
    }

    fn tracking_attrs(&self, record: &ResolvedRecord, widget: Widget) -> String {
        self.tracking.attributes(record.slug().as_str(), widget.cta_type())
    }

    fn skip(&self, widget: Widget, record: &ResolvedRecord) -> String {
        diagnostic(
            self.debug,
            &format!("No affiliate_url for {}: {}", widget.cta_type(), record.slug()),
        )
    }

    fn button_color<'r>(&self, record: &'r ResolvedRecord) -> &'r str {
        record
            .record
            .button_color
            .as_ref()
            .map_or(self.family.primary_color(), |c| c.as_str())
    }
}

/// Escaped `href` for a record, or `None` when it cannot be linked.
#[must_use]
pub fn href(record: &ResolvedRecord) -> Option<String> {
    record
        .affiliate_url
        .as_deref()
        .map(escape_url)
        .filter(|h| !h.is_empty())
}

/// Headline box with optional feature list and a primary button.
#[must_use]
pub fn conclusion_box(
    ctx: &WidgetContext<'_>,
    record: &ResolvedRecord,
    attrs: &ConclusionBoxAttrs,
) -> String {
    let Some(href) = href(record) else {
        return ctx.skip(Widget::ConclusionBox, record);
    };
    let copy = ctx.copy();
    let name = &record.record.name;

    let title = match present(Some(attrs.custom_title.as_str())) {
        Some(custom) => escape_html(custom).into_owned(),
        None => fill(copy.conclusion_title, &escape_html(name)),
    };
    let button = display_value(
        Some(attrs.button_text.as_str()),
        Some(record.record.button_text.as_str()),
        || fill(copy.conclusion_button, name),
    );

    let mut html = format!(
        "<div class=\"soico-cta-conclusion-box{}\">\n\
         <div class=\"soico-cta-conclusion-header\">\n\
         <span class=\"soico-cta-conclusion-label\">結論</span>\n\
         <h3 class=\"soico-cta-conclusion-title\">{title}</h3>\n\
         </div>\n",
        copy.modifier_class
    );

    if attrs.show_features && !record.record.features.is_empty() {
        html.push_str("<ul class=\"soico-cta-conclusion-features\">\n");
        for feature in &record.record.features {
            html.push_str(&format!("<li>{}</li>\n", escape_html(feature)));
        }
        html.push_str("</ul>\n");
    }

    if let Some(terms) = &record.record.loan_terms {
        html.push_str(&loan_terms_list(terms));
    }

    html.push_str(&format!(
        "<div class=\"soico-cta-conclusion-action\">\n\
         <a href=\"{href}\" class=\"soico-cta-button soico-cta-button-primary\" style=\"background-color: {color}\" {LINK_ATTRS}{tracking}>{button}</a>\n\
         <p class=\"soico-cta-conclusion-note\">{note}</p>\n\
         </div>\n\
         </div>\n",
        color = ctx.button_color(record),
        tracking = ctx.tracking_attrs(record, Widget::ConclusionBox),
        button = escape_html(&button),
        note = copy.conclusion_note,
    ));
    html
}

fn loan_terms_list(terms: &LoanTerms) -> String {
    let items: Vec<String> = [
        ("金利", &terms.interest_rate),
        ("限度額", &terms.limit_amount),
        ("審査時間", &terms.review_time),
    ]
    .into_iter()
    .filter(|(_, value)| !value.is_empty())
    .map(|(label, value)| format!("<dt>{label}</dt><dd>{}</dd>\n", escape_html(value)))
    .collect();

    if items.is_empty() {
        return String::new();
    }
    format!("<dl class=\"soico-cta-loan-terms\">\n{}</dl>\n", items.concat())
}

/// One-line name, first feature and a small button.
#[must_use]
pub fn inline_cta(ctx: &WidgetContext<'_>, record: &ResolvedRecord, attrs: &InlineCtaAttrs) -> String {
    let Some(href) = href(record) else {
        return ctx.skip(Widget::InlineCta, record);
    };
    let copy = ctx.copy();

    let style = match sanitize_key(&attrs.style) {
        s if s.is_empty() => "default".to_string(),
        s => s,
    };
    let button = display_value(
        Some(attrs.button_text.as_str()),
        Some(record.record.button_text.as_str()),
        || copy.inline_button.to_string(),
    );
    let feature = record
        .record
        .features
        .first()
        .map(|f| format!("<span class=\"soico-cta-inline-feature\">{}</span>\n", escape_html(f)))
        .unwrap_or_default();

    format!(
        "<div class=\"soico-cta-inline soico-cta-inline-{style}{modifier}\">\n\
         <div class=\"soico-cta-inline-content\">\n\
         <strong class=\"soico-cta-inline-name\">{name}</strong>\n\
         {feature}\
         </div>\n\
         <a href=\"{href}\" class=\"soico-cta-inline-button\" style=\"background-color: {color}\" {LINK_ATTRS}{tracking}>{button}</a>\n\
         </div>\n",
        modifier = copy.modifier_class,
        name = escape_html(&record.record.name),
        color = ctx.button_color(record),
        tracking = ctx.tracking_attrs(record, Widget::InlineCta),
        button = escape_html(&button),
    )
}

/// A lone button with an optional PR label.
#[must_use]
pub fn single_button(
    ctx: &WidgetContext<'_>,
    record: &ResolvedRecord,
    attrs: &SingleButtonAttrs,
) -> String {
    let Some(href) = href(record) else {
        return ctx.skip(Widget::SingleButton, record);
    };
    let copy = ctx.copy();
    let button = display_value(
        Some(attrs.button_text.as_str()),
        Some(record.record.button_text.as_str()),
        || fill(copy.single_button, &record.record.name),
    );
    let pr = if attrs.show_pr {
        "<p class=\"soico-cta-pr-label\">PR</p>\n"
    } else {
        ""
    };

    format!(
        "<div class=\"soico-cta-single-button-wrapper{modifier}\">\n\
         <a href=\"{href}\" class=\"soico-cta-button soico-cta-button-primary\" style=\"background-color: {color}\" {LINK_ATTRS}{tracking}>{button}</a>\n\
         {pr}\
         </div>\n",
        modifier = copy.modifier_class,
        color = ctx.button_color(record),
        tracking = ctx.tracking_attrs(record, Widget::SingleButton),
        button = escape_html(&button),
    )
}

fn rank_class(rank: usize) -> Option<&'static str> {
    match rank {
        1 => Some("soico-cta-rank-gold"),
        2 => Some("soico-cta-rank-silver"),
        3 => Some("soico-cta-rank-bronze"),
        _ => None,
    }
}

fn cell(value: &str) -> std::borrow::Cow<'_, str> {
    escape_html(present(Some(value)).unwrap_or(EMPTY_CELL))
}

struct Column {
    class: &'static str,
    heading: &'static str,
    value: fn(&ResolvedRecord) -> String,
}

fn columns(family: RecordFamily, attrs: &ComparisonTableAttrs) -> Vec<Column> {
    fn features(r: &ResolvedRecord) -> String {
        let shown: Vec<&str> = r.record.features.iter().take(2).map(String::as_str).collect();
        escape_html(&shown.join(" / ")).into_owned()
    }
    fn commission(r: &ResolvedRecord) -> String {
        format!(
            "<span class=\"soico-cta-commission\">{}</span>",
            cell(&r.record.commission)
        )
    }
    fn term(r: &ResolvedRecord, pick: fn(&LoanTerms) -> &str) -> String {
        cell(r.record.loan_terms.as_ref().map_or("", pick)).into_owned()
    }

    let mut columns = Vec::new();
    match family {
        RecordFamily::Securities => {
            columns.push(Column {
                class: "soico-cta-col-features",
                heading: "特徴",
                value: features,
            });
            if attrs.show_commission {
                columns.push(Column {
                    class: "soico-cta-col-commission",
                    heading: "手数料",
                    value: commission,
                });
            }
        }
        RecordFamily::CardLoan => {
            if attrs.show_interest_rate {
                columns.push(Column {
                    class: "soico-cta-col-interest-rate",
                    heading: "金利",
                    value: |r| term(r, |t| t.interest_rate.as_str()),
                });
            }
            if attrs.show_limit_amount {
                columns.push(Column {
                    class: "soico-cta-col-limit-amount",
                    heading: "限度額",
                    value: |r| term(r, |t| t.limit_amount.as_str()),
                });
            }
            if attrs.show_review_time {
                columns.push(Column {
                    class: "soico-cta-col-review-time",
                    heading: "審査時間",
                    value: |r| term(r, |t| t.review_time.as_str()),
                });
            }
        }
    }
    columns
}

/// Ranked table of the given records.
///
/// `records` should be the family's enabled records in priority order.
/// Unusable records and records outside `companies` are dropped before
/// ranking; at most `limit` rows are shown.
#[must_use]
pub fn comparison_table(
    ctx: &WidgetContext<'_>,
    records: &[ResolvedRecord],
    attrs: &ComparisonTableAttrs,
) -> String {
    let wanted: Vec<String> = attrs.companies.iter().map(|c| sanitize_key(c)).collect();
    let limit = if attrs.limit == 0 { usize::MAX } else { attrs.limit };

    let rows: Vec<(&ResolvedRecord, String)> = records
        .iter()
        .filter(|r| wanted.is_empty() || wanted.iter().any(|w| w == r.slug().as_str()))
        .filter_map(|r| href(r).map(|h| (r, h)))
        .take(limit)
        .collect();

    if rows.is_empty() {
        return diagnostic(
            ctx.debug,
            &format!("No enabled records found for {}", Widget::ComparisonTable.cta_type()),
        );
    }

    let copy = ctx.copy();
    let columns = columns(ctx.family, attrs);

    let mut html = format!(
        "<div class=\"soico-cta-comparison-wrapper{}\">\n\
         <table class=\"soico-cta-comparison-table\">\n\
         <thead>\n<tr>\n\
         <th class=\"soico-cta-col-rank\">順位</th>\n\
         <th class=\"soico-cta-col-name\">{}</th>\n",
        copy.modifier_class, copy.name_heading
    );
    for column in &columns {
        html.push_str(&format!("<th class=\"{}\">{}</th>\n", column.class, column.heading));
    }
    html.push_str(&format!(
        "<th class=\"soico-cta-col-action\">{}</th>\n</tr>\n</thead>\n<tbody>\n",
        copy.action_heading
    ));

    for (rank, (record, href)) in (1..).zip(&rows) {
        html.push_str(&table_row(ctx, rank, record, href, &columns));
    }

    html.push_str(&format!(
        "</tbody>\n</table>\n<p class=\"soico-cta-table-note\">PR | 情報は{}年{}月時点</p>\n</div>\n",
        ctx.today.year(),
        ctx.today.month()
    ));
    html
}

fn table_row(
    ctx: &WidgetContext<'_>,
    rank: usize,
    record: &ResolvedRecord,
    href: &str,
    columns: &[Column],
) -> String {
    let copy = ctx.copy();
    let rank_label = if rank == 1 { copy.top_action } else { copy.other_action };
    let label = display_value(None, Some(record.record.button_text.as_str()), || {
        rank_label.to_string()
    });
    let row_class = if rank == 1 {
        " class=\"soico-cta-row-highlight\""
    } else {
        ""
    };
    let rank_classes = rank_class(rank).map_or_else(
        || "soico-cta-rank".to_string(),
        |c| format!("soico-cta-rank {c}"),
    );

    let badge = present(Some(record.record.badge.as_str()))
        .map(|badge| {
            format!(
                "\n<span class=\"soico-cta-badge\" style=\"background-color: {}\">{}</span>",
                record.record.badge_color.as_ref().map_or(BADGE_COLOR, |c| c.as_str()),
                escape_html(badge)
            )
        })
        .unwrap_or_default();

    let mut html = format!(
        "<tr{row_class}>\n\
         <td class=\"soico-cta-col-rank\"><span class=\"{rank_classes}\">{rank}</span></td>\n\
         <td class=\"soico-cta-col-name\"><strong>{name}</strong>{badge}</td>\n",
        name = escape_html(&record.record.name),
    );
    for column in columns {
        html.push_str(&format!(
            "<td class=\"{}\">{}</td>\n",
            column.class,
            (column.value)(record)
        ));
    }
    html.push_str(&format!(
        "<td class=\"soico-cta-col-action\"><a href=\"{href}\" class=\"soico-cta-table-button\" style=\"background-color: {color}\" {LINK_ATTRS}{tracking}>{label}</a></td>\n</tr>\n",
        color = record
            .record
            .button_color
            .as_ref()
            .map_or(TABLE_BUTTON_COLOR, |c| c.as_str()),
        tracking = ctx.tracking_attrs(record, Widget::ComparisonTable),
        label = escape_html(&label),
    ));
    html
}

/// A sentence whose mention of the record name becomes the link.
#[must_use]
pub fn subtle_banner(
    ctx: &WidgetContext<'_>,
    record: &ResolvedRecord,
    attrs: &SubtleBannerAttrs,
) -> String {
    let Some(href) = href(record) else {
        return ctx.skip(Widget::SubtleBanner, record);
    };
    let copy = ctx.copy();
    let name = &record.record.name;

    let message = display_value(Some(attrs.message.as_str()), None, || fill(copy.banner_message, name));
    let body = if name.is_empty() {
        escape_html(&message).into_owned()
    } else {
        let anchor = format!(
            "<a href=\"{href}\" {LINK_ATTRS}{tracking}>{name}</a>",
            name = escape_html(name),
            tracking = ctx.tracking_attrs(record, Widget::SubtleBanner),
        );
        message
            .split(name.as_str())
            .map(|piece| escape_html(piece).into_owned())
            .collect::<Vec<_>>()
            .join(&anchor)
    };

    format!(
        "<div class=\"soico-cta-subtle-banner{}\">\n\
         <span class=\"soico-cta-subtle-message\">{body}</span>\n\
         <span class=\"soico-cta-subtle-pr\">PR</span>\n\
         </div>\n",
        copy.modifier_class
    )
}
