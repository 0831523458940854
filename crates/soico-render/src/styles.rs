//! CSS custom properties derived from design settings.

use soico_records::{DesignSettings, RecordFamily};

fn variable_prefix(family: RecordFamily) -> &'static str {
    match family {
        RecordFamily::Securities => "--soico-cta",
        RecordFamily::CardLoan => "--soico-cta-cardloan",
    }
}

fn gradient(family: RecordFamily) -> (&'static str, &'static str) {
    match family {
        RecordFamily::Securities => ("#E8F4FC", "#F0F8FF"),
        RecordFamily::CardLoan => ("#E8F8F0", "#F0FFF8"),
    }
}

/// The `:root` block exposing a family's design settings to the stylesheet.
#[must_use]
pub fn css_variables(family: RecordFamily, design: &DesignSettings) -> String {
    let prefix = variable_prefix(family);
    let (start, end) = gradient(family);
    format!(
        ":root {{\n    {prefix}-primary: {primary};\n    {prefix}-secondary: {secondary};\n    {prefix}-border-radius: {radius}px;\n    {prefix}-gradient-start: {start};\n    {prefix}-gradient-end: {end};\n}}\n",
        primary = design.primary_color.as_str(),
        secondary = design.secondary_color.as_str(),
        radius = design.border_radius,
    )
}
