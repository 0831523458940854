//! SOICO CTA Render - HTML widgets for affiliate records.
//!
//! Five widgets (conclusion box, inline CTA, single button, comparison
//! table, subtle banner) are available for each record family. The widget
//! functions in [`widgets`] are pure; [`CtaRenderer`] wires them to the
//! record stores, settings and link resolver.
//!
//! # Architecture
//!
//! - **Blocks** ([`blocks`]): block names and camelCase attribute bags
//! - **Widgets** ([`widgets`]): markup for resolved records
//! - **Text** ([`text`]): override, record value, fallback resolution
//! - **Copy** ([`copy`]): per-family fixed text
//! - **Styles** ([`styles`]): CSS custom properties from design settings
//! - **Renderer** ([`renderer`]): service container and block dispatch
//!
//! # Example
//!
//! ```ignore
//! use soico_render::CtaRenderer;
//!
//! let renderer = CtaRenderer::from_config(&db, &transients, links, &config);
//! let html = renderer
//!     .render_block("soico-cta/comparison-table", &serde_json::json!({ "limit": 5 }))
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod blocks;
pub mod copy;
pub mod error;
pub mod renderer;
pub mod styles;
pub mod text;
pub mod widgets;

// Re-export commonly used types
pub use blocks::{
    BlockName, ComparisonTableAttrs, ConclusionBoxAttrs, InlineCtaAttrs, SingleButtonAttrs,
    SubtleBannerAttrs, Widget, BLOCK_NAMESPACE,
};
pub use error::{RenderError, Result};
pub use renderer::CtaRenderer;
pub use styles::css_variables;
pub use text::display_value;
pub use widgets::WidgetContext;
