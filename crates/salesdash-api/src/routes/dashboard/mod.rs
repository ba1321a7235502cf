//! Dashboard routes - page, chart image and JSON API

pub mod api;
pub mod page;

pub use api::{api_options, api_summary, chart_svg};
pub use page::{page_dashboard, render_app};
