//! Route modules for the dashboard server
//!
//! - access: password form
//! - upload: multipart file upload
//! - dashboard: page rendering, chart image and JSON endpoints
//!
//! The dashboard module follows the usual layout:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON and SVG endpoints
//! - page.rs: HTMX page rendering

pub mod access;
pub mod dashboard;
pub mod upload;
