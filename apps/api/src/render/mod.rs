//! Server-rendered HTML for the public site.

pub mod cv_page;
pub mod html;
pub mod pages;

pub use cv_page::{render_cv_page, CvStyle};
