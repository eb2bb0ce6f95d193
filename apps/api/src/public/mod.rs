//! The public site: CV pages, PDF downloads and blob proxies.

pub mod downloads;
pub mod pages;
pub mod proxies;
pub mod responses;
