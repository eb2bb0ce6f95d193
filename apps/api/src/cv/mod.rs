//! The CV as published: which sections show, how records are ordered and
//! which certificates go with them.

pub mod assemble;
pub mod certificates;
pub mod grouping;
pub mod repository;
pub mod visibility;

pub use assemble::{assemble, CvDocument};
pub use certificates::{
    catalogue, stored_certificates, CertificateEntry, CertificateKind, CertificateSelection,
};
pub use visibility::{Section, SectionSet};
