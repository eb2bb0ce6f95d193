pub mod career;
pub mod garage;
pub mod profile;
