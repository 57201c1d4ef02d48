pub mod simcompanies;

pub use simcompanies::{SimCompaniesClient, DEFAULT_API_BASE};
