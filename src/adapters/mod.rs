// Adapters layer: concrete implementations for external systems (backend API, session storage, files, Crossref).

pub mod api;
pub mod crossref;
pub mod file_source;
pub mod session;
