//! Low-level readers shared by the ingestion formats
pub(crate) mod text;
pub(crate) mod xml;
pub(crate) mod zip;
