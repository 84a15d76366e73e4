//! Low-level readers for Office Open XML packages
pub(crate) mod xml;
pub(crate) mod zip;
