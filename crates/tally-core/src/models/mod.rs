//! Data models for extracted documents and extraction results.

pub mod config;
pub mod draft;
pub mod receipt;
pub mod result;
