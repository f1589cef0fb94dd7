//! Service layer for the scraper.
//!
//! This module contains the remote-facing pieces:
//! - Translation requests (`Translator`, `HttpTranslator`)
//! - Response fragment extraction (`FragmentExtractor`)

pub mod extract;
mod translator;

pub use extract::FragmentExtractor;
pub use translator::{HttpTranslator, Translator};
