//! Google Sheets adapters: REST sink, registry reader, URL locator parsing.

pub mod client;
pub mod locator;
pub mod registry;

pub use client::SheetsApiSink;
pub use registry::SheetRegistry;
