//! sheetwise_engine - Typed tables and spreadsheet-style queries.

pub mod engine;
