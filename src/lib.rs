//! tg-sheets: date-ranged Telegram chat export into Google Sheets, with
//! Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
