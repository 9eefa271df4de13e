//! Telegram adapters: grammers-based gateway, session storage, login flow.

pub mod auth;
pub mod client;
pub mod mapper;
pub mod session;

pub use client::GrammersChatGateway;
