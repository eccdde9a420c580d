#![deny(unsafe_code)]

/// Headless core of the banking chat overlay.
///
/// The overlay is a floating chat panel over a host page: a session controller
/// that submits prompts to a response generator, shows a cycling loading
/// placeholder while one is pending, and is reset whenever the overlay closes.
pub mod app;
/// Chat session, messages and background job contracts.
pub mod chat;
/// Settings persistence and overlay presets.
pub mod settings;
