//! # Innkeep Notify
//!
//! Implementations of the [`Notifier`](innkeep_core::Notifier) gateway:
//! Twilio WhatsApp delivery for production, a no-op for deployments where
//! the handoff channel is not configured.

pub mod whatsapp;

pub use whatsapp::{NoopNotifier, WhatsAppNotifier};
