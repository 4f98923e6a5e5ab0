//! WhatsApp messaging library: credential resolution, Twilio gateway client,
//! response normalization, and the tool service used by the CLI.

pub mod config;
pub mod credentials;
pub mod envelope;
pub mod error;
pub mod init;
pub mod mapping;
pub mod normalize;
pub mod service;
pub mod tools;
pub mod twilio;
