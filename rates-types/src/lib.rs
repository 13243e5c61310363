//! # Rates Types
//!
//! Domain types and port traits for the USD/UAH rate service.
//! This crate has ZERO external IO dependencies - only data structures,
//! validation rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (RateObservation, Subscriber, SubscriberEmail)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Error taxonomy shared by every layer

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{RateObservation, Subscriber, SubscriberEmail};
pub use dto::*;
pub use error::{
    AppError, BroadcastError, DomainError, MailError, RateError, RepoError, SourceError,
};
pub use ports::{Mailer, RateSource, RateStore, Repository, SubscriptionStore};
