//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod mail;
mod rate;
mod subscription;

pub use mail::Mailer;
pub use rate::{RateSource, RateStore};
pub use subscription::SubscriptionStore;

/// Everything the application needs from persistence.
///
/// A single adapter usually backs both stores, so the service layer takes one
/// `R: Repository` instead of two type parameters.
pub trait Repository: RateStore + SubscriptionStore {}

impl<T: RateStore + SubscriptionStore> Repository for T {}
