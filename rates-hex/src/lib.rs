//! # Rates Hex
//!
//! Application core and adapters for the USD/UAH rate service.
//!
//! ## Architecture
//!
//! - `cache` - Rate freshness and single-flight refresh
//! - `notifier` - Emails the refreshed rate to every subscriber
//! - `scheduler` - Cron-driven broadcasts
//! - `service` - Facade used by the HTTP handlers
//! - `inbound/` - HTTP adapter (Axum server)
//! - `outbound/` - SMTP mailer (lettre)
//!
//! Everything is generic over the port traits in `rates-types`, so storage,
//! upstream and mail transport can be swapped for in-memory doubles.

pub mod cache;
pub mod inbound;
pub mod notifier;
pub mod openapi;
pub mod outbound;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod test_support;

pub use cache::{RateCache, RateCacheConfig};
pub use notifier::{BroadcastReport, DeliveryFailure, Notifier};
pub use scheduler::BroadcastScheduler;
pub use service::ExchangeService;
