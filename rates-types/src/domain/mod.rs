//! Domain models for the rate service.

pub mod rate;
pub mod subscriber;

pub use rate::RateObservation;
pub use subscriber::{Subscriber, SubscriberEmail};
