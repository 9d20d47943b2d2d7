//! Infrastructure layer: stores, delivery channels, background processors.

pub mod aggregator;
pub mod clock;
pub mod delivery;
pub mod events;
pub mod scheduler;
pub mod seed;
pub mod stats;
pub mod stores;
