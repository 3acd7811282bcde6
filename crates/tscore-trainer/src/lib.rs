//! Offline corpus trainer.
//!
//! This crate provides:
//! - Popularity sampling of candidate videos per content category
//! - Thumbnail download and vision-signal extraction
//! - Statistics aggregation and the engagement-quartile split
//! - Weight/threshold derivation into a scoring model
//! - Atomic artifact writing for the scoring engine to consume

pub mod artifacts;
pub mod clients;
pub mod config;
pub mod error;
pub mod extraction;
pub mod model_builder;
pub mod pipeline;
pub mod quartiles;
pub mod sampling;
pub mod stats;

pub use config::TrainerConfig;
pub use error::{TrainerError, TrainerResult};
pub use extraction::ThumbnailObservation;
pub use pipeline::TrainingSummary;
