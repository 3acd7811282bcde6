//! Thumbnail scoring engine.
//!
//! Four pure component scorers (text, visual, faces, composition) combined
//! into an overall score, each normalized against corpus findings produced
//! by the offline trainer. Scoring is deterministic and side-effect free;
//! shared model snapshots are replaced by atomic pointer swap so in-flight
//! calls never observe a partial reload.

pub mod error;
pub mod store;
pub mod weighted;

mod composition;
mod face;
mod score;
mod text;
mod visual;

pub use error::{EngineError, EngineResult};
pub use score::score;
pub use store::{common_color_ranges, ModelSnapshot, ModelStore, COMMON_RANGE_MIN_SHARE};
pub use weighted::{clamp_round, normalize_around_average, weighted_average};
