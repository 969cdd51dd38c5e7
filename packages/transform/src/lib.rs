#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Pure transformation core for the event map pipeline.
//!
//! Two stages, both free of I/O and deterministic:
//!
//! - [`scale`] rescales the dataset's attendance counts into the marker
//!   radius range via min-max normalization.
//! - [`animation`] turns each plotted event into a timestamp-ordered
//!   sequence of growing-circle features for playback.

pub mod animation;
pub mod scale;

pub use animation::{
    AnimationConfig, AnimationFeature, ZeroStepsError, build_dataset, build_growth_sequence,
};
pub use scale::{ScaleError, scale_to_range};
