//! pprof profile model, builder and wire encoder.
//!
//! This module handles:
//! - The in-memory profile (samples, locations, functions, strings)
//! - Concurrent symbol interning while the profile is built
//! - Encoding to `profile.proto` bytes

pub mod builder;
pub mod encoder;
pub mod model;

// Re-export main types
pub use builder::ProfileBuilder;
pub use encoder::ProtoWriter;
pub use model::{Function, Line, Location, Profile, Sample, ValueType};
