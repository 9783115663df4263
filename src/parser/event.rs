//! Trace event model.
//!
//! PyTorch's profiler writes Chrome Trace Event JSON. Only "complete"
//! events (`ph == "X"`) with a positive duration take part in conversion.

use crate::utils::config::{COMPLETE_PHASE, NANOS_PER_MICRO};
use serde::{Deserialize, Serialize};

/// Top-level trace document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceData {
    #[serde(rename = "traceEvents", default)]
    pub trace_events: Vec<TraceEvent>,
}

/// A single event in the trace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Phase code ("X" = complete, "B"/"E" = begin/end, "i" = instant, ...)
    #[serde(default)]
    pub ph: String,

    /// Category, stored as the pprof "filename" of the function
    #[serde(default)]
    pub cat: String,

    #[serde(default)]
    pub name: String,

    /// Thread identifier; profilers emit integers or strings here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<ThreadId>,

    /// Start timestamp in microseconds
    #[serde(default)]
    pub ts: f64,

    /// Duration in microseconds
    #[serde(default)]
    pub dur: f64,
}

impl TraceEvent {
    /// Create a complete ("X") event
    ///
    /// **Public** - convenience constructor, mostly for tests and tools
    pub fn complete(
        name: impl Into<String>,
        cat: impl Into<String>,
        tid: impl Into<ThreadId>,
        ts: f64,
        dur: f64,
    ) -> Self {
        Self {
            ph: COMPLETE_PHASE.to_string(),
            cat: cat.into(),
            name: name.into(),
            tid: Some(tid.into()),
            ts,
            dur,
        }
    }

    /// Whether this event is a complete event
    pub fn is_complete(&self) -> bool {
        self.ph == COMPLETE_PHASE
    }

    /// Whether this event takes part in profile conversion
    ///
    /// Only complete events with a strictly positive duration qualify.
    pub fn is_convertible(&self) -> bool {
        self.is_complete() && self.dur > 0.0
    }

    /// End timestamp in microseconds
    pub fn end(&self) -> f64 {
        self.ts + self.dur
    }

    /// Duration in nanoseconds, truncated toward zero
    pub fn duration_ns(&self) -> i64 {
        (self.dur * NANOS_PER_MICRO) as i64
    }

    /// Normalized 64-bit thread key
    pub fn thread_key(&self) -> i64 {
        self.tid.as_ref().map_or(0, ThreadId::key)
    }
}

/// Heterogeneous thread identifier as it appears in trace JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThreadId {
    Int(i64),
    Float(f64),
    Name(String),
    Other(serde_json::Value),
}

impl ThreadId {
    /// Resolve the identifier to the key events are grouped by
    ///
    /// Strings use a base-31 rolling hash over code points, so distinct
    /// names can collide. Unrecognized shapes map to 0.
    pub fn key(&self) -> i64 {
        match self {
            ThreadId::Int(v) => *v,
            ThreadId::Float(v) => *v as i64,
            ThreadId::Name(s) => s
                .chars()
                .fold(0i64, |h, c| h.wrapping_mul(31).wrapping_add(c as i64)),
            ThreadId::Other(_) => 0,
        }
    }
}

impl From<i64> for ThreadId {
    fn from(v: i64) -> Self {
        ThreadId::Int(v)
    }
}

impl From<i32> for ThreadId {
    fn from(v: i32) -> Self {
        ThreadId::Int(i64::from(v))
    }
}

impl From<f64> for ThreadId {
    fn from(v: f64) -> Self {
        ThreadId::Float(v)
    }
}

impl From<&str> for ThreadId {
    fn from(v: &str) -> Self {
        ThreadId::Name(v.to_string())
    }
}

impl From<String> for ThreadId {
    fn from(v: String) -> Self {
        ThreadId::Name(v)
    }
}
