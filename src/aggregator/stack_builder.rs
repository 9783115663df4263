//! Rebuild call stacks from one thread's interval events.
//!
//! Trace events are flat intervals; nesting is implied by time
//! containment. Walking the events in start order with a stack of open
//! frames gives every event its ancestry in O(n) amortized time.
//!
//! Example: `forward [0, 100)` and `aten::mm [10, 40)` on one thread
//! produce the stacks `forward` and `forward;aten::mm`.
//!
//! Intervals are assumed to be properly nested. A frame that only
//! partially overlaps a later event is not its ancestor and is dropped
//! from the open stack.

use crate::parser::TraceEvent;
use std::fmt;

/// One level of a call stack
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackFrame {
    pub name: String,
    pub category: String,
}

impl StackFrame {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
        }
    }

    fn of(event: &TraceEvent) -> Self {
        Self::new(event.name.as_str(), event.cat.as_str())
    }
}

/// A reconstructed stack for a single event
///
/// **Public** - sent from thread workers to the aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSample {
    /// Ancestors first, the event itself last
    pub frames: Vec<StackFrame>,

    /// The event's own duration
    pub duration_ns: i64,
}

impl StackSample {
    pub fn leaf(&self) -> Option<&StackFrame> {
        self.frames.last()
    }
}

impl fmt::Display for StackSample {
    /// "parent;child duration_ns", as logged per sample at trace level
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.frames.iter().map(|fr| fr.name.as_str()).collect();
        write!(f, "{} {}", names.join(";"), self.duration_ns)
    }
}

/// An event that has started and may still contain later events
struct OpenFrame {
    end: f64,
    frame: StackFrame,
}

/// Reconstruct the call stack of every event on one thread
///
/// **Public** - called once per thread by the converter
///
/// # Arguments
/// * `events` - One thread's convertible events, sorted by start time
/// * `emit` - Receives one `StackSample` per event, in input order
///
/// # Algorithm
/// 1. Pop open frames that ended before this event starts
/// 2. Keep only frames that end at or after this event ends
/// 3. The kept frames plus this event form its stack
/// 4. Push this event as the new innermost open frame
pub fn reconstruct_stacks(events: &[TraceEvent], mut emit: impl FnMut(StackSample)) {
    let mut open: Vec<OpenFrame> = Vec::new();

    for event in events {
        let end = event.end();

        while open.last().is_some_and(|top| top.end < event.ts) {
            open.pop();
        }
        open.retain(|f| f.end >= end);

        let mut frames: Vec<StackFrame> = Vec::with_capacity(open.len() + 1);
        frames.extend(open.iter().map(|f| f.frame.clone()));
        frames.push(StackFrame::of(event));

        open.push(OpenFrame {
            end,
            frame: StackFrame::of(event),
        });

        emit(StackSample {
            frames,
            duration_ns: event.duration_ns(),
        });
    }
}

/// Stable sort by start time; ties keep their input order
pub fn sort_by_start(events: &mut [TraceEvent]) {
    events.sort_by(|a, b| a.ts.total_cmp(&b.ts));
}
