//! Parallel trace-to-profile conversion.
//!
//! Each thread's events are independent, so every thread gets its own
//! reconstruction task on a fixed worker pool. Tasks push samples into
//! one bounded channel; the calling thread is the single consumer and
//! merges identical stacks.

use super::stack_builder::{reconstruct_stacks, sort_by_start, StackFrame, StackSample};
use crate::parser::{TraceData, TraceEvent};
use crate::profile::{Profile, ProfileBuilder, Sample};
use crate::utils::config::{PERIOD_NANOS, PERIOD_TYPE, SAMPLE_CHANNEL_CAPACITY, SAMPLE_TYPES};
use crate::utils::error::ConvertError;
use log::{debug, info, trace, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, SyncSender};
use std::sync::Arc;
use std::thread;
use workerpool::thunk::{Thunk, ThunkWorker};
use workerpool::Pool;

/// Options for trace conversion
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Size of the worker pool (0 is treated as 1)
    pub num_workers: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            num_workers: thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl ConvertOptions {
    pub fn with_workers(num_workers: usize) -> Self {
        Self { num_workers }
    }
}

/// Running totals for one distinct stack
struct AggregatedStack {
    /// Leaf first
    location_ids: Vec<u64>,
    count: i64,
    time_ns: i64,
}

/// Merges samples whose full stacks are identical
///
/// **Public** - the single consumer of worker output
///
/// Only the aggregator touches its map, so it needs no locking.
pub struct StackAggregator {
    stacks: HashMap<Vec<StackFrame>, AggregatedStack>,
}

impl StackAggregator {
    pub fn new() -> Self {
        Self {
            stacks: HashMap::new(),
        }
    }

    /// Add one sample
    ///
    /// The first occurrence of a stack resolves its locations root first and
    /// stores them leaf first; repeats only add to the counters, saturating
    /// at `i64::MAX`.
    pub fn add(&mut self, sample: StackSample, builder: &ProfileBuilder) {
        if let Some(existing) = self.stacks.get_mut(&sample.frames) {
            existing.count = existing.count.saturating_add(1);
            existing.time_ns = existing.time_ns.saturating_add(sample.duration_ns);
            return;
        }

        let mut location_ids: Vec<u64> = sample
            .frames
            .iter()
            .map(|f| builder.intern_location(&f.name, &f.category))
            .collect();
        location_ids.reverse();

        self.stacks.insert(
            sample.frames,
            AggregatedStack {
                location_ids,
                count: 1,
                time_ns: sample.duration_ns,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// Final pprof samples, in no particular order
    pub fn into_samples(self) -> Vec<Sample> {
        self.stacks
            .into_values()
            .map(|s| Sample {
                location_id: s.location_ids,
                value: vec![s.count, s.time_ns],
            })
            .collect()
    }
}

impl Default for StackAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep convertible events and group them by normalized thread key
///
/// **Public** - first step of conversion
///
/// Each group is sorted by start time (stable).
pub fn group_by_thread(events: &[TraceEvent]) -> BTreeMap<i64, Vec<TraceEvent>> {
    let mut threads: BTreeMap<i64, Vec<TraceEvent>> = BTreeMap::new();

    for event in events.iter().filter(|e| e.is_convertible()) {
        threads
            .entry(event.thread_key())
            .or_default()
            .push(event.clone());
    }

    for events in threads.values_mut() {
        sort_by_start(events);
    }

    threads
}

/// Convert trace events into a pprof profile
///
/// **Public** - main entry point for conversion
///
/// # Arguments
/// * `trace` - Parsed trace; non-complete and zero-duration events are skipped
/// * `options` - Worker pool size
///
/// # Returns
/// The assembled profile with one sample per distinct stack
///
/// # Errors
/// * `ConvertError::IncompleteConversion` - A worker stopped before emitting
///   all of its samples
pub fn convert_trace(trace: &TraceData, options: &ConvertOptions) -> Result<Profile, ConvertError> {
    let threads = group_by_thread(&trace.trace_events);
    let expected: u64 = threads.values().map(|events| events.len() as u64).sum();

    let builder = Arc::new(ProfileBuilder::new());
    builder.set_sample_types(SAMPLE_TYPES);
    builder.set_period_type(PERIOD_TYPE.0, PERIOD_TYPE.1);
    builder.set_period(PERIOD_NANOS);

    let num_workers = options.num_workers.clamp(1, threads.len().max(1));
    info!(
        "Building call stacks for {} events on {} threads ({} workers)",
        expected,
        threads.len(),
        num_workers
    );

    let (sender, receiver) = sync_channel::<StackSample>(SAMPLE_CHANNEL_CAPACITY);
    let processed = Arc::new(AtomicU64::new(0));
    let pool = Pool::<ThunkWorker<()>>::new(num_workers);

    for (tid, events) in threads {
        let sender = sender.clone();
        let builder = Arc::clone(&builder);
        let processed = Arc::clone(&processed);
        pool.execute(Thunk::of(move || {
            process_thread_events(tid, &events, &builder, &sender, &processed)
        }));
    }

    // The channel closes once every task has dropped its sender
    drop(sender);

    let mut aggregator = StackAggregator::new();
    for sample in receiver {
        aggregator.add(sample, &builder);
    }
    pool.join();

    let processed = processed.load(Ordering::SeqCst);
    if processed != expected {
        return Err(ConvertError::IncompleteConversion { expected, processed });
    }

    debug!("Aggregated {} events into {} stacks", processed, aggregator.len());

    Ok(builder.finish(aggregator.into_samples()))
}

/// Reconstruct one thread's stacks and send them to the aggregator
///
/// **Private** - body of each pool task
fn process_thread_events(
    tid: i64,
    events: &[TraceEvent],
    builder: &ProfileBuilder,
    sender: &SyncSender<StackSample>,
    processed: &AtomicU64,
) {
    debug!("Thread {}: processing {} events", tid, events.len());

    reconstruct_stacks(events, |sample| {
        // Register the event's own frame as soon as it is seen
        if let Some(leaf) = sample.leaf() {
            builder.intern_location(&leaf.name, &leaf.category);
        }

        trace!("Thread {}: {}", tid, sample);

        if sender.send(sample).is_ok() {
            processed.fetch_add(1, Ordering::Relaxed);
        } else {
            warn!("Thread {}: aggregator stopped receiving", tid);
        }
    });
}
