use pretty_assertions::assert_eq;
use std::collections::BTreeMap;
use torch_trace_pprof::aggregator::{convert_trace, ConvertOptions};
use torch_trace_pprof::parser::{TraceData, TraceEvent};
use torch_trace_pprof::profile::Profile;

/// Stack (root first, joined by ';') -> (count, time_ns)
fn stack_totals(profile: &Profile) -> BTreeMap<String, (i64, i64)> {
    profile
        .sample
        .iter()
        .map(|s| (profile.stack_names(s).join(";"), (s.value[0], s.value[1])))
        .collect()
}

fn convert(events: Vec<TraceEvent>, workers: usize) -> Profile {
    let trace = TraceData {
        trace_events: events,
    };
    convert_trace(&trace, &ConvertOptions::with_workers(workers)).unwrap()
}

/// A few threads of nested training-loop style events
fn training_trace() -> Vec<TraceEvent> {
    let mut events = Vec::new();
    for (t, tid) in [1i64, 2, 3, 4].into_iter().enumerate() {
        let base = (t as f64) * 7.0;
        for step in 0..5 {
            let ts = base + (step as f64) * 1000.0;
            events.push(TraceEvent::complete("ProfilerStep", "user_annotation", tid, ts, 900.0));
            events.push(TraceEvent::complete("forward", "python_function", tid, ts + 10.0, 400.0));
            events.push(TraceEvent::complete("aten::linear", "cpu_op", tid, ts + 20.0, 100.0));
            events.push(TraceEvent::complete("aten::mm", "cpu_op", tid, ts + 30.0, 50.0));
            events.push(TraceEvent::complete("backward", "python_function", tid, ts + 500.0, 300.0));
            events.push(TraceEvent::complete("aten::mm", "cpu_op", tid, ts + 510.0, 80.0));
        }
    }
    events.push(TraceEvent::complete("cudaLaunchKernel", "cuda_runtime", "stream 7", 5.0, 3.5));
    events
}

#[test]
fn test_scenario_nested_events() {
    let profile = convert(
        vec![
            TraceEvent::complete("A", "cpu_op", 1, 0.0, 100.0),
            TraceEvent::complete("B", "cpu_op", 1, 10.0, 30.0),
        ],
        2,
    );

    let mut expected = BTreeMap::new();
    expected.insert("A".to_string(), (1, 100_000));
    expected.insert("A;B".to_string(), (1, 30_000));
    assert_eq!(stack_totals(&profile), expected);
}

#[test]
fn test_scenario_repeated_leaf_is_aggregated() {
    let profile = convert(
        vec![
            TraceEvent::complete("foo", "cpu_op", 1, 0.0, 10.0),
            TraceEvent::complete("foo", "cpu_op", 1, 20.0, 10.0),
        ],
        1,
    );

    assert_eq!(profile.sample.len(), 1);
    assert_eq!(profile.sample[0].value, vec![2, 20_000]);
    assert_eq!(profile.location.len(), 1);
    assert_eq!(profile.function.len(), 1);
}

#[test]
fn test_scenario_filtered_events_leave_no_symbols() {
    let profile = convert(
        vec![
            TraceEvent {
                ph: "B".to_string(),
                ..TraceEvent::complete("begin_only", "cpu_op", 1, 100.0, 50.0)
            },
            TraceEvent::complete("zero", "cpu_op", 1, 200.0, 0.0),
            TraceEvent::complete("negative", "cpu_op", 1, 300.0, -1.0),
        ],
        1,
    );

    assert!(profile.sample.is_empty());
    assert!(profile.location.is_empty());
    assert!(profile.function.is_empty());
    for name in ["begin_only", "zero", "negative", "cpu_op"] {
        assert!(!profile.string_table.iter().any(|s| s == name));
    }
}

#[test]
fn test_scenario_empty_trace() {
    let profile = convert(Vec::new(), 4);

    assert!(profile.sample.is_empty());
    assert_eq!(profile.string_table[0], "");
    for s in ["samples", "count", "time", "nanoseconds", "cpu"] {
        assert!(profile.string_table.iter().any(|t| t == s), "missing {}", s);
    }
    assert_eq!(profile.sample_type.len(), 2);
    assert_eq!(profile.period, 1_000_000);
    assert_eq!(profile.string(profile.period_type.unwrap().r#type), Some("cpu"));
}

#[test]
fn test_child_stack_extends_parent_stack() {
    let profile = convert(training_trace(), 4);
    let totals = stack_totals(&profile);

    assert_eq!(
        totals["ProfilerStep;forward;aten::linear;aten::mm"],
        (20, 20 * 50_000)
    );
    assert_eq!(totals["ProfilerStep;backward;aten::mm"], (20, 20 * 80_000));
    assert_eq!(totals["ProfilerStep"], (20, 20 * 900_000));
}

#[test]
fn test_total_duration_is_conserved() {
    let events = training_trace();
    let expected: i64 = events
        .iter()
        .filter(|e| e.is_convertible())
        .map(|e| (e.dur * 1000.0) as i64)
        .sum();
    let expected_count = events.iter().filter(|e| e.is_convertible()).count() as i64;

    let profile = convert(events, 3);

    assert_eq!(profile.total_value(1), expected);
    assert_eq!(profile.total_value(0), expected_count);
}

#[test]
fn test_one_symbol_per_frame_across_threads() {
    let profile = convert(training_trace(), 8);

    // ProfilerStep, forward, aten::linear, aten::mm, backward, cudaLaunchKernel
    assert_eq!(profile.location.len(), 6);
    assert_eq!(profile.function.len(), 6);

    let mut names: Vec<&str> = profile
        .function
        .iter()
        .filter_map(|f| profile.string(f.name))
        .collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 6);

    let mut strings = profile.string_table.clone();
    strings.sort();
    strings.dedup();
    assert_eq!(strings.len(), profile.string_table.len());
}

#[test]
fn test_same_name_different_category_is_distinct() {
    let profile = convert(
        vec![
            TraceEvent::complete("aten::mm", "cpu_op", 1, 0.0, 10.0),
            TraceEvent::complete("aten::mm", "kernel", 2, 0.0, 10.0),
        ],
        2,
    );
    assert_eq!(profile.location.len(), 2);
    assert_eq!(profile.sample.len(), 2);
}

#[test]
fn test_worker_count_does_not_change_results() {
    let single = convert(training_trace(), 1);
    let many = convert(training_trace(), 8);

    assert_eq!(stack_totals(&single), stack_totals(&many));
    assert_eq!(single.location.len(), many.location.len());
    assert_eq!(single.function.len(), many.function.len());
}

#[test]
fn test_conversion_is_deterministic_in_content() {
    let first = convert(training_trace(), 4);
    let second = convert(training_trace(), 4);
    assert_eq!(stack_totals(&first), stack_totals(&second));
}

#[test]
fn test_references_are_valid_and_ids_dense() {
    let profile = convert(training_trace(), 4);

    for sample in &profile.sample {
        for id in &sample.location_id {
            let location = profile.location_by_id(*id).expect("sample references missing location");
            assert!(profile.function_by_id(location.line[0].function_id).is_some());
        }
    }

    for (i, location) in profile.location.iter().enumerate() {
        assert_eq!(location.id, i as u64 + 1);
    }
    for (i, function) in profile.function.iter().enumerate() {
        assert_eq!(function.id, i as u64 + 1);
        assert_eq!(function.name, function.system_name);
    }
}

#[test]
fn test_leaf_is_first_location() {
    let profile = convert(
        vec![
            TraceEvent::complete("outer", "py", 1, 0.0, 100.0),
            TraceEvent::complete("inner", "op", 1, 10.0, 10.0),
        ],
        1,
    );

    let nested = profile
        .sample
        .iter()
        .find(|s| s.location_id.len() == 2)
        .unwrap();
    let leaf = profile.location_by_id(nested.location_id[0]).unwrap();
    let function = profile.function_by_id(leaf.line[0].function_id).unwrap();
    assert_eq!(profile.string(function.name), Some("inner"));
    assert_eq!(profile.string(function.filename), Some("op"));
}

#[test]
fn test_string_thread_ids_are_grouped() {
    // Same string id on both events: they share a thread, so nesting applies
    let profile = convert(
        vec![
            TraceEvent::complete("parent", "op", "stream 7", 0.0, 100.0),
            TraceEvent::complete("child", "op", "stream 7", 10.0, 10.0),
        ],
        2,
    );
    assert!(stack_totals(&profile).contains_key("parent;child"));
}

#[test]
fn test_events_on_different_threads_do_not_nest() {
    let profile = convert(
        vec![
            TraceEvent::complete("parent", "op", 1, 0.0, 100.0),
            TraceEvent::complete("child", "op", 2, 10.0, 10.0),
        ],
        2,
    );
    let totals = stack_totals(&profile);
    assert!(totals.contains_key("child"));
    assert!(!totals.contains_key("parent;child"));
}

#[test]
fn test_unsorted_input_is_sorted_per_thread() {
    let profile = convert(
        vec![
            TraceEvent::complete("child", "op", 1, 10.0, 10.0),
            TraceEvent::complete("parent", "op", 1, 0.0, 100.0),
        ],
        1,
    );
    assert!(stack_totals(&profile).contains_key("parent;child"));
}
