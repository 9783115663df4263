//! Thread-safe profile builder and symbol interner.
//!
//! Thread workers and the aggregator share one `ProfileBuilder`. Lookups
//! take the read lock; a miss takes the write lock and re-checks before
//! creating, so each string, function and location is created once.

use super::model::{Function, Line, Location, Profile, Sample, ValueType};
use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Shared, deduplicating profile builder
///
/// **Public** - one instance per conversion run
pub struct ProfileBuilder {
    tables: RwLock<SymbolTables>,
}

/// Everything behind the lock
struct SymbolTables {
    profile: Profile,
    string_index: HashMap<String, i64>,
    function_index: HashMap<String, u64>,
    location_index: HashMap<String, u64>,
}

/// Index key for a (name, file) pair
fn symbol_key(name: &str, filename: &str) -> String {
    let mut key = String::with_capacity(name.len() + filename.len() + 1);
    key.push_str(name);
    key.push('\0');
    key.push_str(filename);
    key
}

impl SymbolTables {
    fn new() -> Self {
        let mut string_index = HashMap::new();
        string_index.insert(String::new(), 0);

        Self {
            profile: Profile {
                string_table: vec![String::new()],
                ..Default::default()
            },
            string_index,
            function_index: HashMap::new(),
            location_index: HashMap::new(),
        }
    }

    fn string_locked(&mut self, s: &str) -> i64 {
        if let Some(&idx) = self.string_index.get(s) {
            return idx;
        }
        let idx = self.profile.string_table.len() as i64;
        self.profile.string_table.push(s.to_string());
        self.string_index.insert(s.to_string(), idx);
        idx
    }

    fn function_locked(&mut self, key: &str, name: &str, filename: &str) -> u64 {
        if let Some(&id) = self.function_index.get(key) {
            return id;
        }
        let id = self.profile.function.len() as u64 + 1;
        let name_idx = self.string_locked(name);
        let filename_idx = self.string_locked(filename);
        self.profile.function.push(Function {
            id,
            name: name_idx,
            system_name: name_idx,
            filename: filename_idx,
        });
        self.function_index.insert(key.to_string(), id);
        id
    }

    fn location_locked(&mut self, key: &str, name: &str, category: &str) -> u64 {
        if let Some(&id) = self.location_index.get(key) {
            return id;
        }
        let function_id = self.function_locked(key, name, category);
        let id = self.profile.location.len() as u64 + 1;
        self.profile.location.push(Location {
            id,
            line: vec![Line {
                function_id,
                line: 0,
            }],
        });
        self.location_index.insert(key.to_string(), id);
        id
    }
}

impl ProfileBuilder {
    /// Create an empty builder whose string table holds only ""
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(SymbolTables::new()),
        }
    }

    /// Intern a string and return its string table index
    pub fn intern_string(&self, s: &str) -> i64 {
        if let Some(&idx) = self.tables.read().string_index.get(s) {
            return idx;
        }
        self.tables.write().string_locked(s)
    }

    /// Get or create the function for a (name, filename) pair
    pub fn intern_function(&self, name: &str, filename: &str) -> u64 {
        let key = symbol_key(name, filename);
        if let Some(&id) = self.tables.read().function_index.get(&key) {
            return id;
        }
        self.tables.write().function_locked(&key, name, filename)
    }

    /// Get or create the location for a (name, category) frame
    ///
    /// **Public** - called by thread workers and the aggregator
    ///
    /// On first creation this also creates the frame's function and
    /// interns its name and category.
    pub fn intern_location(&self, name: &str, category: &str) -> u64 {
        let key = symbol_key(name, category);
        if let Some(&id) = self.tables.read().location_index.get(&key) {
            return id;
        }
        self.tables.write().location_locked(&key, name, category)
    }

    /// Append sample type declarations
    pub fn set_sample_types(&self, types: &[(&str, &str)]) {
        let mut tables = self.tables.write();
        for (type_name, unit) in types {
            let value_type = ValueType {
                r#type: tables.string_locked(type_name),
                unit: tables.string_locked(unit),
            };
            tables.profile.sample_type.push(value_type);
        }
    }

    pub fn set_period_type(&self, type_name: &str, unit: &str) {
        let mut tables = self.tables.write();
        let value_type = ValueType {
            r#type: tables.string_locked(type_name),
            unit: tables.string_locked(unit),
        };
        tables.profile.period_type = Some(value_type);
    }

    pub fn set_period(&self, period: i64) {
        self.tables.write().profile.period = period;
    }

    pub fn string_count(&self) -> usize {
        self.tables.read().profile.string_table.len()
    }

    pub fn function_count(&self) -> usize {
        self.tables.read().profile.function.len()
    }

    pub fn location_count(&self) -> usize {
        self.tables.read().profile.location.len()
    }

    /// Take the assembled profile, attaching the final samples
    ///
    /// **Public** - called once, after every worker has finished
    ///
    /// The builder is left empty (string table `[""]`) afterwards.
    pub fn finish(&self, samples: Vec<Sample>) -> Profile {
        let mut tables = self.tables.write();
        let mut profile = std::mem::replace(&mut *tables, SymbolTables::new()).profile;
        profile.sample = samples;

        debug!(
            "Assembled profile: {} samples, {} locations, {} functions, {} strings",
            profile.sample.len(),
            profile.location.len(),
            profile.function.len(),
            profile.string_table.len()
        );

        profile
    }
}

impl Default for ProfileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_string_is_slot_zero() {
        let builder = ProfileBuilder::new();
        assert_eq!(builder.intern_string(""), 0);
        assert_eq!(builder.string_count(), 1);
    }

    #[test]
    fn test_intern_string_dedup() {
        let builder = ProfileBuilder::new();
        let a = builder.intern_string("aten::add");
        let b = builder.intern_string("aten::mul");
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(builder.intern_string("aten::add"), a);
        assert_eq!(builder.string_count(), 3);
    }

    #[test]
    fn test_intern_location_creates_function_once() {
        let builder = ProfileBuilder::new();
        let loc1 = builder.intern_location("aten::mm", "cpu_op");
        let loc2 = builder.intern_location("aten::mm", "cpu_op");
        let loc3 = builder.intern_location("aten::mm", "kernel");

        assert_eq!(loc1, 1);
        assert_eq!(loc1, loc2);
        assert_eq!(loc3, 2);

        let profile = builder.finish(Vec::new());
        assert_eq!(profile.location.len(), 2);
        assert_eq!(profile.function.len(), 2);
        // "", "aten::mm", "cpu_op", "kernel"
        assert_eq!(profile.string_table, vec!["", "aten::mm", "cpu_op", "kernel"]);

        let f = profile.function[0];
        assert_eq!(profile.string(f.name), Some("aten::mm"));
        assert_eq!(f.system_name, f.name);
        assert_eq!(profile.string(f.filename), Some("cpu_op"));
        assert_eq!(profile.location[1].line[0].function_id, 2);
    }

    #[test]
    fn test_location_reuses_existing_function() {
        let builder = ProfileBuilder::new();
        let function_id = builder.intern_function("step", "python_function");
        let location_id = builder.intern_location("step", "python_function");

        let profile = builder.finish(Vec::new());
        assert_eq!(profile.function.len(), 1);
        assert_eq!(profile.location_by_id(location_id).unwrap().line[0].function_id, function_id);
    }

    #[test]
    fn test_separator_keeps_pairs_distinct() {
        let builder = ProfileBuilder::new();
        let a = builder.intern_location("ab", "c");
        let b = builder.intern_location("a", "bc");
        assert_ne!(a, b);
    }

    #[test]
    fn test_metadata() {
        let builder = ProfileBuilder::new();
        builder.set_sample_types(&[("samples", "count"), ("time", "nanoseconds")]);
        builder.set_period_type("cpu", "nanoseconds");
        builder.set_period(1_000_000);

        let profile = builder.finish(Vec::new());
        assert_eq!(profile.sample_type.len(), 2);
        assert_eq!(profile.string(profile.sample_type[1].r#type), Some("time"));
        // "nanoseconds" was interned once and reused by the period type
        assert_eq!(profile.period_type.unwrap().unit, profile.sample_type[1].unit);
        assert_eq!(profile.period, 1_000_000);
    }

    #[test]
    fn test_finish_resets_builder() {
        let builder = ProfileBuilder::new();
        builder.intern_location("a", "b");
        let _ = builder.finish(Vec::new());
        assert_eq!(builder.string_count(), 1);
        assert_eq!(builder.location_count(), 0);
    }

    #[test]
    fn test_concurrent_interning_creates_each_symbol_once() {
        let builder = Arc::new(ProfileBuilder::new());
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let builder = Arc::clone(&builder);
                thread::spawn(move || {
                    let mut ids = Vec::new();
                    for i in 0..200 {
                        // Rotate the order so workers race on different keys
                        let n = (i + worker * 25) % 200;
                        ids.push((n, builder.intern_location(&format!("op{}", n), "cpu_op")));
                    }
                    ids
                })
            })
            .collect();

        let mut seen: HashMap<usize, u64> = HashMap::new();
        for handle in handles {
            for (n, id) in handle.join().unwrap() {
                let prior = *seen.entry(n).or_insert(id);
                assert_eq!(prior, id, "op{} got two location ids", n);
            }
        }

        let profile = builder.finish(Vec::new());
        assert_eq!(profile.location.len(), 200);
        assert_eq!(profile.function.len(), 200);
        // "" + "cpu_op" + 200 names
        assert_eq!(profile.string_table.len(), 202);

        let mut ids: Vec<u64> = profile.location.iter().map(|l| l.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=200).collect::<Vec<u64>>());
    }
}
