//! In-memory pprof profile.
//!
//! Mirrors the subset of `profile.proto` that the converter produces.
//! String-valued fields hold indexes into `string_table`.

/// A (type, unit) pair, both string table indexes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValueType {
    pub r#type: i64,
    pub unit: i64,
}

/// An aggregated call stack and its values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sample {
    /// Location ids, leaf first
    pub location_id: Vec<u64>,

    /// `[count, time_ns]`, matching the profile's sample types
    pub value: Vec<i64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
    pub function_id: u64,
    pub line: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub id: u64,
    pub line: Vec<Line>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Function {
    pub id: u64,
    pub name: i64,
    pub system_name: i64,
    pub filename: i64,
}

/// A complete profile, ready for encoding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub sample_type: Vec<ValueType>,
    pub sample: Vec<Sample>,
    pub location: Vec<Location>,
    pub function: Vec<Function>,
    pub string_table: Vec<String>,
    pub time_nanos: i64,
    pub duration_nanos: i64,
    pub period_type: Option<ValueType>,
    pub period: i64,
}

impl Profile {
    /// Look up a string table entry
    pub fn string(&self, index: i64) -> Option<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.string_table.get(i))
            .map(String::as_str)
    }

    pub fn location_by_id(&self, id: u64) -> Option<&Location> {
        // Ids are dense from 1 in creation order
        let idx = usize::try_from(id.checked_sub(1)?).ok()?;
        self.location.get(idx).filter(|loc| loc.id == id)
    }

    pub fn function_by_id(&self, id: u64) -> Option<&Function> {
        let idx = usize::try_from(id.checked_sub(1)?).ok()?;
        self.function.get(idx).filter(|f| f.id == id)
    }

    /// Resolve a sample's stack to function names, root first
    ///
    /// **Public** - used by tests and summaries to inspect stacks by name
    pub fn stack_names(&self, sample: &Sample) -> Vec<String> {
        sample
            .location_id
            .iter()
            .rev()
            .filter_map(|id| self.location_by_id(*id))
            .filter_map(|loc| loc.line.first())
            .filter_map(|line| self.function_by_id(line.function_id))
            .filter_map(|f| self.string(f.name))
            .map(str::to_string)
            .collect()
    }

    /// Sum of one value column across all samples, saturating
    pub fn total_value(&self, column: usize) -> i64 {
        self.sample
            .iter()
            .filter_map(|s| s.value.get(column))
            .fold(0i64, |acc, v| acc.saturating_add(*v))
    }
}
