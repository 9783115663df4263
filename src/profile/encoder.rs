//! Minimal protobuf encoder for `profile.proto`.
//!
//! Only the wire features the profile needs: varints, packed varints and
//! length-delimited sub-messages. Zero-valued scalars are skipped.
//! String table entries are always written, including the leading "".

use super::model::{Function, Line, Location, Profile, Sample, ValueType};

const WIRE_VARINT: u64 = 0;
const WIRE_LEN: u64 = 2;

// Profile
const PROFILE_SAMPLE_TYPE: u64 = 1;
const PROFILE_SAMPLE: u64 = 2;
const PROFILE_LOCATION: u64 = 4;
const PROFILE_FUNCTION: u64 = 5;
const PROFILE_STRING_TABLE: u64 = 6;
const PROFILE_TIME_NANOS: u64 = 9;
const PROFILE_DURATION_NANOS: u64 = 10;
const PROFILE_PERIOD_TYPE: u64 = 11;
const PROFILE_PERIOD: u64 = 12;

// ValueType
const VALUE_TYPE_TYPE: u64 = 1;
const VALUE_TYPE_UNIT: u64 = 2;

// Sample
const SAMPLE_LOCATION_ID: u64 = 1;
const SAMPLE_VALUE: u64 = 2;

// Location
const LOCATION_ID: u64 = 1;
const LOCATION_LINE: u64 = 4;

// Line
const LINE_FUNCTION_ID: u64 = 1;
const LINE_LINE: u64 = 2;

// Function
const FUNCTION_ID: u64 = 1;
const FUNCTION_NAME: u64 = 2;
const FUNCTION_SYSTEM_NAME: u64 = 3;
const FUNCTION_FILENAME: u64 = 4;

/// Append-only protobuf writer
#[derive(Debug, Default)]
pub struct ProtoWriter {
    buf: Vec<u8>,
}

impl ProtoWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Little-endian base-128, high bit = continuation
    pub fn varint(&mut self, mut v: u64) {
        while v >= 0x80 {
            self.buf.push((v as u8) | 0x80);
            v >>= 7;
        }
        self.buf.push(v as u8);
    }

    fn tag(&mut self, field: u64, wire_type: u64) {
        self.varint((field << 3) | wire_type);
    }

    /// Varint field, omitted when zero
    pub fn uint64(&mut self, field: u64, v: u64) {
        if v != 0 {
            self.tag(field, WIRE_VARINT);
            self.varint(v);
        }
    }

    /// Signed varint field (two's complement, not zigzag), omitted when zero
    pub fn int64(&mut self, field: u64, v: i64) {
        self.uint64(field, v as u64);
    }

    /// Length-delimited field, always written
    pub fn bytes(&mut self, field: u64, data: &[u8]) {
        self.tag(field, WIRE_LEN);
        self.varint(data.len() as u64);
        self.buf.extend_from_slice(data);
    }

    /// Packed repeated varints, omitted when empty
    pub fn packed(&mut self, field: u64, values: impl IntoIterator<Item = u64>) {
        let mut inner = ProtoWriter::new();
        for v in values {
            inner.varint(v);
        }
        if !inner.buf.is_empty() {
            self.bytes(field, &inner.buf);
        }
    }

    /// Nested message, built by `write_body`
    pub fn message(&mut self, field: u64, write_body: impl FnOnce(&mut ProtoWriter)) {
        let mut inner = ProtoWriter::new();
        write_body(&mut inner);
        self.bytes(field, &inner.buf);
    }
}

impl Profile {
    /// Serialize to uncompressed `profile.proto` bytes
    ///
    /// **Public** - main entry point for encoding
    ///
    /// Encoding is a pure in-memory transform and cannot fail. The caller
    /// owns compression and persistence.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ProtoWriter::new();

        for vt in &self.sample_type {
            w.message(PROFILE_SAMPLE_TYPE, |m| encode_value_type(m, vt));
        }
        for sample in &self.sample {
            w.message(PROFILE_SAMPLE, |m| encode_sample(m, sample));
        }
        for location in &self.location {
            w.message(PROFILE_LOCATION, |m| encode_location(m, location));
        }
        for function in &self.function {
            w.message(PROFILE_FUNCTION, |m| encode_function(m, function));
        }
        for s in &self.string_table {
            w.bytes(PROFILE_STRING_TABLE, s.as_bytes());
        }

        w.int64(PROFILE_TIME_NANOS, self.time_nanos);
        w.int64(PROFILE_DURATION_NANOS, self.duration_nanos);
        if let Some(vt) = &self.period_type {
            w.message(PROFILE_PERIOD_TYPE, |m| encode_value_type(m, vt));
        }
        w.int64(PROFILE_PERIOD, self.period);

        w.into_bytes()
    }
}

fn encode_value_type(w: &mut ProtoWriter, vt: &ValueType) {
    w.int64(VALUE_TYPE_TYPE, vt.r#type);
    w.int64(VALUE_TYPE_UNIT, vt.unit);
}

fn encode_sample(w: &mut ProtoWriter, sample: &Sample) {
    w.packed(SAMPLE_LOCATION_ID, sample.location_id.iter().copied());
    w.packed(SAMPLE_VALUE, sample.value.iter().map(|v| *v as u64));
}

fn encode_location(w: &mut ProtoWriter, location: &Location) {
    w.uint64(LOCATION_ID, location.id);
    for line in &location.line {
        w.message(LOCATION_LINE, |m| encode_line(m, line));
    }
}

fn encode_line(w: &mut ProtoWriter, line: &Line) {
    w.uint64(LINE_FUNCTION_ID, line.function_id);
    w.int64(LINE_LINE, line.line);
}

fn encode_function(w: &mut ProtoWriter, function: &Function) {
    w.uint64(FUNCTION_ID, function.id);
    w.int64(FUNCTION_NAME, function.name);
    w.int64(FUNCTION_SYSTEM_NAME, function.system_name);
    w.int64(FUNCTION_FILENAME, function.filename);
}
