use std::fmt;

use rayon::prelude::*;

use crate::record::{self, Record, Value};
use crate::schema::Schema;

/// A line that could not be parsed as a JSON object. The line is still in
/// the store as a degraded record under the reported id.
#[derive(Debug)]
pub struct ParseError {
    pub id: usize,
    pub reason: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}: {}", self.id, self.reason)
    }
}

impl std::error::Error for ParseError {}

/// Append-only record storage. Ids are dense, 0-based and valid until the
/// next reset; the epoch counts resets so stale ids can be told apart.
#[derive(Debug)]
pub struct RecordStore {
    records: Vec<Record>,
    schema: Schema,
    epoch: usize,
    parse_errors: usize,
}

impl RecordStore {
    pub fn new(max_column_width: usize) -> RecordStore {
        RecordStore {
            records: Vec::new(),
            schema: Schema::new(max_column_width),
            epoch: 0,
            parse_errors: 0,
        }
    }

    /// Append one line. The line always gets the next id, even when it does
    /// not parse; in that case it is kept as raw text and the error says why.
    pub fn append(&mut self, line: String) -> Result<usize, ParseError> {
        let seq = self.records.len();
        match record::parse_fields(&line) {
            Ok(fields) => {
                self.insert(Record {
                    seq,
                    original: line,
                    fields,
                    parsed: true,
                });
                Ok(seq)
            }
            Err(reason) => {
                self.insert(Record::degraded(seq, line));
                self.parse_errors += 1;
                Err(ParseError { id: seq, reason })
            }
        }
    }

    /// Append a batch, parsing in parallel. Used for the initial load, where
    /// the whole file arrives at once. Returns how many lines did not parse.
    pub fn append_all(&mut self, lines: Vec<String>) -> usize {
        let parsed: Vec<Result<Vec<(String, Value)>, String>> = lines
            .par_iter()
            .map(|line| record::parse_fields(line))
            .collect();

        let mut failed = 0;
        for (line, fields) in lines.into_iter().zip(parsed) {
            let seq = self.records.len();
            match fields {
                Ok(fields) => self.insert(Record {
                    seq,
                    original: line,
                    fields,
                    parsed: true,
                }),
                Err(_) => {
                    self.insert(Record::degraded(seq, line));
                    self.parse_errors += 1;
                    failed += 1;
                }
            }
        }
        failed
    }

    fn insert(&mut self, record: Record) {
        for (name, value) in &record.fields {
            self.schema.observe(name, value.render().chars().count());
        }
        self.records.push(record);
    }

    /// Drop all records and the schema. Numbering restarts at 0 and the
    /// epoch moves on.
    pub fn reset(&mut self) {
        self.records.clear();
        self.schema.clear();
        self.parse_errors = 0;
        self.epoch += 1;
    }

    pub fn get(&self, id: usize) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    pub fn parse_error_count(&self) -> usize {
        self.parse_errors
    }
}
