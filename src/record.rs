use serde_json;

/// Column name used for lines that are not valid JSON objects. The raw text
/// is kept there so nothing ever disappears from the table.
pub const PAYLOAD_COLUMN: &str = "message";

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
    /// Nested objects and arrays, kept as compact JSON text.
    Nested(String),
}

impl Value {
    pub fn from_json(value: serde_json::Value) -> Value {
        match value {
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Number(n) => Value::Num(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Null => Value::Null,
            other => Value::Nested(other.to_string()),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            Value::Num(n) => format!("{}", n),
            Value::Bool(b) => b.to_string(),
            Value::Null => "null".to_string(),
            Value::Nested(json) => json.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

#[derive(Debug, Clone)]
pub struct Record {
    /// Position in the store, 0-based and dense.
    pub seq: usize,
    /// The line exactly as it appeared in the file.
    pub original: String,
    /// Fields in document order.
    pub fields: Vec<(String, Value)>,
    /// False for lines kept as raw text under PAYLOAD_COLUMN.
    pub parsed: bool,
}

impl Record {
    pub fn degraded(seq: usize, original: String) -> Record {
        let fields = vec![(PAYLOAD_COLUMN.to_string(), Value::Str(original.clone()))];
        Record {
            seq,
            original,
            fields,
            parsed: false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field.as_str() == name)
            .map(|(_, value)| value)
    }

    /// Rendered text for a field, empty when the record does not have it.
    pub fn render_field(&self, name: &str) -> String {
        match self.get(name) {
            Some(value) => value.render(),
            None => String::new(),
        }
    }
}

/// Parse one line as a JSON object. Anything else, including valid JSON that
/// is not an object, is an error and the caller keeps the line as raw text.
pub fn parse_fields(line: &str) -> Result<Vec<(String, Value)>, String> {
    match serde_json::from_str::<serde_json::Value>(line) {
        Ok(serde_json::Value::Object(fields)) => Ok(fields
            .into_iter()
            .map(|(name, value)| (name, Value::from_json(value)))
            .collect()),
        Ok(serde_json::Value::Array(_)) => Err("top level is an array, not an object".to_string()),
        Ok(_) => Err("top level is not an object".to_string()),
        Err(err) => Err(err.to_string()),
    }
}
