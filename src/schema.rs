use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    /// Widest rendered value seen so far, capped at the configured maximum.
    pub width: usize,
}

/// The union of all field names seen so far, in first-seen order. Columns are
/// only ever added; the whole schema is dropped when the store resets.
#[derive(Debug, Default)]
pub struct Schema {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    max_width: usize,
}

impl Schema {
    pub fn new(max_width: usize) -> Schema {
        Schema {
            columns: Vec::new(),
            index: HashMap::new(),
            max_width,
        }
    }

    /// Record that a value of the given rendered width appeared under `name`,
    /// creating the column on first sight.
    pub fn observe(&mut self, name: &str, value_width: usize) {
        match self.index.get(name) {
            Some(&at) => {
                let column = &mut self.columns[at];
                column.width = column.width.max(value_width.min(self.max_width));
            }
            None => {
                let width = name.chars().count().max(value_width).min(self.max_width);
                self.index.insert(name.to_string(), self.columns.len());
                self.columns.push(Column {
                    name: name.to_string(),
                    width,
                });
            }
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn width_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).map(|&at| self.columns[at].width)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn clear(&mut self) {
        self.columns.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_keep_first_seen_order() {
        let mut schema = Schema::new(48);
        schema.observe("b", 1);
        schema.observe("a", 1);
        schema.observe("b", 1);
        let names: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_width_grows_with_values_up_to_the_cap() {
        let mut schema = Schema::new(10);
        schema.observe("level", 3);
        // never narrower than the header
        assert_eq!(schema.width_of("level"), Some(5));
        schema.observe("level", 8);
        assert_eq!(schema.width_of("level"), Some(8));
        schema.observe("level", 100);
        assert_eq!(schema.width_of("level"), Some(10));
        schema.observe("level", 2);
        assert_eq!(schema.width_of("level"), Some(10));
    }

    #[test]
    fn test_clear_forgets_everything() {
        let mut schema = Schema::new(48);
        schema.observe("a", 1);
        schema.clear();
        assert!(schema.is_empty());
        assert!(!schema.contains("a"));
    }
}
