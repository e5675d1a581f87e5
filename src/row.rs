use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// One result row: an ordered mapping from column name to value.
///
/// Column names and the name→index table are shared across every row of a
/// result set, so a row costs one `Vec` of values plus two `Arc` bumps. The
/// index table is built per result set by the assembler; there is no global
/// cache behind it.
#[derive(Debug, Clone)]
pub struct Row {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, in column order
    pub values: Vec<RowValues>,
    column_index: Arc<HashMap<String, usize>>,
}

impl Row {
    /// Create a standalone row, building its own column-index table.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let column_index = Self::build_index(&column_names);
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Create a row that shares a prebuilt index table with its result set.
    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        column_index: Arc<HashMap<String, usize>>,
        values: Vec<RowValues>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    pub(crate) fn build_index(column_names: &[String]) -> Arc<HashMap<String, usize>> {
        Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        )
    }

    /// Get the index of a column by name, or None if not found.
    ///
    /// Lookups are case-sensitive.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index.get(column_name) {
            return Some(idx);
        }

        // Fall back to linear search
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value by column name, or None if the column wasn't found.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value by column index, or None if out of bounds.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    /// Iterate `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new(
            Arc::new(vec!["id".to_string(), "product".to_string()]),
            vec![RowValues::Int(1), RowValues::Text("wrist watch".into())],
        )
    }

    #[test]
    fn lookup_by_name_and_index() {
        let row = sample();
        assert_eq!(row.get("id"), Some(&RowValues::Int(1)));
        assert_eq!(
            row.get_by_index(1),
            Some(&RowValues::Text("wrist watch".into()))
        );
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let row = sample();
        assert_eq!(row.get("ID"), None);
    }

    #[test]
    fn iteration_preserves_column_order() {
        let row = sample();
        let names: Vec<&str> = row.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["id", "product"]);
    }
}
