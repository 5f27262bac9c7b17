//! Schema graph produced by a parse
//!
//! Tables live in one ordered arena (`Schema`); foreign-key associations are
//! stored as `TableIndex` values into that arena, so `refs` never owns the
//! tables it points at.

use std::fmt;
use std::ops::Index;

use super::catalog::{ColumnType, Length};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Position of a table in its `Schema`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TableIndex(pub(crate) usize);

impl TableIndex {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Which side of a foreign-key declaration a table id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ReferenceEnd {
    Parent,
    Child,
}

impl fmt::Display for ReferenceEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReferenceEnd::Parent => "parent",
            ReferenceEnd::Child => "child",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Column {
    pub name: String,
    pub code: Option<String>,
    /// None when the column declares no data type
    pub col_type: Option<ColumnType>,
    /// Overrides the catalog default length
    pub col_length: Option<u32>,
    /// Digits after the decimal point
    pub col_precision: Option<u32>,
    pub pk: bool,
    pub not_null: bool,
    pub comment: Option<String>,
}

impl Column {
    /// Declared length if present, otherwise the type's default
    ///
    /// A precision declared without a length replaces the scale of a
    /// decimal default.
    pub fn effective_length(&self) -> Option<Length> {
        match (self.col_length, self.col_precision) {
            (Some(digits), Some(scale)) => Some(Length::Decimal { digits, scale }),
            (Some(size), None) => Some(Length::Size(size)),
            (None, precision) => {
                let default = self.col_type.and_then(ColumnType::default_length)?;
                match (default, precision) {
                    (Length::Decimal { digits, .. }, Some(scale)) => Some(Length::Decimal { digits, scale }),
                    (default, _) => Some(default),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    pub name: Option<String>,
    pub code: String,
    pub comment: Option<String>,
    /// Document order
    pub columns: Vec<Column>,
    pub(crate) refs: Vec<TableIndex>,
}

impl Table {
    /// Tables this one declares foreign keys to, in declaration order
    pub fn refs(&self) -> &[TableIndex] {
        &self.refs
    }

    pub fn primary_key(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.pk)
    }
}

/// Committed tables in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Schema {
    tables: Vec<Table>,
}

impl Schema {
    pub(crate) fn new(tables: Vec<Table>) -> Self {
        Schema { tables }
    }

    /// All committed tables in document order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Iterate over tables in document order
    pub fn iter(&self) -> std::slice::Iter<'_, Table> {
        self.tables.iter()
    }

    /// Number of committed tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Get a table by its arena index
    pub fn get(&self, index: TableIndex) -> Option<&Table> {
        self.tables.get(index.0)
    }

    /// Resolve a table's foreign-key targets
    pub fn refs_of<'s>(&'s self, table: &'s Table) -> impl Iterator<Item = &'s Table> + 's {
        table.refs.iter().filter_map(move |&index| self.get(index))
    }

    /// Find the first table with the given code
    pub fn find_by_code(&self, code: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.code == code)
    }

    /// Consume the schema, returning the tables in document order
    pub fn into_tables(self) -> Vec<Table> {
        self.tables
    }
}

impl Index<TableIndex> for Schema {
    type Output = Table;

    fn index(&self, index: TableIndex) -> &Table {
        &self.tables[index.0]
    }
}

impl<'s> IntoIterator for &'s Schema {
    type Item = &'s Table;
    type IntoIter = std::slice::Iter<'s, Table>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(col_type: Option<ColumnType>, length: Option<u32>, precision: Option<u32>) -> Column {
        Column {
            name: "c".into(),
            col_type,
            col_length: length,
            col_precision: precision,
            ..Column::default()
        }
    }

    #[test]
    fn test_effective_length() {
        assert_eq!(
            column(Some(ColumnType::VarChar), None, None).effective_length(),
            Some(Length::Size(255))
        );
        assert_eq!(
            column(Some(ColumnType::VarChar), Some(40), None).effective_length(),
            Some(Length::Size(40))
        );
        assert_eq!(
            column(Some(ColumnType::Decimal), Some(12), Some(4)).effective_length(),
            Some(Length::Decimal { digits: 12, scale: 4 })
        );
        assert_eq!(
            column(Some(ColumnType::Decimal), None, Some(4)).effective_length(),
            Some(Length::Decimal { digits: 9, scale: 4 })
        );
        assert_eq!(
            column(Some(ColumnType::Char), None, Some(4)).effective_length(),
            Some(Length::Size(50))
        );
        assert_eq!(column(Some(ColumnType::Int), None, None).effective_length(), None);
        assert_eq!(column(None, None, None).effective_length(), None);
    }

    #[test]
    fn test_refs_of() {
        let parent = Table {
            code: "a".into(),
            ..Table::default()
        };
        let child = Table {
            code: "b".into(),
            refs: vec![TableIndex(0)],
            ..Table::default()
        };
        let schema = Schema::new(vec![parent, child]);

        let b = schema.find_by_code("b").unwrap();
        let targets: Vec<&str> = schema.refs_of(b).map(|t| t.code.as_str()).collect();
        assert_eq!(targets, vec!["a"]);
        assert_eq!(schema[TableIndex(0)].code, "a");
        assert_eq!(schema.refs_of(&schema[TableIndex(0)]).count(), 0);
    }
}
