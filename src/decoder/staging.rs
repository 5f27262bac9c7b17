//! Staging records
//!
//! Partially filled entities that live only while their element is open.
//! Each record remembers the element depth it opened at; the state machine
//! commits it on the close at that same depth.

use super::vocabulary::Field;
use crate::schema::{Column, ReferenceEnd};

/// Scalar field text collected for one table or column
#[derive(Debug, Default)]
pub(crate) struct FieldCollector {
    values: [Option<String>; Field::COUNT],
    /// Field element currently receiving text, with its depth
    pending: Option<(Field, usize)>,
}

impl FieldCollector {
    /// Start a field element; a repeated field replaces the earlier value
    pub fn open(&mut self, field: Field, depth: usize) {
        self.values[field as usize] = Some(String::new());
        self.pending = Some((field, depth));
    }

    pub fn close(&mut self, depth: usize) {
        if matches!(self.pending, Some((_, d)) if d == depth) {
            self.pending = None;
        }
    }

    /// Append text if it is the direct content of the pending field
    pub fn text(&mut self, depth: usize, content: &str) {
        if let Some((field, d)) = self.pending {
            if d == depth {
                self.values[field as usize]
                    .get_or_insert_with(String::new)
                    .push_str(content);
            }
        }
    }

    pub fn take(&mut self, field: Field) -> Option<String> {
        self.values[field as usize].take()
    }

    /// Take a field trimmed; blank counts as absent
    pub fn take_trimmed(&mut self, field: Field) -> Option<String> {
        self.take(field).and_then(|value| {
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
    }
}

#[derive(Debug)]
pub(crate) struct StagedColumn {
    pub id: Option<String>,
    pub column: Column,
}

#[derive(Debug)]
pub(crate) struct TableStage {
    pub id: String,
    pub depth: usize,
    pub fields: FieldCollector,
    pub columns: Vec<StagedColumn>,
    pub keys: Vec<KeyStage>,
    /// Key id named by `c:PrimaryKey`
    pub primary_key: Option<String>,
}

impl TableStage {
    pub fn new(id: &str, depth: usize) -> Self {
        TableStage {
            id: id.to_string(),
            depth,
            fields: FieldCollector::default(),
            columns: Vec::new(),
            keys: Vec::new(),
            primary_key: None,
        }
    }

    /// Mark the columns belonging to the primary key; false if the key is unknown
    pub fn apply_primary_key(&mut self, key_id: &str) -> bool {
        let Some(key) = self.keys.iter().find(|k| k.id.as_deref() == Some(key_id)) else {
            return false;
        };
        for staged in &mut self.columns {
            if staged.id.as_ref().is_some_and(|id| key.columns.contains(id)) {
                staged.column.pk = true;
            }
        }
        true
    }
}

#[derive(Debug)]
pub(crate) struct ColumnStage {
    pub id: Option<String>,
    pub depth: usize,
    pub fields: FieldCollector,
}

impl ColumnStage {
    pub fn new(id: Option<&str>, depth: usize) -> Self {
        ColumnStage {
            id: id.map(str::to_string),
            depth,
            fields: FieldCollector::default(),
        }
    }
}

/// Key definition with the ids of its member columns
#[derive(Debug)]
pub(crate) struct KeyStage {
    pub id: Option<String>,
    pub depth: usize,
    pub columns: Vec<String>,
}

impl KeyStage {
    pub fn new(id: Option<&str>, depth: usize) -> Self {
        KeyStage {
            id: id.map(str::to_string),
            depth,
            columns: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct ReferenceStage {
    pub id: Option<String>,
    pub depth: usize,
    pub parent: Option<String>,
    pub child: Option<String>,
}

impl ReferenceStage {
    pub fn new(id: Option<&str>, depth: usize) -> Self {
        ReferenceStage {
            id: id.map(str::to_string),
            depth,
            parent: None,
            child: None,
        }
    }

    /// Copy a closed endpoint marker into the record
    pub fn record(&mut self, slot: EndpointSlot) {
        let Some(table) = slot.table else { return };
        match slot.end {
            ReferenceEnd::Parent => self.parent = Some(table),
            ReferenceEnd::Child => self.child = Some(table),
        }
    }
}

/// Transient slot for an open `c:ParentTable` / `c:ChildTable` marker
#[derive(Debug)]
pub(crate) struct EndpointSlot {
    pub end: ReferenceEnd,
    pub depth: usize,
    pub table: Option<String>,
}

impl EndpointSlot {
    pub fn new(end: ReferenceEnd, depth: usize) -> Self {
        EndpointSlot {
            end,
            depth,
            table: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_routed_to_pending_field_only() {
        let mut fields = FieldCollector::default();
        fields.text(3, "ignored");
        fields.open(Field::Name, 3);
        fields.text(3, " Cust");
        fields.text(4, "nested");
        fields.text(3, "omer ");
        fields.close(3);
        fields.text(3, "after");
        assert_eq!(fields.take_trimmed(Field::Name).as_deref(), Some("Customer"));
        assert_eq!(fields.take(Field::Name), None);
    }

    #[test]
    fn test_blank_field_is_absent() {
        let mut fields = FieldCollector::default();
        fields.open(Field::Code, 2);
        fields.text(2, "  \n ");
        fields.close(2);
        assert_eq!(fields.take_trimmed(Field::Code), None);
    }

    #[test]
    fn test_repeated_field_replaces() {
        let mut fields = FieldCollector::default();
        fields.open(Field::Comment, 2);
        fields.text(2, "first");
        fields.close(2);
        fields.open(Field::Comment, 2);
        fields.text(2, "second");
        fields.close(2);
        assert_eq!(fields.take(Field::Comment).as_deref(), Some("second"));
    }

    #[test]
    fn test_primary_key_marks_member_columns() {
        let mut table = TableStage::new("o1", 1);
        for (id, name) in [("c1", "id"), ("c2", "label")] {
            table.columns.push(StagedColumn {
                id: Some(id.into()),
                column: Column {
                    name: name.into(),
                    ..Column::default()
                },
            });
        }
        let mut key = KeyStage::new(Some("k1"), 3);
        key.columns.push("c1".into());
        table.keys.push(key);

        assert!(!table.apply_primary_key("k9"));
        assert!(table.apply_primary_key("k1"));
        let pk: Vec<bool> = table.columns.iter().map(|c| c.column.pk).collect();
        assert_eq!(pk, vec![true, false]);
    }

    #[test]
    fn test_endpoint_without_table_leaves_record() {
        let mut reference = ReferenceStage::new(None, 2);
        reference.record(EndpointSlot::new(ReferenceEnd::Parent, 3));
        assert_eq!(reference.parent, None);

        let mut slot = EndpointSlot::new(ReferenceEnd::Child, 3);
        slot.table = Some("o7".into());
        reference.record(slot);
        assert_eq!(reference.child.as_deref(), Some("o7"));
    }
}
