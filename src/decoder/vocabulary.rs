//! Element vocabulary of the schema export dialect
//!
//! Tag names are matched as full qualified strings. `classify_open` decodes
//! each element opening into exactly one [`Open`] variant, so the
//! definition/reference ambiguity of `o:Table` (and `o:Column`, `o:Key`) is
//! settled by attribute presence before the state machine sees it.

use phf::phf_map;

use crate::xml::Tag;

const ID: &str = "Id";
const REF: &str = "Ref";

/// Scalar field elements whose text is collected into staging records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    Name = 0,
    Code = 1,
    DataType = 2,
    Length = 3,
    Precision = 4,
    Comment = 5,
    Mandatory = 6,
}

impl Field {
    pub(crate) const COUNT: usize = 7;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Table,
    Column,
    Reference,
    Key,
    ParentTable,
    ChildTable,
    PrimaryKey,
    Field(Field),
}

static VOCABULARY: phf::Map<&'static str, Marker> = phf_map! {
    "o:Table" => Marker::Table,
    "o:Column" => Marker::Column,
    "o:Reference" => Marker::Reference,
    "o:Key" => Marker::Key,
    "c:ParentTable" => Marker::ParentTable,
    "c:ChildTable" => Marker::ChildTable,
    "c:PrimaryKey" => Marker::PrimaryKey,
    "a:Name" => Marker::Field(Field::Name),
    "a:Code" => Marker::Field(Field::Code),
    "a:DataType" => Marker::Field(Field::DataType),
    "a:Length" => Marker::Field(Field::Length),
    "a:Precision" => Marker::Field(Field::Precision),
    "a:Comment" => Marker::Field(Field::Comment),
    "a:Column.Mandatory" => Marker::Field(Field::Mandatory),
};

/// Meaning of an element opening
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Open<'t> {
    TableDefinition { id: &'t str },
    TableReference { id: &'t str },
    ColumnDefinition { id: Option<&'t str> },
    ColumnReference { id: &'t str },
    ReferenceDefinition { id: Option<&'t str> },
    KeyDefinition { id: Option<&'t str> },
    KeyReference { id: &'t str },
    ParentTable,
    ChildTable,
    PrimaryKey,
    Field(Field),
    /// Any other `o:` object; skipped when nested in a staged entity
    Object,
    /// Collections and unrecognized attributes; transparent
    Other,
}

pub(crate) fn classify_open<'t>(tag: &Tag<'t>) -> Open<'t> {
    let Some(&marker) = VOCABULARY.get(tag.name()) else {
        return if tag.prefix() == Some("o") {
            Open::Object
        } else {
            Open::Other
        };
    };

    let id = tag.attr(ID);
    let reference = tag.attr(REF);
    match (marker, id, reference) {
        (Marker::Table, Some(id), _) => Open::TableDefinition { id },
        (Marker::Table, None, Some(id)) => Open::TableReference { id },
        (Marker::Column, None, Some(id)) => Open::ColumnReference { id },
        (Marker::Column, id, _) => Open::ColumnDefinition { id },
        (Marker::Key, None, Some(id)) => Open::KeyReference { id },
        (Marker::Key, id, _) => Open::KeyDefinition { id },
        (Marker::Reference, id, None) => Open::ReferenceDefinition { id },
        (Marker::Table | Marker::Reference, _, _) => Open::Object,
        (Marker::ParentTable, _, _) => Open::ParentTable,
        (Marker::ChildTable, _, _) => Open::ChildTable,
        (Marker::PrimaryKey, _, _) => Open::PrimaryKey,
        (Marker::Field(field), _, _) => Open::Field(field),
    }
}
