//! Column Type Catalog
//!
//! The closed set of column types a schema export may declare. Each type has
//! a numeric identity and one or more spellings; the first spelling listed
//! for an identity in [`CATALOG`] is its canonical name. Name lookup ignores
//! ASCII case.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Supported column type, discriminant = numeric identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[repr(u8)]
pub enum ColumnType {
    Byte = 0,
    TinyInt = 1,
    SmallInt = 2,
    MediumInt = 3,
    #[cfg_attr(feature = "serde", serde(alias = "INTEGER"))]
    Int = 4,
    BigInt = 5,
    Float = 6,
    Double = 7,
    #[cfg_attr(feature = "serde", serde(alias = "NUMERIC"))]
    Decimal = 8,
    Number = 9,
    Date = 10,
    Time = 11,
    Year = 12,
    DateTime = 13,
    Timestamp = 14,
    Char = 15,
    VarChar = 16,
    TinyBlob = 17,
    TinyText = 18,
    Blob = 19,
    Text = 20,
    MediumBlob = 21,
    MediumText = 22,
    LongBlob = 23,
    LongText = 24,
}

/// Every spelling in declaration order. Aliases follow the name they alias,
/// so the first entry for an identity is its canonical name.
pub const CATALOG: &[(&str, ColumnType)] = &[
    ("BYTE", ColumnType::Byte),
    ("TINYINT", ColumnType::TinyInt),
    ("SMALLINT", ColumnType::SmallInt),
    ("MEDIUMINT", ColumnType::MediumInt),
    ("INT", ColumnType::Int),
    ("INTEGER", ColumnType::Int),
    ("BIGINT", ColumnType::BigInt),
    ("FLOAT", ColumnType::Float),
    ("DOUBLE", ColumnType::Double),
    ("DECIMAL", ColumnType::Decimal),
    ("NUMERIC", ColumnType::Decimal),
    ("NUMBER", ColumnType::Number),
    ("DATE", ColumnType::Date),
    ("TIME", ColumnType::Time),
    ("YEAR", ColumnType::Year),
    ("DATETIME", ColumnType::DateTime),
    ("TIMESTAMP", ColumnType::Timestamp),
    ("CHAR", ColumnType::Char),
    ("VARCHAR", ColumnType::VarChar),
    ("TINYBLOB", ColumnType::TinyBlob),
    ("TINYTEXT", ColumnType::TinyText),
    ("BLOB", ColumnType::Blob),
    ("TEXT", ColumnType::Text),
    ("MEDIUMBLOB", ColumnType::MediumBlob),
    ("MEDIUMTEXT", ColumnType::MediumText),
    ("LONGBLOB", ColumnType::LongBlob),
    ("LONGTEXT", ColumnType::LongText),
];

/// Storage length of a column, either declared or the catalog default
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Length {
    Size(u32),
    /// Total digits and digits after the decimal point
    Decimal { digits: u32, scale: u32 },
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Size(size) => write!(f, "({size})"),
            Length::Decimal { digits, scale } => write!(f, "({digits},{scale})"),
        }
    }
}

/// Broad grouping used by generators to pick target-language types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TypeFamily {
    Integer,
    Float,
    Temporal,
    Text,
}

/// A declared type split into catalog entry and optional size suffix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeclaredType {
    pub col_type: ColumnType,
    pub length: Option<u32>,
    pub precision: Option<u32>,
}

impl ColumnType {
    /// All types in identity order
    pub const ALL: [ColumnType; 25] = [
        ColumnType::Byte,
        ColumnType::TinyInt,
        ColumnType::SmallInt,
        ColumnType::MediumInt,
        ColumnType::Int,
        ColumnType::BigInt,
        ColumnType::Float,
        ColumnType::Double,
        ColumnType::Decimal,
        ColumnType::Number,
        ColumnType::Date,
        ColumnType::Time,
        ColumnType::Year,
        ColumnType::DateTime,
        ColumnType::Timestamp,
        ColumnType::Char,
        ColumnType::VarChar,
        ColumnType::TinyBlob,
        ColumnType::TinyText,
        ColumnType::Blob,
        ColumnType::Text,
        ColumnType::MediumBlob,
        ColumnType::MediumText,
        ColumnType::LongBlob,
        ColumnType::LongText,
    ];

    /// Case-insensitive lookup by any spelling
    pub fn lookup(name: &str) -> Result<Self> {
        CATALOG
            .iter()
            .find(|(spelling, _)| spelling.eq_ignore_ascii_case(name))
            .map(|&(_, col_type)| col_type)
            .ok_or_else(|| Error::UnknownColumnType {
                type_name: name.to_string(),
                column: None,
            })
    }

    /// Parse declared type text such as `int`, `varchar(50)` or `decimal(10,2)`
    pub fn parse_declared(text: &str) -> Result<DeclaredType> {
        let text = text.trim();
        let unknown = || Error::UnknownColumnType {
            type_name: text.to_string(),
            column: None,
        };

        let Some((base, suffix)) = text.split_once('(') else {
            return Ok(DeclaredType {
                col_type: Self::lookup(text)?,
                length: None,
                precision: None,
            });
        };

        let col_type = Self::lookup(base.trim()).map_err(|_| unknown())?;
        let args = suffix.trim_end().strip_suffix(')').ok_or_else(unknown)?;
        let mut parts = args.split(',').map(|part| part.trim().parse::<u32>());
        let length = parts.next().transpose().map_err(|_| unknown())?;
        let precision = parts.next().transpose().map_err(|_| unknown())?;
        if parts.next().is_some() {
            return Err(unknown());
        }

        Ok(DeclaredType {
            col_type,
            length,
            precision,
        })
    }

    #[inline]
    pub fn identity(self) -> u8 {
        self as u8
    }

    pub fn from_identity(identity: u8) -> Option<Self> {
        Self::ALL.get(usize::from(identity)).copied()
    }

    /// First-declared spelling for this type
    pub fn canonical_name(self) -> &'static str {
        CATALOG
            .iter()
            .find(|&&(_, col_type)| col_type == self)
            .map(|&(spelling, _)| spelling)
            .unwrap_or_default()
    }

    pub fn default_length(self) -> Option<Length> {
        use ColumnType::*;
        match self {
            Decimal => Some(Length::Decimal { digits: 9, scale: 2 }),
            Char => Some(Length::Size(50)),
            VarChar | TinyBlob | TinyText | Blob | Text => Some(Length::Size(255)),
            MediumBlob | MediumText | LongBlob | LongText => Some(Length::Size(65535)),
            _ => None,
        }
    }

    pub fn family(self) -> TypeFamily {
        use ColumnType::*;
        match self {
            Byte | TinyInt | SmallInt | MediumInt | Int | BigInt | Number => TypeFamily::Integer,
            Float | Double | Decimal => TypeFamily::Float,
            Date | Time | Year | DateTime | Timestamp => TypeFamily::Temporal,
            Char | VarChar | TinyBlob | TinyText | Blob | Text | MediumBlob | MediumText
            | LongBlob | LongText => TypeFamily::Text,
        }
    }
}

/// Canonical name for a numeric identity
pub fn canonical_name_for(identity: u8) -> Option<&'static str> {
    ColumnType::from_identity(identity).map(ColumnType::canonical_name)
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::lookup(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        for spelling in ["varchar", "VARCHAR", "VarChar", "vArChAr"] {
            assert_eq!(ColumnType::lookup(spelling).unwrap(), ColumnType::VarChar);
        }
    }

    #[test]
    fn test_aliases_share_identity() {
        let int = ColumnType::lookup("int").unwrap();
        let integer = ColumnType::lookup("Integer").unwrap();
        assert_eq!(int, integer);
        assert_eq!(integer.identity(), 4);
        assert_eq!(integer.canonical_name(), "INT");

        let numeric = ColumnType::lookup("numeric").unwrap();
        assert_eq!(numeric, ColumnType::Decimal);
        assert_eq!(canonical_name_for(numeric.identity()), Some("DECIMAL"));
    }

    #[test]
    fn test_unknown_type() {
        match ColumnType::lookup("geometry") {
            Err(Error::UnknownColumnType { type_name, column }) => {
                assert_eq!(type_name, "geometry");
                assert_eq!(column, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_identities_are_dense() {
        for (identity, col_type) in ColumnType::ALL.iter().enumerate() {
            assert_eq!(usize::from(col_type.identity()), identity);
            assert_eq!(ColumnType::from_identity(identity as u8), Some(*col_type));
            assert!(!col_type.canonical_name().is_empty());
        }
        assert_eq!(ColumnType::from_identity(25), None);
        assert_eq!(canonical_name_for(200), None);
    }

    #[test]
    fn test_canonical_round_trip() {
        for col_type in ColumnType::ALL {
            let parsed: ColumnType = col_type.to_string().parse().unwrap();
            assert_eq!(parsed, col_type);
        }
    }

    #[test]
    fn test_default_lengths() {
        assert_eq!(
            ColumnType::Decimal.default_length(),
            Some(Length::Decimal { digits: 9, scale: 2 })
        );
        assert_eq!(ColumnType::Char.default_length(), Some(Length::Size(50)));
        assert_eq!(ColumnType::VarChar.default_length(), Some(Length::Size(255)));
        assert_eq!(ColumnType::LongText.default_length(), Some(Length::Size(65535)));
        assert_eq!(ColumnType::Int.default_length(), None);
    }

    #[test]
    fn test_families() {
        assert_eq!(ColumnType::Number.family(), TypeFamily::Integer);
        assert_eq!(ColumnType::Decimal.family(), TypeFamily::Float);
        assert_eq!(ColumnType::Year.family(), TypeFamily::Temporal);
        assert_eq!(ColumnType::MediumBlob.family(), TypeFamily::Text);
    }

    #[test]
    fn test_parse_declared() {
        let plain = ColumnType::parse_declared(" bigint ").unwrap();
        assert_eq!(plain.col_type, ColumnType::BigInt);
        assert_eq!(plain.length, None);

        let sized = ColumnType::parse_declared("varchar(50)").unwrap();
        assert_eq!(sized.col_type, ColumnType::VarChar);
        assert_eq!(sized.length, Some(50));
        assert_eq!(sized.precision, None);

        let numeric = ColumnType::parse_declared("NUMERIC(10, 2)").unwrap();
        assert_eq!(numeric.col_type, ColumnType::Decimal);
        assert_eq!(numeric.length, Some(10));
        assert_eq!(numeric.precision, Some(2));
    }

    #[test]
    fn test_parse_declared_rejects_bad_suffix() {
        for text in ["varchar(abc)", "varchar(50", "decimal(1,2,3)", "geometry(4)"] {
            assert!(
                matches!(ColumnType::parse_declared(text), Err(Error::UnknownColumnType { .. })),
                "{text}"
            );
        }
    }
}
