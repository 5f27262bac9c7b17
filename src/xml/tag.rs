//! Start-tag view handed to scan handlers
//!
//! Names are namespace-qualified strings (`o:Table`); prefixes are not
//! resolved against namespace declarations.

use std::borrow::Cow;

/// A parsed attribute with its value entity-decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    pub name: &'a str,
    pub value: Cow<'a, str>,
}

/// Element opening event data, valid for the duration of one callback
#[derive(Debug, Clone, Copy)]
pub struct Tag<'t> {
    name: &'t str,
    attributes: &'t [Attribute<'t>],
}

impl<'t> Tag<'t> {
    pub fn new(name: &'t str, attributes: &'t [Attribute<'t>]) -> Self {
        Tag { name, attributes }
    }

    /// Full qualified name, e.g. `o:Table`
    pub fn name(&self) -> &'t str {
        self.name
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&'t str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn attributes(&self) -> &'t [Attribute<'t>] {
        self.attributes
    }

    /// Get an attribute value by name
    pub fn attr(&self, name: &str) -> Option<&'t str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_ref())
    }
}
