use std::collections::BTreeMap;

use serde::Serialize;

use crate::suffix::{compare_by_suffix, starts_with_ignore_case};

/// The generic attribute type given to plain key/value pairs.
pub const DEFAULT_TYPE: &str = "text";

/// Prefix of the keys that only matter to the editor.
pub const EDITOR_PREFIX: &str = "editor_";

/// A single attribute of a declaration: a spawnarg with optional type and
/// documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// Attribute type (`text`, `bool`, `float`, `model`, ...).
    pub kind: String,
    /// Attribute name as written in the declaration.
    pub name: String,
    /// Attribute value, empty for attributes that are only documented.
    pub value: String,
    /// Help text from an `editor_<type> <name>` line.
    pub description: String,
    /// `true` when the attribute was copied in from an ancestor.
    pub inherited: bool,
}

impl Attribute {
    /// Create a local attribute.
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            value: value.into(),
            description: description.into(),
            inherited: false,
        }
    }

    /// Create a plain `text` key/value attribute.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(DEFAULT_TYPE, name, value, "")
    }

    /// Copy of this attribute tagged as inherited.
    pub fn as_inherited(&self) -> Self {
        Self {
            inherited: true,
            ..self.clone()
        }
    }

    /// Returns `true` for `editor_*` keys.
    pub fn is_editor_key(&self) -> bool {
        starts_with_ignore_case(&self.name, EDITOR_PREFIX)
    }

    /// Combine an incoming attribute into this one.
    ///
    /// The existing value is kept unless it is empty; an empty description or
    /// a generic type is upgraded from the incoming attribute. The existing
    /// inherited flag is kept, so a local attribute stays local.
    fn merged_with(&self, incoming: &Attribute) -> Self {
        let pick = |existing: &String, other: &String, replaceable: bool| {
            if replaceable && !other.is_empty() {
                other.clone()
            } else {
                existing.clone()
            }
        };

        Self {
            kind: pick(&self.kind, &incoming.kind, self.kind_is_replaceable_by(incoming)),
            name: self.name.clone(),
            value: pick(&self.value, &incoming.value, self.value.is_empty()),
            description: pick(
                &self.description,
                &incoming.description,
                self.description.is_empty(),
            ),
            inherited: self.inherited,
        }
    }

    fn kind_is_replaceable_by(&self, incoming: &Attribute) -> bool {
        self.kind.is_empty() || (self.kind == DEFAULT_TYPE && incoming.kind != DEFAULT_TYPE)
    }

    /// Pick up type and description from an ancestor's attribute of the same
    /// name. The value is never touched.
    fn adopt_documentation(&mut self, ancestor: &Attribute) {
        if self.kind_is_replaceable_by(ancestor) && !ancestor.kind.is_empty() {
            self.kind = ancestor.kind.clone();
        }
        if self.description.is_empty() {
            self.description = ancestor.description.clone();
        }
    }
}

/// Attributes of one declaration, keyed case-insensitively by name.
///
/// Iteration order is the lowercased name order, which keeps listings and
/// exports stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttributeTable {
    entries: BTreeMap<String, Attribute>,
}

impl AttributeTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(name: &str) -> String {
        name.to_ascii_lowercase()
    }

    /// Look up an attribute, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries.get(&Self::key(name))
    }

    /// Value of an attribute, or the empty string when absent.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).map_or("", |a| a.value.as_str())
    }

    /// Value of a locally declared (non-inherited) attribute, or the empty string.
    pub fn local_value(&self, name: &str) -> &str {
        match self.get(name) {
            Some(attr) if !attr.inherited => attr.value.as_str(),
            _ => "",
        }
    }

    /// Insert an attribute, merging with an existing same-named entry.
    ///
    /// The stored entry is replaced wholesale by the merge result, see
    /// [`Attribute`] for the merge rule.
    pub fn set(&mut self, attr: Attribute) {
        let key = Self::key(&attr.name);
        let merged = match self.entries.get(&key) {
            Some(existing) => existing.merged_with(&attr),
            None => attr,
        };
        self.entries.insert(key, merged);
    }

    /// Take over an attribute from an ancestor.
    ///
    /// An absent attribute is copied in and flagged inherited. One that already
    /// exists only picks up a missing type or description, so a value-less
    /// local declaration stays empty.
    pub fn inherit(&mut self, attr: &Attribute) {
        let key = Self::key(&attr.name);
        match self.entries.get_mut(&key) {
            Some(existing) => existing.adopt_documentation(attr),
            None => {
                self.entries.insert(key, attr.as_inherited());
            }
        }
    }

    /// Returns `true` if an attribute with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&Self::key(name))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every attribute.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over all attributes.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.values()
    }

    /// Visit attributes, skipping `editor_*` keys unless `include_editor_keys`.
    pub fn for_each(&self, mut visitor: impl FnMut(&Attribute), include_editor_keys: bool) {
        self.iter()
            .filter(|attr| include_editor_keys || !attr.is_editor_key())
            .for_each(|attr| visitor(attr));
    }

    /// All attributes whose name starts with `prefix` (ignoring case), in
    /// suffix order.
    pub fn prefixed(&self, prefix: &str, include_inherited: bool) -> Vec<&Attribute> {
        let mut matches: Vec<&Attribute> = self
            .iter()
            .filter(|attr| starts_with_ignore_case(&attr.name, prefix))
            .filter(|attr| include_inherited || !attr.inherited)
            .collect();
        matches.sort_by(|a, b| compare_by_suffix(prefix.len(), &a.name, &b.name));
        matches
    }
}
