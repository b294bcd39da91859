use std::cell::Cell;

use tracing::{debug, warn};

use crate::attachments::{AttachmentParser, Attachments};
use crate::attribute::{Attribute, AttributeTable, DEFAULT_TYPE, EDITOR_PREFIX};
use crate::classify::{ClassType, Visibility, classify};
use crate::diagnostic::Diagnostic;
use crate::math::{Aabb, Vector3, Vector4};
use crate::source::{EntityDefBlock, SourceInfo};
use crate::suffix::starts_with_ignore_case;

/// Half-size of the box given to synthesised fixed-size classes.
const DEFAULT_HALF_SIZE: f64 = 8.0;

/// Convert a path to the forward-slash form used for model lookups.
pub fn standard_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// A template for placeable entities, parsed from an `entityDef` block.
///
/// Instances live in the [`DeclarationRegistry`](crate::DeclarationRegistry)
/// and are addressed by [`EntityClassId`](crate::EntityClassId). A reload
/// refills the same instance, so ids stay valid across reloads.
#[derive(Debug, Clone)]
pub struct EntityClass {
    name: String,
    attributes: AttributeTable,

    fixed_size: bool,
    /// Fixed-size flag the class was created with, restored by `clear`.
    default_fixed_size: bool,
    is_light: bool,
    colour: Vector4,
    model_path: String,
    skin: String,
    attachments: Attachments,

    inheritance_chain: Vec<String>,
    resolved: bool,
    classification: Cell<Option<ClassType>>,

    source: Option<SourceInfo>,
    parse_stamp: u32,
}

impl EntityClass {
    pub(crate) fn new(name: impl Into<String>, colour: Vector3) -> Self {
        Self {
            name: name.into(),
            attributes: AttributeTable::new(),
            fixed_size: false,
            default_fixed_size: false,
            is_light: false,
            colour: Vector4::from_rgb(colour, 1.0),
            model_path: String::new(),
            skin: String::new(),
            attachments: Attachments::default(),
            inheritance_chain: Vec::new(),
            resolved: false,
            classification: Cell::new(None),
            source: None,
            parse_stamp: 0,
        }
    }

    /// A class for a name that has no declaration (yet).
    ///
    /// Variable-size unless `fixed_size`, in which case it gets the default box.
    pub(crate) fn placeholder(name: impl Into<String>, fixed_size: bool, colour: Vector3) -> Self {
        let mut class = Self::new(name, colour);
        class.fixed_size = fixed_size;
        class.default_fixed_size = fixed_size;
        class.inheritance_chain = vec![class.name.clone()];
        class.resolved = true;
        class
    }

    // -----------------------------------------------------------------------
    // Identity and provenance
    // -----------------------------------------------------------------------

    /// The class name, exactly as declared.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File and mod this class was last parsed from, `None` if it has no
    /// declaration in the current source.
    pub fn source(&self) -> Option<&SourceInfo> {
        self.source.as_ref()
    }

    /// Mod the class was declared in, `"base"` when unknown.
    pub fn mod_name(&self) -> &str {
        self.source
            .as_ref()
            .map_or(crate::source::DEFAULT_MOD, |s| s.mod_name.as_str())
    }

    pub(crate) fn parse_stamp(&self) -> u32 {
        self.parse_stamp
    }

    pub(crate) fn set_parse_stamp(&mut self, stamp: u32) {
        self.parse_stamp = stamp;
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    /// All attributes, local and inherited.
    pub fn attributes(&self) -> &AttributeTable {
        &self.attributes
    }

    /// Look up an attribute. With `include_inherited == false` only attributes
    /// declared on this class itself are returned.
    pub fn attribute(&self, name: &str, include_inherited: bool) -> Option<&Attribute> {
        self.attributes
            .get(name)
            .filter(|attr| include_inherited || !attr.inherited)
    }

    /// Value of an attribute, or the empty string.
    pub fn attribute_value(&self, name: &str, include_inherited: bool) -> &str {
        self.attribute(name, include_inherited)
            .map_or("", |attr| attr.value.as_str())
    }

    /// Type of an attribute, or the empty string when unknown.
    pub fn attribute_type(&self, name: &str) -> &str {
        self.attributes.get(name).map_or("", |attr| attr.kind.as_str())
    }

    /// Description of an attribute, or the empty string when undocumented.
    pub fn attribute_description(&self, name: &str) -> &str {
        self.attributes
            .get(name)
            .map_or("", |attr| attr.description.as_str())
    }

    /// Visit every attribute, skipping `editor_*` keys unless `editor_keys`.
    pub fn for_each_attribute(&self, visitor: impl FnMut(&Attribute), editor_keys: bool) {
        self.attributes.for_each(visitor, editor_keys);
    }

    /// Attributes starting with `prefix`, ordered by numeric suffix.
    pub fn prefixed_attributes(&self, prefix: &str, include_inherited: bool) -> Vec<&Attribute> {
        self.attributes.prefixed(prefix, include_inherited)
    }

    /// The multi-line usage text built from `editor_usage`, `editor_usage1`, ...
    pub fn usage(&self) -> String {
        self.prefixed_attributes("editor_usage", true)
            .iter()
            .map(|attr| attr.value.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Set an attribute using the table's merge rule.
    ///
    /// Keys that drive derived state (`model`, `editor_light`, `spawnclass`)
    /// update it from the merged value, as they do when a block is parsed.
    pub fn set_attribute(&mut self, attr: Attribute) {
        let name = attr.name.clone();
        self.attributes.set(attr);
        let value = self.attributes.value(&name).to_string();
        self.apply_special_key(&name, &value);
        self.invalidate();
    }

    /// Derived state set by individual keys.
    fn apply_special_key(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("model") {
            self.set_model_path(value);
        } else if key.eq_ignore_ascii_case("editor_light") {
            self.set_is_light(value == "1");
        } else if key.eq_ignore_ascii_case("spawnclass") {
            self.set_is_light(value == "idLight");
        }
    }

    /// Copy a parent attribute in, tagged as inherited.
    pub(crate) fn inherit_attribute(&mut self, attr: &Attribute) {
        self.attributes.inherit(attr);
        self.invalidate();
    }

    // -----------------------------------------------------------------------
    // Inheritance
    // -----------------------------------------------------------------------

    /// The raw `inherit` value declared on this class.
    pub fn parent_name(&self) -> Option<&str> {
        Some(self.attributes.local_value("inherit")).filter(|name| !name.is_empty())
    }

    /// Class names from the root ancestor down to this class.
    pub fn inheritance_chain(&self) -> &[String] {
        &self.inheritance_chain
    }

    /// Returns `true` if this class is `class_name` or derives from it.
    pub fn is_of_type(&self, class_name: &str) -> bool {
        self.inheritance_chain.iter().any(|name| name == class_name)
    }

    /// Returns `true` once inheritance has been resolved.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub(crate) fn set_inheritance_chain(&mut self, chain: Vec<String>) {
        self.inheritance_chain = chain;
        self.invalidate();
    }

    pub(crate) fn set_resolved(&mut self) {
        self.resolved = true;
    }

    // -----------------------------------------------------------------------
    // Derived properties
    // -----------------------------------------------------------------------

    /// Returns `true` if this class represents a light.
    pub fn is_light(&self) -> bool {
        self.is_light
    }

    pub(crate) fn set_is_light(&mut self, is_light: bool) {
        self.is_light = is_light;
        if is_light {
            self.fixed_size = true;
        }
        self.invalidate();
    }

    /// Returns `true` if entities of this class have a fixed size.
    ///
    /// Besides the explicit flag, both `editor_mins` and `editor_maxs` must be
    /// longer than one character: `"?"` marks a variable-size class.
    pub fn is_fixed_size(&self) -> bool {
        self.fixed_size
            || (self.attributes.value("editor_mins").len() > 1
                && self.attributes.value("editor_maxs").len() > 1)
    }

    /// Declared bounds of a fixed-size class.
    pub fn bounds(&self) -> Option<Aabb> {
        if !self.is_fixed_size() {
            return None;
        }
        let corner = |key: &str, fallback: f64| {
            Vector3::parse(self.attributes.value(key))
                .unwrap_or(Vector3::new(fallback, fallback, fallback))
        };
        Some(Aabb::from_min_max(
            corner("editor_mins", -DEFAULT_HALF_SIZE),
            corner("editor_maxs", DEFAULT_HALF_SIZE),
        ))
    }

    /// Display colour.
    pub fn colour(&self) -> Vector4 {
        self.colour
    }

    pub(crate) fn set_colour(&mut self, colour: Vector4) {
        self.colour = colour;
    }

    /// Model path (after model-def linkage, the def's mesh).
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    pub(crate) fn set_model_path(&mut self, path: &str) {
        self.model_path = standard_path(path);
    }

    /// Skin from the linked model def, empty when none.
    pub fn skin(&self) -> &str {
        &self.skin
    }

    pub(crate) fn set_skin(&mut self, skin: &str) {
        self.skin = skin.to_string();
    }

    /// Declared attachments.
    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    /// The class type, computed on first use and cached until the class changes.
    pub fn class_type(&self) -> ClassType {
        if let Some(cached) = self.classification.get() {
            return cached;
        }
        let class_type = classify(self);
        self.classification.set(Some(class_type));
        class_type
    }

    /// Editor visibility. Not inherited: a hidden base class does not hide
    /// its subclasses.
    pub fn visibility(&self) -> Visibility {
        if self.source.is_none() || self.attributes.local_value("editor_visibility") == "hidden" {
            Visibility::Hidden
        } else {
            Visibility::Normal
        }
    }

    fn invalidate(&mut self) {
        self.classification.set(None);
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Reset everything except the name, ready to be refilled.
    pub(crate) fn clear(&mut self, colour: Vector3) {
        self.attributes.clear();
        self.fixed_size = self.default_fixed_size;
        self.is_light = false;
        self.colour = Vector4::from_rgb(colour, 1.0);
        self.model_path.clear();
        self.skin.clear();
        self.attachments = Attachments::default();
        self.inheritance_chain.clear();
        self.resolved = false;
        self.source = None;
        self.invalidate();
    }

    /// Fill this class from a parsed block. Earlier content is discarded.
    pub(crate) fn populate(
        &mut self,
        block: &EntityDefBlock,
        colour: Vector3,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        self.clear(colour);
        self.fixed_size = false;
        self.source = Some(block.source.clone());

        let mut attachments = AttachmentParser::default();

        for (key, value) in &block.pairs {
            self.apply_special_key(key, value);
            if starts_with_ignore_case(key, EDITOR_PREFIX) {
                self.parse_editor_spawnarg(key, value);
            }

            attachments.parse_key(key, value);

            match self.attributes.get(key) {
                Some(existing) if !existing.value.is_empty() => {
                    warn!("attribute {} already set on entity class {}", key, self.name);
                    diagnostics.push(
                        Diagnostic::warning(format!(
                            "attribute \"{key}\" already set on entity class \"{}\"",
                            self.name
                        ))
                        .in_file(block.source.file.clone()),
                    );
                }
                // Absent, or declared by an editor_ line without a value yet
                _ => self.attributes.set(Attribute::text(key.as_str(), value.as_str())),
            }
        }

        self.attachments = attachments.finish(&self.name, &block.source.file, diagnostics);
        self.invalidate();
    }

    /// Handle `editor_<type> <attribute>` keys, which document an attribute
    /// that may be set on entities of this class.
    fn parse_editor_spawnarg(&mut self, key: &str, description: &str) {
        let rest = &key[EDITOR_PREFIX.len()..];

        // Keys like "editor_displayFolder" have no attribute part
        let Some((kind, attr_name)) = rest.split_once(' ') else {
            return;
        };

        if kind.is_empty() || attr_name.is_empty() {
            debug!("skipping malformed editor key \"{}\" on {}", key, self.name);
            return;
        }
        if kind == "setKeyValue" {
            return;
        }

        let kind = match kind {
            "var" | "string" => DEFAULT_TYPE,
            other => other,
        };
        self.attributes
            .set(Attribute::new(kind, attr_name, "", description));
    }
}
