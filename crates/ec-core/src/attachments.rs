//! `def_attach` style attachments declared on an entity class.
//!
//! Keys are first grouped by their suffix (`def_attach2` / `name_attach2` /
//! `pos_attach2` describe one object), then re-indexed by name once the whole
//! block has been read.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::warn;

use crate::diagnostic::Diagnostic;
use crate::math::Vector3;
use crate::suffix::suffix_of;

const DEF_ATTACH: &str = "def_attach";
const NAME_ATTACH: &str = "name_attach";
const POS_ATTACH: &str = "pos_attach";

const ATTACH_POS_NAME: &str = "attach_pos_name";
const ATTACH_POS_ORIGIN: &str = "attach_pos_origin";
const ATTACH_POS_JOINT: &str = "attach_pos_joint";
const ATTACH_POS_ANGLES: &str = "attach_pos_angles";

/// An entity attached to instances of the class.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attachment {
    /// Entity class of the attached entity.
    pub class_name: String,
    /// Name of the attached entity.
    pub name: String,
    /// Name of the [`AttachPosition`] it is attached at.
    pub position: String,
}

/// A named position that attachments can refer to.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttachPosition {
    /// Name referred to by [`Attachment::position`].
    pub name: String,
    /// Offset from the entity origin, or from `joint` when set.
    pub origin: Vector3,
    /// Rotation of the attached entity.
    pub angles: Vector3,
    /// Optional model joint the origin is relative to.
    pub joint: String,
}

/// Attachments and attach positions of one entity class, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Attachments {
    objects: BTreeMap<String, Attachment>,
    positions: BTreeMap<String, AttachPosition>,
}

impl Attachments {
    /// Attached objects, ordered by name.
    pub fn objects(&self) -> impl Iterator<Item = &Attachment> {
        self.objects.values()
    }

    /// Attach positions, ordered by name.
    pub fn positions(&self) -> impl Iterator<Item = &AttachPosition> {
        self.positions.values()
    }

    /// Returns `true` if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Collects attachment keys while a declaration block is being read.
#[derive(Debug, Default)]
pub(crate) struct AttachmentParser {
    objects: BTreeMap<String, Attachment>,
    positions: BTreeMap<String, AttachPosition>,
}

impl AttachmentParser {
    /// Feed one key/value pair; unrelated keys are ignored.
    pub(crate) fn parse_key(&mut self, key: &str, value: &str) {
        if let Some(suffix) = suffix_of(key, DEF_ATTACH) {
            self.object(suffix).class_name = value.to_string();
        } else if let Some(suffix) = suffix_of(key, NAME_ATTACH) {
            self.object(suffix).name = value.to_string();
        } else if let Some(suffix) = suffix_of(key, POS_ATTACH) {
            self.object(suffix).position = value.to_string();
        } else if let Some(suffix) = suffix_of(key, ATTACH_POS_NAME) {
            self.position(suffix).name = value.to_string();
        } else if let Some(suffix) = suffix_of(key, ATTACH_POS_ORIGIN) {
            self.position(suffix).origin = Vector3::parse(value).unwrap_or_default();
        } else if let Some(suffix) = suffix_of(key, ATTACH_POS_ANGLES) {
            self.position(suffix).angles = Vector3::parse(value).unwrap_or_default();
        } else if let Some(suffix) = suffix_of(key, ATTACH_POS_JOINT) {
            self.position(suffix).joint = value.to_string();
        }
    }

    fn object(&mut self, suffix: &str) -> &mut Attachment {
        self.objects.entry(suffix.to_string()).or_default()
    }

    fn position(&mut self, suffix: &str) -> &mut AttachPosition {
        self.positions.entry(suffix.to_string()).or_default()
    }

    /// Re-index by name and drop objects attached at unknown positions.
    ///
    /// Dropped objects are reported against `file`, the declaring file.
    pub(crate) fn finish(
        self,
        class_name: &str,
        file: &str,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Attachments {
        let positions: BTreeMap<String, AttachPosition> = self
            .positions
            .into_values()
            .filter(|pos| !pos.name.is_empty())
            .map(|pos| (pos.name.clone(), pos))
            .collect();

        let mut objects = BTreeMap::new();
        for object in self.objects.into_values().filter(|o| !o.name.is_empty()) {
            if positions.contains_key(&object.position) {
                objects.insert(object.name.clone(), object);
            } else {
                warn!(
                    "entity class '{}' tries to attach '{}' at non-existent position '{}'",
                    class_name, object.name, object.position
                );
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "entity class \"{class_name}\" tries to attach \"{}\" \
                         at non-existent position \"{}\"",
                        object.name, object.position
                    ))
                    .in_file(file),
                );
            }
        }

        Attachments { objects, positions }
    }
}
