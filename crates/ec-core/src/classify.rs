use std::fmt;

use serde::Serialize;

use crate::entity_class::EntityClass;

/// Name of the class that is always treated as a speaker.
pub const SPEAKER_CLASS: &str = "speaker";

/// The kind of scene object the editor creates for an entity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    /// A light source.
    Light,
    /// The `speaker` class and its subclasses.
    Speaker,
    /// Fixed-size entity rendered with a model.
    EntityClassModel,
    /// Fixed-size entity without a model, drawn as a box.
    Generic,
    /// Variable-size entity made of brushes and patches.
    StaticGeometry,
}

impl ClassType {
    /// All class types, in classification priority order.
    pub const ALL: [ClassType; 5] = [
        ClassType::Light,
        ClassType::Speaker,
        ClassType::EntityClassModel,
        ClassType::Generic,
        ClassType::StaticGeometry,
    ];

    /// Parse a type name as printed by [`fmt::Display`], ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.to_string().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Speaker => write!(f, "speaker"),
            Self::EntityClassModel => write!(f, "model"),
            Self::Generic => write!(f, "generic"),
            Self::StaticGeometry => write!(f, "static"),
        }
    }
}

/// Whether the class is offered in editor lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Shown normally.
    Normal,
    /// Hidden from lists: `editor_visibility hidden`, or no source text.
    Hidden,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Hidden => write!(f, "hidden"),
        }
    }
}

/// Classify a resolved entity class. First match wins:
/// light, speaker, model, generic, static geometry.
pub fn classify(class: &EntityClass) -> ClassType {
    if class.is_light() {
        return ClassType::Light;
    }

    let root = class.inheritance_chain().first().map(String::as_str);
    if class.name() == SPEAKER_CLASS || root == Some(SPEAKER_CLASS) {
        return ClassType::Speaker;
    }

    if !class.is_fixed_size() {
        return ClassType::StaticGeometry;
    }

    if class.attribute_value("model", true).is_empty() {
        ClassType::Generic
    } else {
        ClassType::EntityClassModel
    }
}
