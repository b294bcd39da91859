//! Entity class and model def engine: attribute tables, inheritance
//! resolution, classification and a reload-stable declaration registry.
//!
//! This crate knows nothing about declaration text. It consumes parsed
//! blocks through the [`DeclSource`] trait; `ec-dsl` provides sources backed
//! by `.def` files.

/// Entities attached to instances of a class via `def_attach` keys.
pub mod attachments;
/// Typed attributes and the case-insensitive attribute table.
pub mod attribute;
/// Classification of resolved entity classes and editor visibility.
pub mod classify;
/// Registry configuration.
pub mod config;
/// Diagnostics collected while loading declarations.
pub mod diagnostic;
/// The entity class declaration.
pub mod entity_class;
/// Error types used throughout the crate.
pub mod error;
/// Vector and bounding box helpers.
pub mod math;
/// Model def declarations.
pub mod model_def;
/// The declaration registry.
pub mod registry;
mod resolver;
/// Parsed declaration blocks and the source trait.
pub mod source;
/// Ordering of attribute names by numeric suffix.
pub mod suffix;

pub use attribute::{Attribute, AttributeTable};
pub use classify::{ClassType, Visibility};
pub use config::RegistryConfig;
pub use diagnostic::{Diagnostic, Severity};
pub use entity_class::EntityClass;
pub use error::{EcError, EcResult};
pub use math::{Aabb, Vector3, Vector4};
pub use model_def::ModelDef;
pub use registry::{DeclarationRegistry, EntityClassId, ListenerKey, ModelDefId};
pub use source::{DeclBlock, DeclSource, EntityDefBlock, ModelDefBlock, SourceInfo, SourceLoad};
