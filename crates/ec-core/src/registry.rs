use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;

use slotmap::{SlotMap, new_key_type};
use tracing::{debug, warn};

use crate::config::RegistryConfig;
use crate::diagnostic::Diagnostic;
use crate::entity_class::EntityClass;
use crate::error::{EcError, EcResult};
use crate::model_def::ModelDef;
use crate::resolver::{ClassResolver, ModelResolver};
use crate::source::{DeclBlock, DeclSource, EntityDefBlock, ModelDefBlock};

new_key_type! {
    /// Stable handle to an entity class. Stays valid across reloads.
    pub struct EntityClassId;
    /// Stable handle to a model def. Stays valid across reloads.
    pub struct ModelDefId;
    /// Handle returned when registering a reload listener.
    pub struct ListenerKey;
}

type ReloadListener = Box<dyn Fn(&DeclarationRegistry)>;

/// Owns every entity class and model def by name.
///
/// Declarations are created once per name and never removed. Reloading
/// refills the existing objects, so an [`EntityClassId`] obtained before
/// [`reload_defs`](Self::reload_defs) keeps pointing at the same class and
/// sees the new content.
pub struct DeclarationRegistry {
    config: RegistryConfig,

    classes: SlotMap<EntityClassId, EntityClass>,
    class_names: BTreeMap<String, EntityClassId>,

    models: SlotMap<ModelDefId, ModelDef>,
    model_names: BTreeMap<String, ModelDefId>,

    listeners: SlotMap<ListenerKey, ReloadListener>,
    diagnostics: Vec<Diagnostic>,

    /// Incremented on every parse pass, used to spot redefinitions.
    parse_stamp: u32,
}

impl Default for DeclarationRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl fmt::Debug for DeclarationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeclarationRegistry")
            .field("classes", &self.classes.len())
            .field("models", &self.models.len())
            .field("listeners", &self.listeners.len())
            .field("diagnostics", &self.diagnostics.len())
            .finish()
    }
}

impl DeclarationRegistry {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            classes: SlotMap::with_key(),
            class_names: BTreeMap::new(),
            models: SlotMap::with_key(),
            model_names: BTreeMap::new(),
            listeners: SlotMap::with_key(),
            diagnostics: Vec::new(),
            parse_stamp: 0,
        }
    }

    /// The configuration the registry was created with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Parse everything `source` provides and resolve inheritance.
    ///
    /// Diagnostics from earlier passes are discarded. Listeners are not
    /// notified; see [`reload_defs`](Self::reload_defs).
    pub fn load_defs(&mut self, source: &dyn DeclSource) {
        self.diagnostics.clear();
        self.parse_source(source);
        self.resolve_all();
    }

    /// Re-read `source` and refill every existing declaration in place.
    ///
    /// Declarations that no longer appear in the source are kept, empty and
    /// hidden. Listeners are called once everything is resolved.
    pub fn reload_defs(&mut self, source: &dyn DeclSource) {
        let default_colour = self.config.default_colour;
        for class in self.classes.values_mut() {
            class.clear(default_colour);
        }
        for model in self.models.values_mut() {
            model.clear();
        }

        self.load_defs(source);

        for listener in self.listeners.values() {
            listener(self);
        }
    }

    fn parse_source(&mut self, source: &dyn DeclSource) {
        self.parse_stamp += 1;

        let load = source.load();
        self.diagnostics.extend(load.diagnostics);

        for block in &load.blocks {
            match block {
                DeclBlock::EntityDef(block) => self.insert_class_block(block),
                DeclBlock::Model(block) => self.insert_model_block(block),
            }
        }

        debug!(
            "parsed {} blocks: {} entity classes, {} model defs",
            load.blocks.len(),
            self.classes.len(),
            self.models.len()
        );
    }

    fn insert_class_block(&mut self, block: &EntityDefBlock) {
        if block.name.is_empty() {
            return;
        }

        let default_colour = self.config.default_colour;
        let id = match self.class_names.get(&block.name) {
            Some(&id) => id,
            None => {
                let id = self
                    .classes
                    .insert(EntityClass::new(block.name.as_str(), default_colour));
                self.class_names.insert(block.name.clone(), id);
                id
            }
        };

        let class = &mut self.classes[id];
        if class.parse_stamp() == self.parse_stamp {
            warn!("entity class {} redefined in {}", block.name, block.source.file);
            self.diagnostics.push(
                Diagnostic::warning(format!("entity class \"{}\" redefined", block.name))
                    .in_file(block.source.file.clone()),
            );
        }

        class.populate(block, default_colour, &mut self.diagnostics);
        class.set_parse_stamp(self.parse_stamp);
    }

    fn insert_model_block(&mut self, block: &ModelDefBlock) {
        if block.name.is_empty() {
            return;
        }

        let id = match self.model_names.get(&block.name) {
            Some(&id) => id,
            None => {
                let id = self.models.insert(ModelDef::new(block.name.as_str()));
                self.model_names.insert(block.name.clone(), id);
                id
            }
        };

        let model = &mut self.models[id];
        if model.parse_stamp() == self.parse_stamp {
            warn!("model {} redefined in {}", block.name, block.source.file);
            self.diagnostics.push(
                Diagnostic::warning(format!("model \"{}\" redefined", block.name))
                    .in_file(block.source.file.clone()),
            );
        }

        model.populate(block);
        model.set_parse_stamp(self.parse_stamp);
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolve every model def, then every entity class.
    pub fn resolve_all(&mut self) {
        let ids: Vec<EntityClassId> = self.class_names.values().copied().collect();
        self.resolve_classes(&ids);
    }

    /// Resolve one class and its ancestors. A no-op for resolved classes.
    pub fn resolve_class(&mut self, id: EntityClassId) {
        if self.classes.get(id).is_some_and(EntityClass::is_resolved) {
            return;
        }
        self.resolve_classes(&[id]);
    }

    fn resolve_classes(&mut self, ids: &[EntityClassId]) {
        self.resolve_models();

        let pending: Vec<EntityClassId> = self
            .classes
            .iter()
            .filter(|(_, class)| !class.is_resolved())
            .map(|(id, _)| id)
            .collect();

        let mut resolver = ClassResolver::new(
            &mut self.classes,
            &self.class_names,
            &self.config,
            &mut self.diagnostics,
        );
        for &id in ids {
            resolver.resolve(id);
        }

        // Classes resolved in this pass pick up their model def
        for id in pending {
            if self.classes.get(id).is_some_and(EntityClass::is_resolved) {
                self.link_model_def(id);
            }
        }
    }

    fn resolve_models(&mut self) {
        let ids: Vec<ModelDefId> = self.model_names.values().copied().collect();
        let mut resolver = ModelResolver {
            models: &mut self.models,
            names: &self.model_names,
            diagnostics: &mut self.diagnostics,
        };
        for id in ids {
            resolver.resolve(id);
        }
    }

    /// A class whose model path names a model def renders that def's mesh
    /// with its skin.
    fn link_model_def(&mut self, id: EntityClassId) {
        let Some(class) = self.classes.get_mut(id) else {
            return;
        };
        let Some(model) = self
            .model_names
            .get(class.model_path())
            .and_then(|model_id| self.models.get(*model_id))
        else {
            return;
        };
        let (mesh, skin) = (model.mesh().to_string(), model.skin().to_string());
        class.set_model_path(&mesh);
        class.set_skin(&skin);
    }

    // -----------------------------------------------------------------------
    // Entity classes
    // -----------------------------------------------------------------------

    /// Return the class called `name`, creating a hidden placeholder if there
    /// is none. The placeholder is variable-size, so it classifies as static
    /// geometry, unless `fixed_size` asks for the default box.
    ///
    /// Returns `None` only for an empty name.
    pub fn find_or_insert(&mut self, name: &str, fixed_size: bool) -> Option<EntityClassId> {
        if name.is_empty() {
            return None;
        }
        if let Some(&id) = self.class_names.get(name) {
            return Some(id);
        }

        debug!("creating placeholder entity class {}", name);
        let class = EntityClass::placeholder(name, fixed_size, self.config.default_colour);
        let id = self.classes.insert(class);
        self.class_names.insert(name.to_string(), id);
        Some(id)
    }

    /// Look up a class id by exact name.
    pub fn find_class(&self, name: &str) -> Option<EntityClassId> {
        self.class_names.get(name).copied()
    }

    /// Get a class by id.
    pub fn class(&self, id: EntityClassId) -> Option<&EntityClass> {
        self.classes.get(id)
    }

    /// Get a mutable class by id.
    pub fn class_mut(&mut self, id: EntityClassId) -> Option<&mut EntityClass> {
        self.classes.get_mut(id)
    }

    /// Look up a class by exact name.
    pub fn class_by_name(&self, name: &str) -> Option<&EntityClass> {
        self.find_class(name).and_then(|id| self.classes.get(id))
    }

    /// Look up a class by exact name, failing if it does not exist.
    pub fn require_class(&self, name: &str) -> EcResult<&EntityClass> {
        self.class_by_name(name)
            .ok_or_else(|| EcError::UnknownClass(name.to_string()))
    }

    /// All classes, ordered by name.
    pub fn classes(&self) -> impl Iterator<Item = (EntityClassId, &EntityClass)> {
        self.class_names
            .values()
            .filter_map(|&id| self.classes.get(id).map(|class| (id, class)))
    }

    /// Visit every class in name order.
    pub fn for_each_class(&self, mut visitor: impl FnMut(&EntityClass)) {
        for (_, class) in self.classes() {
            visitor(class);
        }
    }

    /// Number of registered classes, placeholders included.
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    // -----------------------------------------------------------------------
    // Model defs
    // -----------------------------------------------------------------------

    /// Look up a model def id by exact name.
    pub fn find_model(&self, name: &str) -> Option<ModelDefId> {
        self.model_names.get(name).copied()
    }

    /// Get a model def by id.
    pub fn model(&self, id: ModelDefId) -> Option<&ModelDef> {
        self.models.get(id)
    }

    /// Look up a model def by exact name.
    pub fn model_by_name(&self, name: &str) -> Option<&ModelDef> {
        self.find_model(name).and_then(|id| self.models.get(id))
    }

    /// Look up a model def by exact name, failing if it does not exist.
    pub fn require_model(&self, name: &str) -> EcResult<&ModelDef> {
        self.model_by_name(name)
            .ok_or_else(|| EcError::UnknownModel(name.to_string()))
    }

    /// All model defs, ordered by name.
    pub fn models(&self) -> impl Iterator<Item = (ModelDefId, &ModelDef)> {
        self.model_names
            .values()
            .filter_map(|&id| self.models.get(id).map(|model| (id, model)))
    }

    /// Visit every model def in name order.
    pub fn for_each_model(&self, mut visitor: impl FnMut(&ModelDef)) {
        for (_, model) in self.models() {
            visitor(model);
        }
    }

    /// Number of registered model defs.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    // -----------------------------------------------------------------------
    // Notifications and diagnostics
    // -----------------------------------------------------------------------

    /// Call `listener` after every completed [`reload_defs`](Self::reload_defs).
    ///
    /// Listeners get shared access only, so they cannot start another reload.
    pub fn on_defs_reloaded(
        &mut self,
        listener: impl Fn(&DeclarationRegistry) + 'static,
    ) -> ListenerKey {
        self.listeners.insert(Box::new(listener))
    }

    /// Unregister a listener. Returns `false` if it was already removed.
    pub fn remove_listener(&mut self, key: ListenerKey) -> bool {
        self.listeners.remove(key).is_some()
    }

    /// Problems found by the last load or reload.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Take the collected diagnostics, leaving none behind.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

impl Index<EntityClassId> for DeclarationRegistry {
    type Output = EntityClass;

    fn index(&self, id: EntityClassId) -> &EntityClass {
        &self.classes[id]
    }
}

impl Index<ModelDefId> for DeclarationRegistry {
    type Output = ModelDef;

    fn index(&self, id: ModelDefId) -> &ModelDef {
        &self.models[id]
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::classify::{ClassType, Visibility};
    use crate::math::{Vector3, Vector4};
    use crate::source::SourceInfo;

    fn class_block(name: &str, pairs: &[(&str, &str)]) -> DeclBlock {
        DeclBlock::EntityDef(EntityDefBlock {
            name: name.to_string(),
            pairs: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            source: SourceInfo::new("def/test.def", "base"),
        })
    }

    fn model_block(
        name: &str,
        inherit: Option<&str>,
        mesh: Option<&str>,
        anims: &[(&str, &str)],
    ) -> DeclBlock {
        DeclBlock::Model(ModelDefBlock {
            name: name.to_string(),
            inherit: inherit.map(str::to_string),
            mesh: mesh.map(str::to_string),
            skin: None,
            anims: anims
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            source: SourceInfo::new("def/models.def", "base"),
        })
    }

    fn load(blocks: Vec<DeclBlock>) -> DeclarationRegistry {
        let mut registry = DeclarationRegistry::default();
        registry.load_defs(&blocks);
        registry
    }

    fn has_warning(registry: &DeclarationRegistry, needle: &str) -> bool {
        registry
            .diagnostics()
            .iter()
            .any(|d| !d.is_error() && d.message.contains(needle))
    }

    #[test]
    fn three_level_inheritance() {
        let registry = load(vec![
            class_block("grandparent", &[("health", "100"), ("speed", "1"), ("team", "0")]),
            class_block("parent", &[("inherit", "grandparent"), ("speed", "2")]),
            class_block("child", &[("inherit", "parent"), ("team", "3")]),
        ]);

        let child = registry.class_by_name("child").unwrap();
        assert_eq!(child.attribute_value("team", true), "3");
        assert_eq!(child.attribute_value("speed", true), "2");
        assert_eq!(child.attribute_value("health", true), "100");

        assert_eq!(child.attribute_value("team", false), "3");
        assert_eq!(child.attribute_value("speed", false), "");
        assert_eq!(child.attribute_value("health", false), "");

        assert_eq!(child.inheritance_chain(), ["grandparent", "parent", "child"]);
        assert!(child.is_of_type("grandparent"));
        assert!(!child.is_of_type("sibling"));
        assert!(child.attribute("health", true).unwrap().inherited);
    }

    #[test]
    fn local_declaration_without_value_stays_empty() {
        let registry = load(vec![
            class_block("parent", &[("noshadows", "1")]),
            class_block(
                "child",
                &[("inherit", "parent"), ("editor_bool noshadows", "Disable shadows")],
            ),
        ]);

        let child = registry.class_by_name("child").unwrap();
        assert_eq!(child.attribute_value("noshadows", false), "");
        assert_eq!(child.attribute_value("noshadows", true), "");
        let attr = child.attribute("noshadows", true).unwrap();
        assert!(!attr.inherited);
        assert_eq!(attr.kind, "bool");
        assert_eq!(attr.description, "Disable shadows");

        let parent = registry.class_by_name("parent").unwrap();
        assert_eq!(parent.attribute_value("noshadows", false), "1");
    }

    #[test]
    fn editor_keys_are_inherited_and_merged() {
        let registry = load(vec![
            class_block("base", &[("editor_bool solid", "Whether it blocks"), ("solid", "1")]),
            class_block("derived", &[("inherit", "base"), ("solid", "0")]),
        ]);

        let derived = registry.class_by_name("derived").unwrap();
        let solid = derived.attribute("solid", true).unwrap();
        assert_eq!(solid.value, "0");
        assert_eq!(solid.kind, "bool");
        assert_eq!(solid.description, "Whether it blocks");
        assert!(!solid.inherited);
        assert!(derived.attribute("editor_bool solid", true).unwrap().inherited);
    }

    #[test]
    fn resolve_is_idempotent() {
        let mut registry = load(vec![
            class_block("parent", &[("speed", "2")]),
            class_block("child", &[("inherit", "parent")]),
        ]);
        let id = registry.find_class("child").unwrap();
        let before = registry[id].attributes().clone();

        registry.resolve_class(id);
        registry.resolve_all();

        assert_eq!(registry[id].attributes(), &before);
        assert_eq!(registry[id].inheritance_chain(), ["parent", "child"]);
    }

    #[test]
    fn reload_keeps_identity_and_refills() {
        let mut registry = load(vec![class_block("monster", &[("health", "50")])]);
        let id = registry.find_class("monster").unwrap();

        registry.reload_defs(&vec![class_block("monster", &[("health", "80")])]);

        assert_eq!(registry.find_class("monster"), Some(id));
        assert_eq!(registry[id].attribute_value("health", true), "80");
        assert_eq!(registry.class_count(), 1);
    }

    #[test]
    fn reload_picks_up_new_parent() {
        let mut registry = load(vec![
            class_block("a", &[("editor_light", "1")]),
            class_block("b", &[("editor_mins", "-1 -1 -1"), ("editor_maxs", "1 1 1")]),
            class_block("child", &[("inherit", "a")]),
        ]);
        let id = registry.find_class("child").unwrap();
        assert_eq!(registry[id].class_type(), ClassType::Light);

        registry.reload_defs(&vec![
            class_block("a", &[("editor_light", "1")]),
            class_block("b", &[("editor_mins", "-1 -1 -1"), ("editor_maxs", "1 1 1")]),
            class_block("child", &[("inherit", "b")]),
        ]);

        assert_eq!(registry[id].class_type(), ClassType::Generic);
        assert_eq!(registry[id].inheritance_chain(), ["b", "child"]);
    }

    #[test]
    fn removed_declaration_stays_empty_and_hidden() {
        let mut registry = load(vec![
            class_block("keep", &[]),
            class_block("gone", &[("health", "10")]),
        ]);
        let id = registry.find_class("gone").unwrap();

        registry.reload_defs(&vec![class_block("keep", &[])]);

        let gone = &registry[id];
        assert!(gone.attributes().is_empty());
        assert_eq!(gone.visibility(), Visibility::Hidden);
        assert!(gone.source().is_none());
        assert_eq!(registry.find_class("gone"), Some(id));
    }

    #[test]
    fn reload_notifies_listeners_once() {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);

        let mut registry = load(vec![class_block("a", &[])]);
        let key = registry.on_defs_reloaded(move |registry| {
            assert!(registry.class_by_name("a").is_some_and(|c| c.is_resolved()));
            seen.set(seen.get() + 1);
        });

        registry.load_defs(&vec![class_block("a", &[])]);
        assert_eq!(calls.get(), 0);

        registry.reload_defs(&vec![class_block("a", &[])]);
        assert_eq!(calls.get(), 1);

        assert!(registry.remove_listener(key));
        assert!(!registry.remove_listener(key));
        registry.reload_defs(&vec![class_block("a", &[])]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn light_with_fixed_bounds() {
        let registry = load(vec![class_block(
            "light",
            &[("editor_light", "1"), ("editor_mins", "-8 -8 -8"), ("editor_maxs", "8 8 8")],
        )]);
        let light = registry.class_by_name("light").unwrap();
        assert_eq!(light.class_type(), ClassType::Light);
        assert!(light.is_fixed_size());
    }

    #[test]
    fn light_flag_is_inherited() {
        let registry = load(vec![
            class_block("light", &[("spawnclass", "idLight")]),
            class_block("light_torch", &[("inherit", "light")]),
        ]);
        let torch = registry.class_by_name("light_torch").unwrap();
        assert!(torch.is_light());
        assert_eq!(torch.class_type(), ClassType::Light);
    }

    #[test]
    fn question_mark_bounds_are_static_geometry() {
        let registry = load(vec![class_block(
            "func_static",
            &[("editor_mins", "?"), ("editor_maxs", "?"), ("model", "models/a.lwo")],
        )]);
        assert_eq!(
            registry.class_by_name("func_static").unwrap().class_type(),
            ClassType::StaticGeometry
        );
    }

    #[test]
    fn speaker_and_subclasses() {
        let registry = load(vec![
            class_block(
                "speaker",
                &[("editor_mins", "-4 -4 -4"), ("editor_maxs", "4 4 4"), ("model", "x.lwo")],
            ),
            class_block("speaker_ambient", &[("inherit", "speaker")]),
        ]);
        assert_eq!(registry.class_by_name("speaker").unwrap().class_type(), ClassType::Speaker);
        assert_eq!(
            registry.class_by_name("speaker_ambient").unwrap().class_type(),
            ClassType::Speaker
        );
    }

    #[test]
    fn model_decides_between_model_and_generic() {
        let bounds = [("editor_mins", "-4 -4 0"), ("editor_maxs", "4 4 8")];
        let mut with_model = bounds.to_vec();
        with_model.push(("model", "models/items/key.lwo"));

        let registry = load(vec![
            class_block("item_key", &with_model),
            class_block("item_box", &bounds),
        ]);
        assert_eq!(
            registry.class_by_name("item_key").unwrap().class_type(),
            ClassType::EntityClassModel
        );
        assert_eq!(registry.class_by_name("item_box").unwrap().class_type(), ClassType::Generic);
    }

    #[test]
    fn hidden_parent_does_not_hide_child() {
        let registry = load(vec![
            class_block("ai_base", &[("editor_visibility", "hidden")]),
            class_block("ai_guard", &[("inherit", "ai_base")]),
        ]);
        assert_eq!(registry.class_by_name("ai_base").unwrap().visibility(), Visibility::Hidden);
        assert_eq!(registry.class_by_name("ai_guard").unwrap().visibility(), Visibility::Normal);
    }

    #[test]
    fn cyclic_inheritance_terminates() {
        let registry = load(vec![
            class_block("a", &[("inherit", "b"), ("from_a", "1")]),
            class_block("b", &[("inherit", "c"), ("from_b", "1")]),
            class_block("c", &[("inherit", "a"), ("from_c", "1")]),
        ]);

        for name in ["a", "b", "c"] {
            let class = registry.class_by_name(name).unwrap();
            assert!(class.is_resolved());
            assert_eq!(class.attribute_value(&format!("from_{name}"), false), "1");
            assert_eq!(class.inheritance_chain().len(), 3);
            assert_eq!(class.inheritance_chain().last().unwrap(), name);
        }
        assert!(has_warning(&registry, "cyclic inheritance"));
    }

    #[test]
    fn self_inheritance_is_no_parent() {
        let registry = load(vec![class_block("loop", &[("inherit", "loop")])]);
        let class = registry.class_by_name("loop").unwrap();
        assert_eq!(class.inheritance_chain(), ["loop"]);
        assert!(registry.diagnostics().is_empty());
    }

    #[test]
    fn missing_parent_warns() {
        let registry = load(vec![class_block(
            "orphan",
            &[("inherit", "doesNotExist"), ("health", "5")],
        )]);
        let orphan = registry.class_by_name("orphan").unwrap();

        assert!(orphan.is_resolved());
        assert_eq!(orphan.attribute_value("health", true), "5");
        assert_eq!(orphan.inheritance_chain(), ["orphan"]);
        assert!(has_warning(&registry, "unknown parent class \"doesNotExist\""));
        assert_eq!(registry.diagnostics()[0].file.as_deref(), Some("def/test.def"));
    }

    #[test]
    fn redefinition_warns_and_last_wins() {
        let registry = load(vec![
            class_block("dup", &[("health", "1")]),
            class_block("dup", &[("health", "2")]),
        ]);
        assert_eq!(registry.class_by_name("dup").unwrap().attribute_value("health", true), "2");
        assert!(has_warning(&registry, "redefined"));
    }

    #[test]
    fn find_or_insert_creates_stable_placeholder() {
        let mut registry = DeclarationRegistry::default();
        assert_eq!(registry.find_or_insert("", false), None);

        let id = registry.find_or_insert("worldspawn_custom", false).unwrap();
        assert_eq!(registry.find_or_insert("worldspawn_custom", true), Some(id));
        assert_eq!(registry[id].class_type(), ClassType::StaticGeometry);
        assert_eq!(registry[id].visibility(), Visibility::Hidden);

        // The declaration arrives later and fills the same object
        registry.reload_defs(&vec![class_block("worldspawn_custom", &[("editor_light", "1")])]);
        assert_eq!(registry.find_class("worldspawn_custom"), Some(id));
        assert_eq!(registry[id].class_type(), ClassType::Light);
        assert_eq!(registry[id].visibility(), Visibility::Normal);
    }

    #[test]
    fn unknown_placeholder_is_static_unless_sized() {
        let mut registry = DeclarationRegistry::default();

        let unknown = registry.find_or_insert("unknown_thing", false).unwrap();
        assert_eq!(registry[unknown].class_type(), ClassType::StaticGeometry);
        assert_eq!(registry[unknown].visibility(), Visibility::Hidden);

        let boxed = registry.find_or_insert("unknown_prop", true).unwrap();
        assert_eq!(registry[boxed].class_type(), ClassType::Generic);
        assert!(registry[boxed].bounds().is_some());
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let registry = load(vec![class_block("Monster_Imp", &[("Health", "30")])]);
        assert!(registry.class_by_name("monster_imp").is_none());
        assert!(registry.require_class("monster_imp").is_err());

        let imp = registry.require_class("Monster_Imp").unwrap();
        assert_eq!(imp.attribute_value("HEALTH", true), "30");
    }

    #[test]
    fn colour_resolution_order() {
        let config = RegistryConfig::default()
            .with_colour_override("worldspawn", Vector3::new(0.0, 0.0, 0.0));
        let mut registry = DeclarationRegistry::new(config);
        registry.load_defs(&vec![
            class_block("worldspawn", &[("editor_color", "1 1 1")]),
            class_block("glass", &[("editor_color", "0 1 0"), ("editor_transparent", "1")]),
            class_block("glass_pane", &[("inherit", "glass")]),
            class_block("broken", &[("editor_color", "red")]),
        ]);

        let colour = |name: &str| registry.class_by_name(name).unwrap().colour();
        assert_eq!(colour("worldspawn"), Vector4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(colour("glass"), Vector4::new(0.0, 1.0, 0.0, 0.5));
        assert_eq!(colour("glass_pane"), Vector4::new(0.0, 1.0, 0.0, 0.5));
        assert_eq!(colour("broken"), Vector4::new(0.3, 0.3, 1.0, 1.0));
    }

    #[test]
    fn model_defs_resolve_and_link() {
        let registry = load(vec![
            model_block(
                "guard_base",
                None,
                Some("models\\md5\\guard.md5mesh"),
                &[("idle", "idle.md5anim"), ("walk", "walk.md5anim")],
            ),
            model_block("guard_elite", Some("guard_base"), None, &[("idle", "elite_idle.md5anim")]),
            class_block(
                "ai_guard",
                &[
                    ("model", "guard_elite"),
                    ("editor_mins", "-16 -16 0"),
                    ("editor_maxs", "16 16 72"),
                ],
            ),
        ]);

        let elite = registry.model_by_name("guard_elite").unwrap();
        assert_eq!(elite.mesh(), "models/md5/guard.md5mesh");
        assert_eq!(elite.anim("idle"), Some("elite_idle.md5anim"));
        assert_eq!(elite.anim("walk"), Some("walk.md5anim"));

        let guard = registry.class_by_name("ai_guard").unwrap();
        assert_eq!(guard.model_path(), "models/md5/guard.md5mesh");
        assert_eq!(guard.class_type(), ClassType::EntityClassModel);
    }

    #[test]
    fn model_def_cycles_and_missing_parents_terminate() {
        let registry = load(vec![
            model_block("a", Some("b"), Some("a.md5mesh"), &[]),
            model_block("b", Some("a"), None, &[("run", "b_run")]),
            model_block("orphan", Some("nowhere"), None, &[]),
        ]);

        assert!(registry.model_by_name("a").unwrap().is_resolved());
        assert_eq!(registry.model_by_name("b").unwrap().mesh(), "a.md5mesh");
        assert!(registry.require_model("orphan").is_ok());
        assert!(has_warning(&registry, "inherits unknown model \"nowhere\""));
    }

    #[test]
    fn take_diagnostics_drains() {
        let mut registry = load(vec![class_block("orphan", &[("inherit", "missing")])]);
        assert_eq!(registry.take_diagnostics().len(), 1);
        assert!(registry.diagnostics().is_empty());
    }
}
