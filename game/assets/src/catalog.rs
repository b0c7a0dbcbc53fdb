use std::collections::HashMap;

use common::*;

use crate::capability::{Capability, CapabilityMask};
use crate::definition::{AssetDefinition, AssetDefinitionBuilder, GroupIndex};
use crate::template::TemplateCache;
use crate::DefNameId;

/// Catalog of every known entity type, interned and indexed once after load.
///
/// IDs are assigned 1..N in registration order; 0 is reserved as invalid.
/// The index is built by [`AssetCatalog::build`] and is never mutated afterwards
/// except through [`AssetCatalog::register_synthetic`], which appends.
pub struct AssetCatalog {
    definitions: Vec<AssetDefinition>,
    by_name: HashMap<String, DefNameId>,
    groups: GroupIndex,
    templates: TemplateCache,
}

impl AssetCatalog {
    /// Builds the catalog from a set of definition builders, assigning interned
    /// ids 1..N and precomputing the group index and capability masks.
    pub fn build(builders: Vec<AssetDefinitionBuilder>) -> Self {
        let mut definitions = Vec::with_capacity(builders.len());
        let mut by_name = HashMap::with_capacity(builders.len());

        for (i, builder) in builders.into_iter().enumerate() {
            let id = DefNameId::new((i + 1) as u32);
            let name = builder.def_name.clone();
            definitions.push(builder.build(id));
            by_name.insert(name, id);
        }

        let mut catalog = Self {
            definitions,
            by_name,
            groups: GroupIndex::default(),
            templates: TemplateCache::default(),
        };
        catalog.rebuild_group_index();
        catalog
    }

    fn rebuild_group_index(&mut self) {
        self.groups.clear();
        for def in &self.definitions {
            for group in &def.groups {
                self.groups.entry(group.clone()).or_default().push(def.id);
            }
        }
    }

    fn index_of(&self, id: DefNameId) -> Option<usize> {
        let idx = id.0.checked_sub(1)? as usize;
        if idx < self.definitions.len() {
            Some(idx)
        } else {
            None
        }
    }

    pub fn get_def(&self, name: &str) -> Option<&AssetDefinition> {
        let id = *self.by_name.get(name)?;
        self.get_def_by_id(id)
    }

    pub fn get_def_by_id(&self, id: DefNameId) -> Option<&AssetDefinition> {
        self.index_of(id).map(|i| &self.definitions[i])
    }

    pub fn get_def_name_id(&self, name: &str) -> Option<DefNameId> {
        self.by_name.get(name).copied()
    }

    pub fn get_def_name(&self, id: DefNameId) -> Option<&str> {
        self.get_def_by_id(id).map(|d| d.def_name.as_str())
    }

    pub fn capability_mask(&self, id: DefNameId) -> CapabilityMask {
        self.get_def_by_id(id)
            .map(|d| d.capabilities)
            .unwrap_or_default()
    }

    pub fn has_capability(&self, id: DefNameId, cap: Capability) -> bool {
        self.capability_mask(id).contains(cap)
    }

    pub fn group_members(&self, group: &str) -> &[DefNameId] {
        self.groups.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn definition_names(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.def_name.as_str())
    }

    pub fn definitions(&self) -> &[AssetDefinition] {
        &self.definitions
    }

    /// Registers an entity type with no placement data, e.g. a generated
    /// harvest yield or waste pile that only needs a capability mask.
    ///
    /// If `name` is already registered, logs a warning and returns the
    /// existing id rather than creating a duplicate.
    pub fn register_synthetic(&mut self, name: &str, mask: CapabilityMask) -> DefNameId {
        if let Some(&existing) = self.by_name.get(name) {
            warn!("synthetic definition already registered"; "name" => name);
            return existing;
        }

        let id = DefNameId::new((self.definitions.len() + 1) as u32);
        let mut builder = AssetDefinitionBuilder::new(name);
        builder.capabilities = mask;
        self.definitions.push(builder.build(id));
        self.by_name.insert(name.to_owned(), id);
        self.rebuild_group_index();
        id
    }

    /// Returns the cached template mesh handle for `id`, generating and
    /// caching it on first request. Populated once per name, never invalidated.
    pub fn get_template(&mut self, id: DefNameId) -> Option<&crate::template::Template> {
        let name = self.get_def_name(id)?.to_owned();
        Some(self.templates.get_or_generate(&name, id))
    }
}
