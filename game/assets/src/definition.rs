use std::collections::HashMap;

use common::*;

use crate::capability::{Capability, CapabilityMask, CapabilityQuality};
use crate::DefNameId;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Category {
    RawMaterial,
    Food,
    Tool,
    Furniture,
    None,
}

impl Default for Category {
    fn default() -> Self {
        Category::None
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Distribution {
    Uniform,
    Clumped(ClumpingParams),
    Spaced(SpacingParams),
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ClumpingParams {
    pub clump_size_min: u32,
    pub clump_size_max: u32,
    pub clump_radius_min: f32,
    pub clump_radius_max: f32,
    pub clump_spacing_min: f32,
    pub clump_spacing_max: f32,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SpacingParams {
    pub min_distance: f32,
}

/// Proximity restriction, e.g. "within 3 tiles of Water"
#[derive(Clone, PartialEq, Debug)]
pub struct NearSurface {
    pub surface: u8,
    pub distance: u32,
}

#[derive(Clone, PartialEq, Debug)]
pub struct BiomePlacement {
    pub biome: u8,
    pub spawn_chance: f32,
    pub distribution: Distribution,
    pub near_surface: Option<NearSurface>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RelationshipKind {
    Requires,
    Affinity,
    Avoids,
}

#[derive(Clone, PartialEq, Debug)]
pub enum RelationshipTarget {
    ByName(String),
    ByGroup(String),
    Same,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub target: RelationshipTarget,
    pub distance: f32,
    pub strength: f32,
    pub penalty: f32,
    pub required: bool,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct ItemProperties {
    pub stack_size: u32,
    pub edible_nutrition: Option<f32>,
    pub edible_quality: Option<CapabilityQuality>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct HarvestableCapability {
    pub yield_def_name: String,
    pub yield_id: DefNameId,
    pub amount_min: u32,
    pub amount_max: u32,
    pub duration: f32,
    pub destructive: bool,
    pub regrowth_seconds: f32,
    /// Finite pool of remaining harvests, if any
    pub total_pool: Option<u32>,
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct StorageCapability {
    pub max_slots: u32,
    pub max_stack: u32,
    pub accepted_categories: Vec<Category>,
}

/// A single loaded entity type, interned and indexed by the catalog.
#[derive(Clone, Debug)]
pub struct AssetDefinition {
    pub def_name: String,
    pub id: DefNameId,
    pub label: String,
    pub category: Category,
    pub hands_required: u8,
    pub item: Option<ItemProperties>,
    pub capabilities: CapabilityMask,
    pub biome_placement: Vec<BiomePlacement>,
    pub groups: Vec<String>,
    pub relationships: Vec<Relationship>,
    pub storage: Option<StorageCapability>,
    pub harvestable: Option<HarvestableCapability>,
}

impl AssetDefinition {
    pub fn has_capability(&self, cap: Capability) -> bool {
        self.capabilities.contains(cap)
    }

    pub fn biome_rule(&self, biome: u8) -> Option<&BiomePlacement> {
        self.biome_placement.iter().find(|b| b.biome == biome)
    }
}

/// Builder used by catalog loaders (synthetic registration, tests, future
/// definition-file parsing) to assemble a definition before interning.
#[derive(Clone, Debug, Default)]
pub struct AssetDefinitionBuilder {
    pub def_name: String,
    pub label: String,
    pub category: Category,
    pub hands_required: u8,
    pub item: Option<ItemProperties>,
    pub capabilities: CapabilityMask,
    pub biome_placement: Vec<BiomePlacement>,
    pub groups: Vec<String>,
    pub relationships: Vec<Relationship>,
    pub storage: Option<StorageCapability>,
    pub harvestable: Option<HarvestableCapability>,
}

impl AssetDefinitionBuilder {
    pub fn new(def_name: impl Into<String>) -> Self {
        Self {
            def_name: def_name.into(),
            category: Category::None,
            hands_required: 1,
            ..Default::default()
        }
    }

    pub(crate) fn build(self, id: DefNameId) -> AssetDefinition {
        AssetDefinition {
            def_name: self.def_name,
            id,
            label: self.label,
            category: self.category,
            hands_required: self.hands_required,
            item: self.item,
            capabilities: self.capabilities,
            biome_placement: self.biome_placement,
            groups: self.groups,
            relationships: self.relationships,
            storage: self.storage,
            harvestable: self.harvestable,
        }
    }
}

pub(crate) type GroupIndex = HashMap<String, Vec<DefNameId>>;
