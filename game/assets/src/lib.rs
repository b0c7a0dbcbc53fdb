use common::derive_more::{From, Into};
use common::*;

pub use capability::{Capability, CapabilityMask, CapabilityQuality};
pub use catalog::AssetCatalog;
pub use definition::{
    AssetDefinition, AssetDefinitionBuilder, BiomePlacement, Category, ClumpingParams,
    Distribution, HarvestableCapability, ItemProperties, NearSurface, Relationship,
    RelationshipKind, RelationshipTarget, SpacingParams, StorageCapability,
};
pub use error::AssetError;
pub use recipe::{RecipeBuilder, RecipeCatalog, RecipeDef, RecipeInput, RecipeOutput};
pub use template::{Template, TemplateCache};

mod capability;
mod catalog;
mod definition;
mod error;
mod recipe;
mod template;

/// Interned id for a defName. 0 is reserved and never handed out by
/// [`AssetCatalog::build`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Into, From)]
pub struct DefNameId(pub u32);

impl DefNameId {
    pub const INVALID: Self = Self(0);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl Default for DefNameId {
    fn default() -> Self {
        Self::INVALID
    }
}

impl Debug for DefNameId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "DefNameId({})", self.0)
    }
}

slog_value_debug!(DefNameId);
slog_kv_debug!(DefNameId, "def_name_id");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AssetDefinitionBuilder;

    fn builder(name: &str) -> AssetDefinitionBuilder {
        AssetDefinitionBuilder::new(name)
    }

    #[test]
    fn interning_assigns_sequential_ids_starting_at_one() {
        let catalog = AssetCatalog::build(vec![builder("Stone"), builder("Stick")]);
        assert_eq!(catalog.get_def_name_id("Stone"), Some(DefNameId::new(1)));
        assert_eq!(catalog.get_def_name_id("Stick"), Some(DefNameId::new(2)));
        assert_eq!(catalog.get_def_name_id("Missing"), None);
    }

    #[test]
    fn capability_mask_round_trips() {
        let mut def = builder("Berries");
        def.capabilities = Capability::Edible | Capability::Carryable;
        let catalog = AssetCatalog::build(vec![def]);
        let id = catalog.get_def_name_id("Berries").unwrap();
        assert!(catalog.has_capability(id, Capability::Edible));
        assert!(!catalog.has_capability(id, Capability::Sleepable));
    }

    #[test]
    fn group_membership_is_indexed() {
        let mut oak = builder("TreeOak");
        oak.groups.push("trees".to_owned());
        let mut pine = builder("TreePine");
        pine.groups.push("trees".to_owned());

        let catalog = AssetCatalog::build(vec![oak, pine]);
        let members = catalog.group_members("trees");
        assert_eq!(members.len(), 2);
        assert!(catalog.group_members("flowers").is_empty());
    }

    #[test]
    fn register_synthetic_is_idempotent() {
        let mut catalog = AssetCatalog::build(vec![builder("Stone")]);
        let a = catalog.register_synthetic("BioPile", Capability::Waste.into());
        let b = catalog.register_synthetic("BioPile", Capability::Waste.into());
        assert_eq!(a, b);
    }

    #[test]
    fn template_cache_is_stable_per_name() {
        let mut catalog = AssetCatalog::build(vec![builder("Rock")]);
        let id = catalog.get_def_name_id("Rock").unwrap();
        let first = *catalog.get_template(id).unwrap();
        let second = *catalog.get_template(id).unwrap();
        assert_eq!(first, second);
    }
}
