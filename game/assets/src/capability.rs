use common::*;
use enumflags2::{bitflags, BitFlags};

/// What interaction a placed entity or inventory item supports.
///
/// Used by the AI decision evaluator to find an entity that fulfills a need,
/// and by the placement system to tag groups (storage, waste piles).
#[bitflags]
#[repr(u16)]
#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub enum Capability {
    /// Restores hunger when eaten
    Edible,
    /// Restores thirst when drunk from
    Drinkable,
    /// Restores energy when slept on
    Sleepable,
    /// Restores bladder when used
    Toilet,
    /// Waste pile, used to cluster toilet spawn locations
    Waste,
    /// Can be picked up directly into inventory
    Carryable,
    /// Can be harvested for a yield
    Harvestable,
    /// A crafting station
    Craftable,
    /// A storage container
    Storage,
}

pub type CapabilityMask = BitFlags<Capability>;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum CapabilityQuality {
    Terrible,
    Poor,
    Normal,
    Good,
    Excellent,
}

impl Default for CapabilityQuality {
    fn default() -> Self {
        CapabilityQuality::Normal
    }
}

impl CapabilityQuality {
    /// Multiplier applied to a need-restore amount, e.g. Drink's `40 × quality`.
    pub fn as_factor(self) -> f32 {
        match self {
            CapabilityQuality::Terrible => 0.4,
            CapabilityQuality::Poor => 0.7,
            CapabilityQuality::Normal => 1.0,
            CapabilityQuality::Good => 1.3,
            CapabilityQuality::Excellent => 1.6,
        }
    }
}
