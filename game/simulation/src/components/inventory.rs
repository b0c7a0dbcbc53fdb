use ahash::AHashMap;

use assets::DefNameId;

/// A colonist's two hands plus a stack-respecting backpack. Implements an
/// `InventoryFull` policy: backpack inserts never fail outright, they
/// just add as much as fits and report the remainder back to the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inventory {
    pub left_hand: Option<DefNameId>,
    pub right_hand: Option<DefNameId>,
    pub backpack: AHashMap<DefNameId, u32>,
    pub max_slots: u32,
    pub max_stack: u32,
}

impl Inventory {
    pub fn new(max_slots: u32, max_stack: u32) -> Self {
        Self {
            left_hand: None,
            right_hand: None,
            backpack: AHashMap::default(),
            max_slots,
            max_stack,
        }
    }

    pub fn has_free_hand(&self) -> bool {
        self.left_hand.is_none() || self.right_hand.is_none()
    }

    /// Occupies whichever hand is free, preferring the left. Returns `false`
    /// if both hands are already full.
    pub fn hold(&mut self, def_name: DefNameId) -> bool {
        if self.left_hand.is_none() {
            self.left_hand = Some(def_name);
            true
        } else if self.right_hand.is_none() {
            self.right_hand = Some(def_name);
            true
        } else {
            false
        }
    }

    pub fn is_holding(&self, def_name: DefNameId) -> bool {
        self.left_hand == Some(def_name) || self.right_hand == Some(def_name)
    }

    /// Empties whichever hand holds `def_name`, if either does.
    pub fn free_hand_holding(&mut self, def_name: DefNameId) -> bool {
        if self.left_hand == Some(def_name) {
            self.left_hand = None;
            true
        } else if self.right_hand == Some(def_name) {
            self.right_hand = None;
            true
        } else {
            false
        }
    }

    fn used_slots(&self) -> u32 {
        self.backpack.len() as u32
    }

    /// Adds up to `qty` of `def_name` to the backpack, respecting both
    /// `max_stack` per entry and `max_slots` total distinct entries. Returns
    /// the quantity actually added, which may be less than `qty` or zero.
    pub fn add_to_backpack(&mut self, def_name: DefNameId, qty: u32) -> u32 {
        let existing = self.backpack.get(&def_name).copied();
        let room = match existing {
            Some(current) => self.max_stack.saturating_sub(current),
            None => {
                if self.used_slots() >= self.max_slots {
                    0
                } else {
                    self.max_stack
                }
            }
        };

        let added = qty.min(room);
        if added > 0 {
            *self.backpack.entry(def_name).or_insert(0) += added;
        }
        added
    }

    /// Removes up to `qty` of `def_name`, returning the quantity actually
    /// removed. Drops the entry entirely once it hits zero.
    pub fn remove_from_backpack(&mut self, def_name: DefNameId, qty: u32) -> u32 {
        match self.backpack.get_mut(&def_name) {
            Some(current) => {
                let removed = qty.min(*current);
                *current -= removed;
                if *current == 0 {
                    self.backpack.remove(&def_name);
                }
                removed
            }
            None => 0,
        }
    }

    pub fn backpack_count(&self, def_name: DefNameId) -> u32 {
        self.backpack.get(&def_name).copied().unwrap_or(0)
    }
}

/// Stows `def_name` in the backpack if there's room, otherwise leaves it in
/// hand. Standalone and unit-testable: the decision evaluator's
/// hand-freeing path calls this rather than duplicating the slot-vs-drop
/// logic inline.
pub fn stow_or_keep_in_hand(inventory: &mut Inventory, def_name: DefNameId) -> HandOutcome {
    if !inventory.is_holding(def_name) {
        return HandOutcome::NotHeld;
    }

    let stowed = inventory.add_to_backpack(def_name, 1);
    if stowed == 1 {
        inventory.free_hand_holding(def_name);
        HandOutcome::Stowed
    } else {
        HandOutcome::KeptInHand
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum HandOutcome {
    NotHeld,
    Stowed,
    KeptInHand,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> DefNameId {
        DefNameId::new(n)
    }

    #[test]
    fn backpack_respects_max_stack() {
        let mut inv = Inventory::new(4, 3);
        assert_eq!(inv.add_to_backpack(id(1), 5), 3);
        assert_eq!(inv.add_to_backpack(id(1), 5), 0);
    }

    #[test]
    fn backpack_respects_max_slots_for_new_entries() {
        let mut inv = Inventory::new(1, 10);
        assert_eq!(inv.add_to_backpack(id(1), 2), 2);
        assert_eq!(inv.add_to_backpack(id(2), 2), 0);
    }

    #[test]
    fn stow_or_keep_in_hand_stows_when_room() {
        let mut inv = Inventory::new(4, 3);
        inv.hold(id(1));
        assert_eq!(stow_or_keep_in_hand(&mut inv, id(1)), HandOutcome::Stowed);
        assert_eq!(inv.left_hand, None);
        assert_eq!(inv.backpack_count(id(1)), 1);
    }

    #[test]
    fn stow_or_keep_in_hand_keeps_when_full() {
        let mut inv = Inventory::new(0, 0);
        inv.hold(id(1));
        assert_eq!(stow_or_keep_in_hand(&mut inv, id(1)), HandOutcome::KeptInHand);
        assert_eq!(inv.left_hand, Some(id(1)));
    }
}
