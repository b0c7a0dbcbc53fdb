use ahash::AHashMap;

use assets::DefNameId;
use unit::WorldPosition;

use crate::placed::PlacedEntity;

pub const DEFAULT_CELL_SIZE: f32 = 4.0;

/// Which entities a [`SpatialIndex`] query should consider.
pub enum EntityFilter<'a> {
    Any,
    Name(DefNameId),
    Names(&'a [DefNameId]),
}

impl EntityFilter<'_> {
    fn matches(&self, def_name: DefNameId) -> bool {
        match self {
            EntityFilter::Any => true,
            EntityFilter::Name(n) => *n == def_name,
            EntityFilter::Names(names) => names.contains(&def_name),
        }
    }
}

fn cell_of(pos: WorldPosition, cell_size: f32) -> (i32, i32) {
    (
        (pos.x() / cell_size).floor() as i32,
        (pos.y() / cell_size).floor() as i32,
    )
}

/// `(cell_x << 32) | cell_y`, with each half reinterpreted from its signed
/// coordinate so negative cells get distinct, non-colliding keys.
fn cell_key(cx: i32, cy: i32) -> u64 {
    ((cx as u32 as u64) << 32) | (cy as u32 as u64)
}

/// Grid-hashed per-chunk store of placed static entities.
///
/// Owns entity storage directly; the index is rebuilt wholesale by the
/// placement executor (one per chunk) rather than incrementally diffed.
pub struct SpatialIndex {
    cell_size: f32,
    cells: AHashMap<u64, Vec<PlacedEntity>>,
    len: usize,
}

impl SpatialIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::default(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, entity: PlacedEntity) {
        let (cx, cy) = cell_of(entity.position, self.cell_size);
        self.cells.entry(cell_key(cx, cy)).or_default().push(entity);
        self.len += 1;
    }

    /// Removes the first entity matching `(position, def_name)` exactly (the
    /// caller's own quantization, e.g. tile-snapped placement positions,
    /// makes this unambiguous in practice). Used by destructive harvest.
    pub fn remove(&mut self, position: WorldPosition, def_name: DefNameId) -> bool {
        let (cx, cy) = cell_of(position, self.cell_size);
        if let Some(bucket) = self.cells.get_mut(&cell_key(cx, cy)) {
            if let Some(idx) = bucket
                .iter()
                .position(|e| e.def_name == def_name && positions_match(e.position, position))
            {
                bucket.remove(idx);
                self.len -= 1;
                return true;
            }
        }
        false
    }

    /// All entities within `radius` metres of `center`, optionally filtered
    /// by defName. Enumerates only the cells intersecting the query's
    /// bounding box.
    pub fn query_radius(
        &self,
        center: WorldPosition,
        radius: f32,
        filter: EntityFilter,
    ) -> Vec<PlacedEntity> {
        let mut results = Vec::new();
        let radius2 = radius * radius;

        self.for_each_in_bbox(center, radius, |entity| {
            if filter.matches(entity.def_name) && center.distance2(entity.position) <= radius2 {
                results.push(*entity);
            }
        });

        results
    }

    /// Short-circuits on the first match; avoids allocating a result vec
    /// when the caller only needs a yes/no answer.
    pub fn has_nearby(&self, center: WorldPosition, radius: f32, filter: EntityFilter) -> bool {
        let radius2 = radius * radius;
        let mut found = false;

        self.for_each_in_bbox_until(center, radius, |entity| {
            if filter.matches(entity.def_name) && center.distance2(entity.position) <= radius2 {
                found = true;
                true // stop
            } else {
                false
            }
        });

        found
    }

    fn for_each_in_bbox(&self, center: WorldPosition, radius: f32, mut f: impl FnMut(&PlacedEntity)) {
        let min = cell_of(WorldPosition::new(center.x() - radius, center.y() - radius), self.cell_size);
        let max = cell_of(WorldPosition::new(center.x() + radius, center.y() + radius), self.cell_size);

        for cy in min.1..=max.1 {
            for cx in min.0..=max.0 {
                if let Some(bucket) = self.cells.get(&cell_key(cx, cy)) {
                    for entity in bucket {
                        f(entity);
                    }
                }
            }
        }
    }

    /// Like [`Self::for_each_in_bbox`] but `f` returns `true` to stop early.
    fn for_each_in_bbox_until(
        &self,
        center: WorldPosition,
        radius: f32,
        mut f: impl FnMut(&PlacedEntity) -> bool,
    ) {
        let min = cell_of(WorldPosition::new(center.x() - radius, center.y() - radius), self.cell_size);
        let max = cell_of(WorldPosition::new(center.x() + radius, center.y() + radius), self.cell_size);

        for cy in min.1..=max.1 {
            for cx in min.0..=max.0 {
                if let Some(bucket) = self.cells.get(&cell_key(cx, cy)) {
                    for entity in bucket {
                        if f(entity) {
                            return;
                        }
                    }
                }
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedEntity> {
        self.cells.values().flatten()
    }
}

fn positions_match(a: WorldPosition, b: WorldPosition) -> bool {
    (a.x() - b.x()).abs() < 0.001 && (a.y() - b.y()).abs() < 0.001
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u32) -> DefNameId {
        DefNameId::new(n)
    }

    #[test]
    fn query_radius_finds_only_entities_in_range() {
        let mut index = SpatialIndex::new(4.0);
        index.insert(PlacedEntity::new(id(1), WorldPosition::new(0.0, 0.0)));
        index.insert(PlacedEntity::new(id(1), WorldPosition::new(100.0, 100.0)));

        let results = index.query_radius(WorldPosition::new(0.5, 0.5), 5.0, EntityFilter::Any);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].position, WorldPosition::new(0.0, 0.0));
    }

    #[test]
    fn query_radius_respects_def_name_filter() {
        let mut index = SpatialIndex::new(4.0);
        index.insert(PlacedEntity::new(id(1), WorldPosition::new(1.0, 1.0)));
        index.insert(PlacedEntity::new(id(2), WorldPosition::new(1.0, 1.0)));

        let results = index.query_radius(WorldPosition::new(0.0, 0.0), 5.0, EntityFilter::Name(id(2)));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].def_name, id(2));
    }

    #[test]
    fn has_nearby_short_circuits() {
        let mut index = SpatialIndex::new(4.0);
        index.insert(PlacedEntity::new(id(1), WorldPosition::new(1.0, 1.0)));
        assert!(index.has_nearby(WorldPosition::new(0.0, 0.0), 5.0, EntityFilter::Any));
        assert!(!index.has_nearby(WorldPosition::new(0.0, 0.0), 0.1, EntityFilter::Any));
    }

    #[test]
    fn remove_deletes_matching_entity_only() {
        let mut index = SpatialIndex::new(4.0);
        index.insert(PlacedEntity::new(id(1), WorldPosition::new(2.0, 2.0)));
        index.insert(PlacedEntity::new(id(1), WorldPosition::new(2.0, 2.0)));

        assert!(index.remove(WorldPosition::new(2.0, 2.0), id(1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn query_spans_multiple_cells() {
        let mut index = SpatialIndex::new(1.0);
        for i in 0..10 {
            index.insert(PlacedEntity::new(id(1), WorldPosition::new(i as f32, 0.0)));
        }
        let results = index.query_radius(WorldPosition::new(5.0, 0.0), 3.0, EntityFilter::Any);
        assert_eq!(results.len(), 7); // positions 2..=8 inclusive within radius 3
    }
}
