use std::collections::HashMap;

use assets::{AssetCatalog, DefNameId, RelationshipTarget};
use common::*;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::PlacementError;

/// Placement spawn order: every `u -> v` relationship (`u` references `v`)
/// becomes a graph edge `v -> u`, so a topological sort naturally yields `v`
/// before `u`. Only defNames with at least one biome placement rule become
/// nodes.
pub struct DependencyGraph {
    spawn_order: Vec<DefNameId>,
}

impl DependencyGraph {
    pub fn empty() -> Self {
        Self {
            spawn_order: Vec::new(),
        }
    }

    pub fn build(catalog: &AssetCatalog) -> Result<Self, PlacementError> {
        let mut graph = DiGraph::<DefNameId, ()>::new();
        let mut nodes: HashMap<DefNameId, NodeIndex> = HashMap::new();

        for def in catalog.definitions() {
            if def.biome_placement.is_empty() {
                continue;
            }
            let u = node_of(def.id, &mut graph, &mut nodes);

            for rel in &def.relationships {
                let targets: Vec<DefNameId> = match &rel.target {
                    RelationshipTarget::Same => continue,
                    RelationshipTarget::ByName(name) => match catalog.get_def_name_id(name) {
                        Some(id) => vec![id],
                        None => {
                            warn!("relationship target not found"; "name" => name);
                            continue;
                        }
                    },
                    RelationshipTarget::ByGroup(group) => catalog.group_members(group).to_vec(),
                };

                for v in targets {
                    let placeable = catalog
                        .get_def_by_id(v)
                        .map(|d| !d.biome_placement.is_empty())
                        .unwrap_or(false);
                    if !placeable {
                        continue;
                    }
                    let v_node = node_of(v, &mut graph, &mut nodes);
                    graph.add_edge(v_node, u, ());
                }
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| {
            let name = catalog
                .get_def_name(graph[cycle.node_id()])
                .unwrap_or("<unknown>")
                .to_owned();
            PlacementError::CyclicDependency(name)
        })?;

        Ok(Self {
            spawn_order: order.into_iter().map(|idx| graph[idx]).collect(),
        })
    }

    pub fn spawn_order(&self) -> &[DefNameId] {
        &self.spawn_order
    }
}

fn node_of(
    id: DefNameId,
    graph: &mut DiGraph<DefNameId, ()>,
    nodes: &mut HashMap<DefNameId, NodeIndex>,
) -> NodeIndex {
    *nodes.entry(id).or_insert_with(|| graph.add_node(id))
}
