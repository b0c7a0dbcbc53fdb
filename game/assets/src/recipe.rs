use std::collections::HashMap;

use common::*;

use crate::catalog::AssetCatalog;
use crate::DefNameId;

#[derive(Clone, Debug)]
pub struct RecipeInput {
    pub def_name: String,
    pub def_name_id: DefNameId,
    pub count: u32,
}

#[derive(Clone, Debug)]
pub struct RecipeOutput {
    pub def_name: String,
    pub def_name_id: DefNameId,
    pub count: u32,
}

#[derive(Clone, Debug)]
pub struct RecipeDef {
    pub def_name: String,
    pub id: DefNameId,
    pub label: String,
    pub inputs: Vec<RecipeInput>,
    pub outputs: Vec<RecipeOutput>,
    pub station_def_name: Option<String>,
    pub station_id: Option<DefNameId>,
    pub skill: Option<String>,
    pub work_amount: f32,
    pub innate: bool,
    /// Precomputed for the "colonist knows all inputs" check
    pub input_def_name_ids: Vec<DefNameId>,
}

impl RecipeDef {
    pub fn is_stationless(&self) -> bool {
        self.station_def_name.is_none()
    }

    pub fn has_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }

    pub fn knows_all_inputs(&self, known: impl Fn(DefNameId) -> bool) -> bool {
        self.input_def_name_ids.iter().copied().all(known)
    }
}

#[derive(Clone, Debug, Default)]
pub struct RecipeBuilder {
    pub def_name: String,
    pub label: String,
    pub inputs: Vec<(String, u32)>,
    pub outputs: Vec<(String, u32)>,
    pub station_def_name: Option<String>,
    pub skill: Option<String>,
    pub work_amount: f32,
    pub innate: bool,
}

impl RecipeBuilder {
    pub fn new(def_name: impl Into<String>) -> Self {
        Self {
            def_name: def_name.into(),
            work_amount: 500.0,
            ..Default::default()
        }
    }
}

/// Catalog of crafting recipes, interned against the asset catalog's ids.
///
/// Rebuilds its by-station and innate indices after every load, since inputs
/// reference defNames that may not have been interned yet at construction time.
pub struct RecipeCatalog {
    recipes: Vec<RecipeDef>,
    by_name: HashMap<String, DefNameId>,
    by_station: HashMap<DefNameId, Vec<DefNameId>>,
    stationless: Vec<DefNameId>,
    innate: Vec<DefNameId>,
}

impl RecipeCatalog {
    pub fn build(builders: Vec<RecipeBuilder>, assets: &AssetCatalog) -> Self {
        let mut recipes = Vec::with_capacity(builders.len());
        let mut by_name = HashMap::with_capacity(builders.len());

        for (i, builder) in builders.into_iter().enumerate() {
            let id = DefNameId::new((i + 1) as u32);

            let inputs: Vec<RecipeInput> = builder
                .inputs
                .into_iter()
                .filter_map(|(name, count)| {
                    let def_id = assets.get_def_name_id(&name);
                    if def_id.is_none() {
                        warn!("recipe input not in asset catalog, skipping"; "recipe" => &builder.def_name, "input" => &name);
                    }
                    def_id.map(|def_name_id| RecipeInput {
                        def_name: name,
                        def_name_id,
                        count,
                    })
                })
                .collect();

            let outputs: Vec<RecipeOutput> = builder
                .outputs
                .into_iter()
                .filter_map(|(name, count)| {
                    let def_id = assets.get_def_name_id(&name);
                    if def_id.is_none() {
                        warn!("recipe output not in asset catalog, skipping"; "recipe" => &builder.def_name, "output" => &name);
                    }
                    def_id.map(|def_name_id| RecipeOutput {
                        def_name: name,
                        def_name_id,
                        count,
                    })
                })
                .collect();

            let station_id = builder
                .station_def_name
                .as_ref()
                .and_then(|s| assets.get_def_name_id(s));

            let input_def_name_ids = inputs.iter().map(|i| i.def_name_id).collect();

            let name = builder.def_name.clone();
            recipes.push(RecipeDef {
                def_name: builder.def_name,
                id,
                label: builder.label,
                inputs,
                outputs,
                station_def_name: builder.station_def_name,
                station_id,
                skill: builder.skill,
                work_amount: builder.work_amount,
                innate: builder.innate,
                input_def_name_ids,
            });
            by_name.insert(name, id);
        }

        let mut catalog = Self {
            recipes,
            by_name,
            by_station: HashMap::new(),
            stationless: Vec::new(),
            innate: Vec::new(),
        };
        catalog.rebuild_indices();
        catalog
    }

    fn rebuild_indices(&mut self) {
        self.by_station.clear();
        self.stationless.clear();
        self.innate.clear();

        for recipe in &self.recipes {
            match recipe.station_id {
                Some(station) => self.by_station.entry(station).or_default().push(recipe.id),
                None => self.stationless.push(recipe.id),
            }
            if recipe.innate {
                self.innate.push(recipe.id);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&RecipeDef> {
        let id = *self.by_name.get(name)?;
        self.get_by_id(id)
    }

    pub fn get_by_id(&self, id: DefNameId) -> Option<&RecipeDef> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn by_station(&self, station: DefNameId) -> &[DefNameId] {
        self.by_station.get(&station).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn stationless(&self) -> &[DefNameId] {
        &self.stationless
    }

    pub fn innate(&self) -> &[DefNameId] {
        &self.innate
    }

    pub fn recipes_knowable_with(&self, known: impl Fn(DefNameId) -> bool + Copy) -> Vec<&RecipeDef> {
        self.recipes
            .iter()
            .filter(|r| r.knows_all_inputs(known))
            .collect()
    }
}
