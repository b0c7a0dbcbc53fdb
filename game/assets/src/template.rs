use std::collections::HashMap;

use crate::DefNameId;

/// Opaque handle to a generated template for a defName.
///
/// The renderer is responsible for turning this into real geometry; the core
/// only guarantees that the same defName always yields the same handle for
/// the lifetime of the catalog.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Template {
    pub def_name_id: DefNameId,
    pub seed: u64,
}

/// Populate-once cache from defName to its generated template.
///
/// Never invalidated: once a name has been generated it is returned from
/// cache for the remainder of the process.
#[derive(Default)]
pub struct TemplateCache {
    cache: HashMap<String, Template>,
}

impl TemplateCache {
    pub fn get_or_generate(&mut self, name: &str, id: DefNameId) -> &Template {
        self.cache.entry(name.to_owned()).or_insert_with(|| {
            let seed = template_seed(name);
            Template {
                def_name_id: id,
                seed,
            }
        })
    }
}

/// Deterministic seed for a defName's fixed-seed template generation.
fn template_seed(name: &str) -> u64 {
    let mut h: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.as_bytes() {
        h ^= *byte as u64;
        h = h.wrapping_mul(0x0000_0100_0000_01B3);
    }
    h
}
