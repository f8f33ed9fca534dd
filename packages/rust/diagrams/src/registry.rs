//! Figure id → drawing routine table.

use std::collections::BTreeMap;

use crate::canvas::Canvas;
use crate::{vol1, vol2};

/// A drawing routine paints one figure onto a fresh canvas.
pub type DrawFn = fn(&mut Canvas);

/// Explicit lookup table of built-in figures. Ids that are not registered get
/// a placeholder image from the generator.
#[derive(Clone)]
pub struct DiagramRegistry {
    routines: BTreeMap<&'static str, DrawFn>,
}

impl DiagramRegistry {
    /// Registry with every built-in figure.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        // Volume 1
        registry.register("cad_vs_bim", vol1::cad_vs_bim);
        registry.register("info_layers", vol1::info_layers);
        registry.register("lifecycle_flow", vol1::lifecycle_flow);
        registry.register("element_structure", vol1::element_structure);
        registry.register("lod_matrix", vol1::lod_matrix);
        registry.register("openbim_ifc", vol1::openbim_ifc);
        // Volume 2
        registry.register("bep_flow", vol2::bep_flow);
        registry.register("4d_5d_bim", vol2::four_d_five_d_bim);
        registry.register("worksharing_concept", vol2::worksharing_concept);
        registry.register("clash_detection", vol2::clash_detection);
        registry.register("ng_ok_level_mistake", vol2::ng_ok_level_mistake);
        registry.register("family_hierarchy_detail", vol2::family_hierarchy_detail);
        registry.register("level_mistake_detail", vol2::level_mistake_detail);
        registry.register("wall_mistake_patterns", vol2::wall_mistake_patterns);
        registry.register("floor_mistake_examples", vol2::floor_mistake_examples);
        registry
    }

    pub fn empty() -> Self {
        Self {
            routines: BTreeMap::new(),
        }
    }

    /// Add or replace the routine for `id`.
    pub fn register(&mut self, id: &'static str, draw: DrawFn) {
        self.routines.insert(id, draw);
    }

    pub fn get(&self, id: &str) -> Option<DrawFn> {
        self.routines.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.routines.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routines.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.routines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routines.is_empty()
    }
}

impl Default for DiagramRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = DiagramRegistry::new();
        assert_eq!(registry.len(), 15);
        for id in [
            "cad_vs_bim",
            "info_layers",
            "lifecycle_flow",
            "element_structure",
            "lod_matrix",
            "openbim_ifc",
            "bep_flow",
            "4d_5d_bim",
            "worksharing_concept",
            "clash_detection",
            "ng_ok_level_mistake",
            "family_hierarchy_detail",
        ] {
            assert!(registry.contains(id), "{id} missing");
        }
        assert!(registry.get("site_photo").is_none());
    }

    #[test]
    fn register_overrides() {
        fn blank(_: &mut Canvas) {}
        let mut registry = DiagramRegistry::empty();
        assert!(registry.is_empty());
        registry.register("custom", blank);
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["custom"]);
    }
}
