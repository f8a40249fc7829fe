// SPDX-License-Identifier: Apache-2.0

//! Cover selection: walks the graph from primary outputs down along best
//! cuts, claiming one LUT per newly covered AND node, and accumulates the
//! two reported costs (LUT count and depth).

use std::collections::{BTreeSet, HashMap};

use crate::aig::{lit_from_var, var_from_lit, Aig};
use crate::cut_engine::CutEngine;
use crate::error::{MapError, Result};

pub struct TechMapper<'a> {
    engine: CutEngine<'a>,
    /// Even AND literal -> covered by a selected LUT.
    implementation_map: HashMap<u32, bool>,
    area: u32,
    depth: u32,
}

impl<'a> TechMapper<'a> {
    pub fn new(engine: CutEngine<'a>) -> TechMapper<'a> {
        let implementation_map = engine.aig().and_lits().map(|lit| (lit, false)).collect();
        TechMapper {
            engine,
            implementation_map,
            area: 0,
            depth: 0,
        }
    }

    pub fn engine(&self) -> &CutEngine<'a> {
        &self.engine
    }

    /// Number of K-LUTs selected by the last run.
    pub fn area(&self) -> u32 {
        self.area
    }

    /// Longest chain of LUT stages from any input or latch to any primary
    /// output, per the last run.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn is_implemented(&self, and_lit: u32) -> bool {
        let even = lit_from_var(var_from_lit(and_lit));
        self.implementation_map.get(&even).copied().unwrap_or(false)
    }

    /// Selects the cover. Starts from a clean slate so running twice on
    /// the same mapper yields identical results.
    pub fn run(&mut self) -> Result<()> {
        self.area = 0;
        self.depth = 0;
        for covered in self.implementation_map.values_mut() {
            *covered = false;
        }

        let aig: &Aig = self.engine.aig();
        let outputs: Vec<u32> = aig.outputs().to_vec();
        for out in outputs {
            if aig.is_and(out) {
                let even = lit_from_var(var_from_lit(out));
                if self.implementation_map.get(&even).copied().unwrap_or(false) {
                    continue;
                }
                self.engine.find_cuts(out)?;
                self.implementation_map.insert(even, true);
                self.area += 1;

                let best = self.engine.best_cut(even)?;
                let best_delay = best.delay().ok_or_else(|| {
                    MapError::InternalInvariant(format!(
                        "best cut of literal {} has no delay cost",
                        even
                    ))
                })?;
                self.depth = self.depth.max(best_delay);

                // Claim every AND reachable through best-cut leaves that
                // is not yet covered, frontier by frontier.
                let mut frontier: BTreeSet<u32> = and_leaf_lits(aig, best.leaves());
                while !frontier.is_empty() {
                    let mut next = BTreeSet::new();
                    for lit in frontier {
                        if self.implementation_map.get(&lit).copied().unwrap_or(false) {
                            continue;
                        }
                        self.implementation_map.insert(lit, true);
                        self.area += 1;
                        let cut = self.engine.best_cut(lit)?;
                        next.extend(and_leaf_lits(aig, cut.leaves()));
                    }
                    frontier = next;
                }
            } else if aig.is_input(out) || out <= 1 {
                // An output wired straight to an input or constant still
                // occupies one LUT and at least one level.
                self.area += 1;
                self.depth = self.depth.max(1);
            }
            // Latch outputs are sequential boundaries and cost nothing.
        }

        log::info!("mapping done: {} LUTs, {} levels", self.area, self.depth);
        Ok(())
    }

    /// The full report: totals followed by the per-node implementation
    /// details in ascending AND-literal order.
    pub fn report(&self) -> Result<String> {
        let mut out = String::new();
        out.push_str(">> Technology Mapping results\n");
        out.push_str(&format!("# LUT count: {}\n", self.area));
        out.push_str(&format!("# Levels: {}\n", self.depth));
        out.push_str(">> Implementation details: \n");
        for lit in self.engine.aig().and_lits() {
            if self.is_implemented(lit) {
                out.push_str(&format!("({}) => {}\n", lit, self.engine.best_cut(lit)?));
            } else {
                out.push_str(&format!("({}) => not implemented\n", lit));
            }
        }
        Ok(out)
    }
}

/// Even literals of the AND nodes among a cut's leaf variables.
fn and_leaf_lits(aig: &Aig, leaves: &BTreeSet<u32>) -> BTreeSet<u32> {
    leaves
        .iter()
        .map(|&var| lit_from_var(var))
        .filter(|&lit| aig.is_and(lit))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cut_engine::MappingGoal;
    use crate::load_aiger::load_aiger;

    #[test]
    fn test_single_and_maps_to_one_lut() {
        let aig = load_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\n").unwrap();
        let engine = CutEngine::new(&aig, MappingGoal::MinimizeArea, 2, 0).unwrap();
        let mut mapper = TechMapper::new(engine);
        mapper.run().unwrap();
        assert_eq!(mapper.area(), 1);
        assert_eq!(mapper.depth(), 1);
        assert!(mapper.is_implemented(6));
        let best = mapper.engine().best_cut(6).unwrap();
        assert_eq!(best.leaves().iter().copied().collect::<Vec<_>>(), [1, 2]);
        assert_eq!(best.delay(), Some(1));
    }

    #[test]
    fn test_constant_output_costs_one_lut() {
        let aig = load_aiger(b"aag 1 1 0 1 0\n2\n0\n").unwrap();
        let engine = CutEngine::new(&aig, MappingGoal::MinimizeArea, 2, 0).unwrap();
        let mut mapper = TechMapper::new(engine);
        mapper.run().unwrap();
        assert_eq!(mapper.area(), 1);
        assert_eq!(mapper.depth(), 1);
    }

    #[test]
    fn test_latch_output_costs_nothing() {
        let aig = load_aiger(b"aag 2 1 1 1 0\n2\n4 2\n4\n").unwrap();
        let engine = CutEngine::new(&aig, MappingGoal::MinimizeArea, 2, 0).unwrap();
        let mut mapper = TechMapper::new(engine);
        mapper.run().unwrap();
        assert_eq!(mapper.area(), 0);
        assert_eq!(mapper.depth(), 0);
    }

    #[test]
    fn test_report_lists_every_and_node() {
        let aig = load_aiger(b"aag 3 2 0 1 1\n2\n4\n6\n6 4 2\n").unwrap();
        let engine = CutEngine::new(&aig, MappingGoal::MinimizeArea, 2, 0).unwrap();
        let mut mapper = TechMapper::new(engine);
        mapper.run().unwrap();
        let report = mapper.report().unwrap();
        assert!(report.starts_with(">> Technology Mapping results\n"));
        assert!(report.contains("# LUT count: 1\n"));
        assert!(report.contains("# Levels: 1\n"));
        assert!(report.contains("(6) => ( 2 4 ) : area = 0 : delay = 1 : power = 0\n"));
    }
}
