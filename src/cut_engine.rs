// SPDX-License-Identifier: Apache-2.0

//! Per-node K-feasible cut enumeration.
//!
//! Each AND node's cut set is built from its children's cut sets: every
//! child set is copied, augmented with the child's singleton autocut, and
//! the two sides are combined pairwise under the K-feasibility filter
//! (the diamond operation). An explicit work stack drives the bottom-up
//! order so worst-case memory tracks the logic depth of the graph rather
//! than the host thread stack.
//!
//! The engine also keeps a map of AND nodes whose best cut costs zero
//! area. The area estimate of a union cut counts only leaves that are AND
//! nodes not yet claimed there, which makes enumeration aware of sharing
//! as it proceeds.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::aig::{lit_from_var, var_from_lit, Aig};
use crate::cut::{Cut, RESERVED_COST};
use crate::cut_set::CutSet;
use crate::error::{MapError, Result};

/// What the cut ordering optimizes for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingGoal {
    MinimizeArea,
    MinimizeDelay,
}

/// `(area, delay, leaf count)` lexicographic ascending.
pub fn area_first(a: &Cut, b: &Cut) -> Ordering {
    let key = |c: &Cut| {
        (
            c.area().unwrap_or(RESERVED_COST),
            c.delay().unwrap_or(RESERVED_COST),
            c.leaf_count(),
        )
    };
    key(a).cmp(&key(b))
}

/// `(delay, area, leaf count)` lexicographic ascending.
pub fn delay_first(a: &Cut, b: &Cut) -> Ordering {
    let key = |c: &Cut| {
        (
            c.delay().unwrap_or(RESERVED_COST),
            c.area().unwrap_or(RESERVED_COST),
            c.leaf_count(),
        )
    };
    key(a).cmp(&key(b))
}

/// Stable sort under the goal's comparator; ties keep insertion order.
pub fn sort_cut_set(set: &mut CutSet, goal: MappingGoal) {
    match goal {
        MappingGoal::MinimizeArea => set.sort_by(area_first),
        MappingGoal::MinimizeDelay => set.sort_by(delay_first),
    }
}

/// Sorts and keeps only the `count` best cuts.
pub fn sort_and_choose_best_cuts(set: &mut CutSet, count: u32, goal: MappingGoal) {
    sort_cut_set(set, goal);
    set.truncate(count as usize);
}

pub struct CutEngine<'a> {
    aig: &'a Aig,
    k: u32,
    c: u32,
    goal: MappingGoal,
    /// Indexed by AND-variable offset; an empty set means "not yet
    /// enumerated".
    cut_sets: Vec<CutSet>,
    /// Even AND literal -> "claimable at zero area". Written only by the
    /// driver loop.
    implementation_map: HashMap<u32, bool>,
}

impl<'a> CutEngine<'a> {
    /// `k` is the LUT input count (at least 2); `c` bounds the number of
    /// cuts kept per node (0 = no pruning).
    pub fn new(aig: &'a Aig, goal: MappingGoal, k: u32, c: u32) -> Result<CutEngine<'a>> {
        if k < 2 {
            return Err(MapError::Precondition(format!(
                "the number of LUT inputs must be at least 2 (got {})",
                k
            )));
        }
        let cut_sets = vec![CutSet::new(); aig.num_ands() as usize];
        let implementation_map = aig.and_lits().map(|lit| (lit, false)).collect();
        Ok(CutEngine {
            aig,
            k,
            c,
            goal,
            cut_sets,
            implementation_map,
        })
    }

    pub fn aig(&self) -> &'a Aig {
        self.aig
    }

    /// The cut set of an AND literal (either polarity); empty until
    /// [`CutEngine::find_cuts`] has visited it.
    pub fn cut_set(&self, and_lit: u32) -> Result<&CutSet> {
        let index = self.aig.and_index_from_lit(and_lit)?;
        Ok(&self.cut_sets[index])
    }

    pub fn has_best_cut(&self, and_lit: u32) -> Result<bool> {
        Ok(!self.cut_set(and_lit)?.is_empty())
    }

    /// The best cut under the active goal. Fails until enumeration has
    /// populated the node's set.
    pub fn best_cut(&self, and_lit: u32) -> Result<&Cut> {
        self.cut_set(and_lit)?.first().ok_or_else(|| {
            MapError::Precondition(format!(
                "no best cut for literal {} yet; run find_cuts before asking for it",
                and_lit
            ))
        })
    }

    /// Whether enumeration marked this AND as claimable at zero area.
    pub fn is_implemented(&self, and_lit: u32) -> bool {
        let even = lit_from_var(var_from_lit(and_lit));
        self.implementation_map.get(&even).copied().unwrap_or(false)
    }

    /// The singleton cut standing for "use this node itself as a leaf".
    /// Inputs and latches cost nothing and one level; an AND leaf carries
    /// its best cut's area and one more level.
    fn auto_cut(&self, lit: u32) -> Result<Cut> {
        let var = var_from_lit(lit);
        if self.aig.is_input(lit) || self.aig.is_latch(lit) {
            return Cut::with_costs([var], 0, 1, 0);
        }
        if self.aig.is_and(lit) {
            let best = self.best_cut(lit)?;
            let (area, delay) = match (best.area(), best.delay()) {
                (Some(area), Some(delay)) => (area, delay),
                _ => {
                    return Err(MapError::InternalInvariant(format!(
                        "best cut of literal {} has unset costs",
                        lit
                    )));
                }
            };
            return Cut::with_costs([var], area, 1 + delay, 0);
        }
        Err(MapError::Precondition(format!(
            "autocut requested for literal {} which is neither input, latch, nor AND",
            lit
        )))
    }

    /// Number of leaves that are AND nodes not yet claimed at zero area.
    fn estimate_union_area(&self, cut: &Cut) -> u32 {
        cut.leaves()
            .iter()
            .filter(|&&var| {
                let lit = lit_from_var(var);
                self.aig.is_and(lit) && !self.implementation_map.get(&lit).copied().unwrap_or(false)
            })
            .count() as u32
    }

    /// Child cut sets start from a copy of the child's own set for AND
    /// children; inputs and latches are leaves during enumeration and
    /// contribute only their autocut.
    fn child_cut_set(&self, child: u32) -> Result<CutSet> {
        if self.aig.is_and(child) {
            Ok(self.cut_set(child)?.clone())
        } else {
            Ok(CutSet::new())
        }
    }

    /// Forms a node's cut set from its children's sets, each augmented
    /// with the child's autocut. Both AND children must already be
    /// enumerated; the driver guarantees the order.
    pub fn phi(&self, and_lit: u32) -> Result<CutSet> {
        let index = self.aig.and_index_from_lit(and_lit)?;
        if !self.cut_sets[index].is_empty() {
            return Ok(self.cut_sets[index].clone());
        }
        let node = *self.aig.and_from_lit(and_lit)?;
        for child in [node.rhs0, node.rhs1] {
            if self.aig.is_and(child) && self.cut_set(child)?.is_empty() {
                return Err(MapError::Precondition(format!(
                    "literal {} has AND child {} with no cut set yet",
                    and_lit, child
                )));
            }
        }
        let mut first_set = self.child_cut_set(node.rhs0)?;
        let mut second_set = self.child_cut_set(node.rhs1)?;
        first_set.emplace(self.auto_cut(node.rhs0)?);
        second_set.emplace(self.auto_cut(node.rhs1)?);
        self.diamond(&first_set, &second_set)
    }

    /// Pairwise unions of the two sets, keeping those with at most `k`
    /// leaves. A newly inserted union is costed here: area from the
    /// sharing-aware estimate, delay from the slower operand (the LUT
    /// stage itself is charged only when the cut is consumed as an
    /// autocut), power zero.
    pub fn diamond(&self, first: &CutSet, second: &CutSet) -> Result<CutSet> {
        let mut result = CutSet::new();
        for x in first {
            for y in second {
                let union = x.union(y)?;
                if union.leaf_count() as u32 > self.k {
                    continue;
                }
                let (dx, dy) = match (x.delay(), y.delay()) {
                    (Some(dx), Some(dy)) if x.all_costs_set() && y.all_costs_set() => (dx, dy),
                    _ => {
                        return Err(MapError::Precondition(
                            "the cost of a union cut needs both operands' area, delay, \
                             and power assigned"
                                .to_string(),
                        ));
                    }
                };
                let area = self.estimate_union_area(&union);
                let (resident, inserted) = result.emplace(union);
                if inserted {
                    resident.set_area(area)?;
                    resident.set_delay(dx.max(dy))?;
                    resident.set_power(0)?;
                }
            }
        }
        Ok(result)
    }

    /// Ensures the literal's cut set is populated, enumerating children
    /// first via an explicit work stack (no recursion). Idempotent once a
    /// node is evaluated.
    pub fn find_cuts(&mut self, and_lit: u32) -> Result<&CutSet> {
        let root = self.aig.and_index_from_lit(and_lit)?;
        if !self.cut_sets[root].is_empty() {
            return Ok(&self.cut_sets[root]);
        }

        let mut stack: Vec<u32> = vec![and_lit];
        while let Some(&current) = stack.last() {
            let node = *self.aig.and_from_lit(current)?;
            let (c0, c1) = (node.rhs0, node.rhs1);

            // Post-order: an AND child with no cut set yet goes first.
            if self.aig.is_and(c0) && self.cut_set(c0)?.is_empty() {
                stack.push(c0);
                continue;
            }
            if self.aig.is_and(c1) && self.cut_set(c1)?.is_empty() {
                stack.push(c1);
                continue;
            }

            let mut cuts = self.phi(current)?;
            if self.c > 0 {
                sort_and_choose_best_cuts(&mut cuts, self.c, self.goal);
            } else {
                sort_cut_set(&mut cuts, self.goal);
            }
            let index = self.aig.and_index_from_lit(current)?;
            self.cut_sets[index] = cuts;

            let best = self.cut_sets[index].first().ok_or_else(|| {
                MapError::InternalInvariant(format!(
                    "cut set for literal {} is empty after enumeration",
                    current
                ))
            })?;
            let best_area = best.area();
            let best_leaves = best.leaves().clone();
            if best_area == Some(0) {
                self.implementation_map
                    .insert(lit_from_var(var_from_lit(current)), true);
                // When the new best cut covers everything a child's best
                // cut contributed, the child's claimed LUT is subsumed.
                for child in [c0, c1] {
                    if !self.aig.is_and(child) {
                        continue;
                    }
                    let absorbed = self.best_cut(child)?.leaves().is_subset(&best_leaves);
                    if absorbed {
                        self.implementation_map
                            .insert(lit_from_var(var_from_lit(child)), false);
                    }
                }
            }
            stack.pop();
        }

        if self.cut_sets[root].is_empty() {
            return Err(MapError::InternalInvariant(format!(
                "cut set for literal {} remains empty after the driver completed",
                and_lit
            )));
        }
        Ok(&self.cut_sets[root])
    }

    /// Enumerates cut sets for every primary output that is an AND.
    pub fn run(&mut self) -> Result<()> {
        let outputs: Vec<u32> = self.aig.outputs().to_vec();
        for out in outputs {
            if self.aig.is_and(out) {
                self.find_cuts(out)?;
            }
        }
        let populated = self.cut_sets.iter().filter(|s| !s.is_empty()).count();
        log::info!(
            "cut enumeration done: {}/{} AND nodes populated (k = {}, c = {})",
            populated,
            self.cut_sets.len(),
            self.k,
            self.c
        );
        Ok(())
    }

    /// Enumeration-time view of which nodes are claimable at zero area,
    /// in the same shape as the mapper's report body.
    pub fn implementation_details(&self) -> Result<String> {
        let mut out = String::new();
        out.push_str(">> Implementation details: \n");
        for lit in self.aig.and_lits() {
            if self.is_implemented(lit) {
                out.push_str(&format!("({}) => {}\n", lit, self.best_cut(lit)?));
            } else {
                out.push_str(&format!("({}) => not implemented\n", lit));
            }
        }
        Ok(out)
    }
}

impl fmt::Display for CutEngine<'_> {
    /// Dumps every AND node's cut set in ascending literal order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ">> Cut sets")?;
        for (offset, lit) in self.aig.and_lits().enumerate() {
            writeln!(f)?;
            writeln!(f, "Node {}:", lit)?;
            writeln!(f, "------------------------")?;
            if self.cut_sets[offset].is_empty() {
                writeln!(f, "No cut set defined.")?;
            } else {
                for cut in &self.cut_sets[offset] {
                    writeln!(f, "{}", cut)?;
                }
            }
        }
        Ok(())
    }
}
