// SPDX-License-Identifier: Apache-2.0

//! And-inverter graph data model.
//!
//! All inter-node references are AIGER literals (`2*var + polarity`, with
//! literal 0 meaning constant false and literal 1 constant true). The
//! variable index ranges of the AIGER header classify a literal as input,
//! latch, or AND. The container is immutable once constructed: fanout
//! counters are filled in by a single pass at build time and are read-only
//! afterwards.

use std::fmt;

use crate::error::{MapError, Result};

/// Strips the polarity bit from a literal, yielding its variable index.
pub fn var_from_lit(lit: u32) -> u32 {
    lit >> 1
}

/// Returns the positive (even) literal for a variable index.
pub fn lit_from_var(var: u32) -> u32 {
    var << 1
}

/// A two-input AND gate.
///
/// The AIGER ordering invariant holds for every stored node: the gate's
/// own literal is strictly greater than `rhs0`, and `rhs0 >= rhs1 >= 2`
/// (children are never constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AndNode {
    /// Number of incoming edges from AND children, latch next-states, and
    /// primary-output references.
    pub fanout: u32,
    pub rhs0: u32,
    pub rhs1: u32,
}

/// A latch, carrying only its next-state literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatchNode {
    pub fanout: u32,
    pub next_q: u32,
}

/// Raw, unvalidated pieces of a parsed AIGER design.
///
/// The parser fills this in and hands it to [`Aig::new`], which enforces
/// the structural invariants and computes fanouts.
#[derive(Debug, Default, Clone)]
pub struct AigParts {
    pub max_var: u32,
    pub num_inputs: u32,
    pub num_latches: u32,
    pub num_outputs: u32,
    pub num_ands: u32,
    /// Output literals in declaration order.
    pub outputs: Vec<u32>,
    /// `(and_lit, rhs0, rhs1)` in declaration order.
    pub ands: Vec<(u32, u32, u32)>,
    /// `(latch_lit, next_q)` in declaration order.
    pub latches: Vec<(u32, u32)>,
    /// Symbol names; empty when the symbol block named none of this kind.
    pub input_names: Vec<String>,
    pub latch_names: Vec<String>,
    pub output_names: Vec<String>,
    /// Comment block lines, captured verbatim.
    pub comments: Vec<String>,
    /// Whether the source was the binary (`aig`) variant.
    pub binary: bool,
}

/// A validated and-inverter graph.
///
/// Variables `1..=I` are primary inputs, `I+1..=I+L` are latches, and
/// `I+L+1..=I+L+A` are AND nodes; `max_var == I + L + A`.
#[derive(Debug, Clone)]
pub struct Aig {
    max_var: u32,
    num_inputs: u32,
    num_latches: u32,
    num_ands: u32,
    outputs: Vec<u32>,
    ands: Vec<AndNode>,
    latches: Vec<LatchNode>,
    input_names: Vec<String>,
    latch_names: Vec<String>,
    output_names: Vec<String>,
    comments: Vec<String>,
    binary: bool,
}

impl Aig {
    /// Validates the raw pieces and builds the graph, including the fanout
    /// pass. Fails with `InputMalformed` on any integrity violation.
    pub fn new(parts: AigParts) -> Result<Aig> {
        let AigParts {
            max_var,
            num_inputs,
            num_latches,
            num_outputs,
            num_ands,
            outputs,
            ands,
            latches,
            input_names,
            latch_names,
            output_names,
            comments,
            binary,
        } = parts;

        if max_var != num_inputs + num_latches + num_ands {
            return Err(MapError::InputMalformed(format!(
                "invalid checksum: the sum of inputs, latches, and AND nodes ({}) \
                 must equal the maximum variable index ({})",
                num_inputs + num_latches + num_ands,
                max_var
            )));
        }
        let max_lit = lit_from_var(max_var) + 1;

        if outputs.len() != num_outputs as usize {
            return Err(MapError::InputMalformed(format!(
                "declared {} outputs but {} were provided",
                num_outputs,
                outputs.len()
            )));
        }
        for &out in &outputs {
            if out > max_lit {
                return Err(MapError::InputMalformed(format!(
                    "output literal {} exceeds the maximum literal {}",
                    out, max_lit
                )));
            }
        }

        if ands.len() != num_ands as usize {
            return Err(MapError::InputMalformed(format!(
                "declared {} AND nodes but {} were provided",
                num_ands,
                ands.len()
            )));
        }
        let mut and_nodes = Vec::with_capacity(ands.len());
        for (i, &(and_lit, rhs0, rhs1)) in ands.iter().enumerate() {
            let expected = lit_from_var(num_inputs + num_latches + 1 + i as u32);
            if and_lit != expected {
                return Err(MapError::InputMalformed(format!(
                    "unexpected AND literal {} (expected {})",
                    and_lit, expected
                )));
            }
            if rhs0 < rhs1 || rhs1 < 2 {
                return Err(MapError::InputMalformed(format!(
                    "AND literal {} violates rhs0 >= rhs1 >= 2 (rhs0 = {}, rhs1 = {})",
                    and_lit, rhs0, rhs1
                )));
            }
            if and_lit <= rhs0 {
                return Err(MapError::InputMalformed(format!(
                    "AND literal {} must be greater than its children (rhs0 = {})",
                    and_lit, rhs0
                )));
            }
            and_nodes.push(AndNode {
                fanout: 0,
                rhs0,
                rhs1,
            });
        }

        if latches.len() != num_latches as usize {
            return Err(MapError::InputMalformed(format!(
                "declared {} latches but {} were provided",
                num_latches,
                latches.len()
            )));
        }
        let mut latch_nodes = Vec::with_capacity(latches.len());
        for (i, &(latch_lit, next_q)) in latches.iter().enumerate() {
            let expected = lit_from_var(num_inputs + 1 + i as u32);
            if latch_lit != expected {
                return Err(MapError::InputMalformed(format!(
                    "unexpected latch literal {} (expected {})",
                    latch_lit, expected
                )));
            }
            if next_q < 2 {
                return Err(MapError::InputMalformed(format!(
                    "latch literal {} is tied to a constant next-state ({})",
                    latch_lit, next_q
                )));
            }
            if next_q > max_lit {
                return Err(MapError::InputMalformed(format!(
                    "next-state literal {} exceeds the maximum literal {}",
                    next_q, max_lit
                )));
            }
            latch_nodes.push(LatchNode { fanout: 0, next_q });
        }

        for (names, count, kind) in [
            (&input_names, num_inputs, "input"),
            (&latch_names, num_latches, "latch"),
            (&output_names, num_outputs, "output"),
        ] {
            if !names.is_empty() && names.len() != count as usize {
                return Err(MapError::InputMalformed(format!(
                    "{} {} symbols declared for {} {}s",
                    names.len(),
                    kind,
                    count,
                    kind
                )));
            }
        }

        let mut aig = Aig {
            max_var,
            num_inputs,
            num_latches,
            num_ands,
            outputs,
            ands: and_nodes,
            latches: latch_nodes,
            input_names,
            latch_names,
            output_names,
            comments,
            binary,
        };
        aig.compute_fanouts();
        Ok(aig)
    }

    /// Single pass over every edge: AND children, latch next-states, and
    /// primary-output references each bump the fanout of an AND or latch
    /// target. Constants and inputs carry no counter.
    fn compute_fanouts(&mut self) {
        let mut bumps: Vec<u32> = Vec::new();
        for and in &self.ands {
            bumps.push(and.rhs0);
            bumps.push(and.rhs1);
        }
        for latch in &self.latches {
            bumps.push(latch.next_q);
        }
        bumps.extend_from_slice(&self.outputs);

        for lit in bumps {
            let var = var_from_lit(lit);
            if self.is_and(lit) {
                self.ands[(var - self.num_inputs - self.num_latches - 1) as usize].fanout += 1;
            } else if self.is_latch(lit) {
                self.latches[(var - self.num_inputs - 1) as usize].fanout += 1;
            }
        }
    }

    pub fn max_var(&self) -> u32 {
        self.max_var
    }

    pub fn num_inputs(&self) -> u32 {
        self.num_inputs
    }

    pub fn num_latches(&self) -> u32 {
        self.num_latches
    }

    pub fn num_outputs(&self) -> u32 {
        self.outputs.len() as u32
    }

    pub fn num_ands(&self) -> u32 {
        self.num_ands
    }

    pub fn outputs(&self) -> &[u32] {
        &self.outputs
    }

    pub fn and_nodes(&self) -> &[AndNode] {
        &self.ands
    }

    pub fn latch_nodes(&self) -> &[LatchNode] {
        &self.latches
    }

    pub fn input_names(&self) -> &[String] {
        &self.input_names
    }

    pub fn latch_names(&self) -> &[String] {
        &self.latch_names
    }

    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    pub fn comments(&self) -> &[String] {
        &self.comments
    }

    pub fn is_binary_source(&self) -> bool {
        self.binary
    }

    pub fn is_combinational(&self) -> bool {
        self.num_latches == 0
    }

    pub fn is_sequential(&self) -> bool {
        self.num_latches > 0
    }

    /// True when the literal names a primary input. Constants (literals 0
    /// and 1) classify as none of input/latch/AND.
    pub fn is_input(&self, lit: u32) -> bool {
        if lit <= 1 {
            return false;
        }
        let var = var_from_lit(lit);
        var <= self.num_inputs
    }

    pub fn is_latch(&self, lit: u32) -> bool {
        if lit <= 1 {
            return false;
        }
        let var = var_from_lit(lit);
        var > self.num_inputs && var <= self.num_inputs + self.num_latches
    }

    pub fn is_and(&self, lit: u32) -> bool {
        if lit <= 1 {
            return false;
        }
        let var = var_from_lit(lit);
        var > self.num_inputs + self.num_latches
            && var <= self.num_inputs + self.num_latches + self.num_ands
    }

    /// The positive literal of the first AND variable (`2*(I+L+1)`).
    pub fn first_and_lit(&self) -> u32 {
        lit_from_var(self.num_inputs + self.num_latches + 1)
    }

    /// The positive literal of the first latch variable (`2*(I+1)`).
    pub fn first_latch_lit(&self) -> u32 {
        lit_from_var(self.num_inputs + 1)
    }

    /// All AND literals in even form, ascending.
    pub fn and_lits(&self) -> impl Iterator<Item = u32> + '_ {
        let first = self.num_inputs + self.num_latches + 1;
        (first..=self.max_var).map(lit_from_var)
    }

    /// Resolves an AND literal (either polarity) to its node record.
    pub fn and_from_lit(&self, lit: u32) -> Result<&AndNode> {
        let index = self.and_index_from_lit(lit)?;
        Ok(&self.ands[index])
    }

    /// Offset of an AND literal into the AND array.
    pub fn and_index_from_lit(&self, lit: u32) -> Result<usize> {
        if lit > lit_from_var(self.max_var) + 1 {
            return Err(MapError::OutOfRange(format!(
                "literal {} exceeds the maximum literal {}",
                lit,
                lit_from_var(self.max_var) + 1
            )));
        }
        if !self.is_and(lit) {
            return Err(MapError::Precondition(format!(
                "literal {} is not an AND literal for this graph",
                lit
            )));
        }
        Ok((var_from_lit(lit) - self.num_inputs - self.num_latches - 1) as usize)
    }

    /// Resolves a latch literal (either polarity) to its node record.
    pub fn latch_from_lit(&self, lit: u32) -> Result<&LatchNode> {
        if lit > lit_from_var(self.max_var) + 1 {
            return Err(MapError::OutOfRange(format!(
                "literal {} exceeds the maximum literal {}",
                lit,
                lit_from_var(self.max_var) + 1
            )));
        }
        if !self.is_latch(lit) {
            return Err(MapError::Precondition(format!(
                "literal {} is not a latch literal for this graph",
                lit
            )));
        }
        Ok(&self.latches[(var_from_lit(lit) - self.num_inputs - 1) as usize])
    }

    /// Fanout of the node behind a literal, if it is an AND or latch.
    pub fn fanout_of(&self, lit: u32) -> Option<u32> {
        if self.is_and(lit) {
            let var = var_from_lit(lit);
            Some(self.ands[(var - self.num_inputs - self.num_latches - 1) as usize].fanout)
        } else if self.is_latch(lit) {
            let var = var_from_lit(lit);
            Some(self.latches[(var - self.num_inputs - 1) as usize].fanout)
        } else {
            None
        }
    }
}

impl fmt::Display for Aig {
    /// Human-readable dump of the whole design, mirroring the file layout:
    /// header, inputs, latches, outputs, ANDs, symbols, comments.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ">> Start of AIG information.")?;
        writeln!(f)?;
        writeln!(
            f,
            "AIGER format: {}",
            if self.binary { "binary" } else { "ASCII" }
        )?;
        writeln!(f)?;
        writeln!(f, "Header:")?;
        writeln!(
            f,
            "M I L O A = {} {} {} {} {}",
            self.max_var,
            self.num_inputs,
            self.num_latches,
            self.outputs.len(),
            self.num_ands
        )?;

        writeln!(f)?;
        writeln!(f, "Inputs:")?;
        for i in 1..=self.num_inputs {
            writeln!(f, "{}", lit_from_var(i))?;
        }

        writeln!(f)?;
        writeln!(f, "Latches:")?;
        for (i, latch) in self.latches.iter().enumerate() {
            writeln!(
                f,
                "{} {}",
                lit_from_var(self.num_inputs + 1 + i as u32),
                latch.next_q
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Outputs:")?;
        for out in &self.outputs {
            writeln!(f, "{}", out)?;
        }

        writeln!(f)?;
        writeln!(f, "And nodes:")?;
        for (i, and) in self.ands.iter().enumerate() {
            writeln!(
                f,
                "{} {} {}",
                lit_from_var(self.num_inputs + self.num_latches + 1 + i as u32),
                and.rhs0,
                and.rhs1
            )?;
        }

        if !self.input_names.is_empty() {
            writeln!(f)?;
            writeln!(f, "Input names:")?;
            for name in &self.input_names {
                writeln!(f, "{}", name)?;
            }
        }
        if !self.latch_names.is_empty() {
            writeln!(f)?;
            writeln!(f, "Latch names:")?;
            for name in &self.latch_names {
                writeln!(f, "{}", name)?;
            }
        }
        if !self.output_names.is_empty() {
            writeln!(f)?;
            writeln!(f, "Output names:")?;
            for name in &self.output_names {
                writeln!(f, "{}", name)?;
            }
        }
        if !self.comments.is_empty() {
            writeln!(f)?;
            writeln!(f, "Comments:")?;
            for line in &self.comments {
                writeln!(f, "{}", line)?;
            }
        }

        writeln!(f)?;
        writeln!(f, ">> End of AIG information.")?;
        Ok(())
    }
}
