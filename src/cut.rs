// SPDX-License-Identifier: Apache-2.0

//! A K-feasible cut: a set of leaf variables plus area/delay/power costs.
//!
//! Leaves are variable indices with polarity stripped; polarity lives only
//! on the literals that connect nodes. Costs are optional: a freshly
//! unioned cut has none until its producer assigns them.

use std::collections::BTreeSet;
use std::fmt;

use crate::aig::lit_from_var;
use crate::error::{MapError, Result};

/// Reserved "cost unset" marker of the wire-level convention. Setters
/// reject it so a caller migrating from sentinel arithmetic fails loudly
/// instead of silently storing an unset cost.
pub const RESERVED_COST: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct Cut {
    leaves: BTreeSet<u32>,
    area: Option<u32>,
    delay: Option<u32>,
    power: Option<u32>,
}

impl Cut {
    /// A cut over the given leaf variables with no costs assigned.
    pub fn new(leaves: impl IntoIterator<Item = u32>) -> Cut {
        Cut {
            leaves: leaves.into_iter().collect(),
            area: None,
            delay: None,
            power: None,
        }
    }

    /// A cut with all three costs assigned up front.
    pub fn with_costs(
        leaves: impl IntoIterator<Item = u32>,
        area: u32,
        delay: u32,
        power: u32,
    ) -> Result<Cut> {
        let mut cut = Cut::new(leaves);
        cut.set_area(area)?;
        cut.set_delay(delay)?;
        cut.set_power(power)?;
        Ok(cut)
    }

    pub fn leaves(&self) -> &BTreeSet<u32> {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn area(&self) -> Option<u32> {
        self.area
    }

    pub fn delay(&self) -> Option<u32> {
        self.delay
    }

    pub fn power(&self) -> Option<u32> {
        self.power
    }

    pub fn all_costs_set(&self) -> bool {
        self.area.is_some() && self.delay.is_some() && self.power.is_some()
    }

    pub fn set_area(&mut self, area: u32) -> Result<()> {
        if area == RESERVED_COST {
            return Err(MapError::Precondition(format!(
                "area cost must be below the reserved value {}",
                RESERVED_COST
            )));
        }
        self.area = Some(area);
        Ok(())
    }

    pub fn set_delay(&mut self, delay: u32) -> Result<()> {
        if delay == RESERVED_COST {
            return Err(MapError::Precondition(format!(
                "delay cost must be below the reserved value {}",
                RESERVED_COST
            )));
        }
        self.delay = Some(delay);
        Ok(())
    }

    pub fn set_power(&mut self, power: u32) -> Result<()> {
        if power == RESERVED_COST {
            return Err(MapError::Precondition(format!(
                "power cost must be below the reserved value {}",
                RESERVED_COST
            )));
        }
        self.power = Some(power);
        Ok(())
    }

    /// Set union of the leaf sets; the result has no costs assigned.
    /// Empty operands are rejected.
    pub fn union(&self, other: &Cut) -> Result<Cut> {
        if self.leaves.is_empty() || other.leaves.is_empty() {
            return Err(MapError::Precondition(
                "cannot union a cut with an empty leaf set".to_string(),
            ));
        }
        Ok(Cut::new(self.leaves.union(&other.leaves).copied()))
    }
}

/// Cuts compare by leaf set only; costs do not participate.
impl PartialEq for Cut {
    fn eq(&self, other: &Self) -> bool {
        self.leaves == other.leaves
    }
}

impl Eq for Cut {}

impl fmt::Display for Cut {
    /// Renders `( v0 v1 ... ) : area = A : delay = D : power = P` with
    /// each leaf printed in literal form (`2*variable`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "( ")?;
        for &var in &self.leaves {
            write!(f, "{} ", lit_from_var(var))?;
        }
        write!(
            f,
            ") : area = {} : delay = {} : power = {}",
            self.area.unwrap_or(RESERVED_COST),
            self.delay.unwrap_or(RESERVED_COST),
            self.power.unwrap_or(RESERVED_COST)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_merges_leaves_and_clears_costs() {
        let a = Cut::with_costs([1, 2], 0, 1, 0).unwrap();
        let b = Cut::with_costs([2, 3], 0, 2, 0).unwrap();
        let u = a.union(&b).unwrap();
        assert_eq!(u.leaves().iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
        assert!(!u.all_costs_set());
        assert_eq!(u.power(), None);
    }

    #[test]
    fn test_union_of_empty_rejected() {
        let a = Cut::new([1]);
        let empty = Cut::new([]);
        assert!(empty.is_empty());
        assert!(a.union(&empty).is_err());
        assert!(empty.union(&a).is_err());
    }

    #[test]
    fn test_equality_ignores_costs() {
        let a = Cut::with_costs([1, 2], 0, 1, 0).unwrap();
        let b = Cut::with_costs([1, 2], 5, 9, 0).unwrap();
        let c = Cut::with_costs([1, 3], 0, 1, 0).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_reserved_cost_rejected() {
        let mut cut = Cut::new([1]);
        assert!(cut.set_area(RESERVED_COST).is_err());
        assert!(cut.set_delay(RESERVED_COST).is_err());
        assert!(cut.set_power(RESERVED_COST).is_err());
        assert!(cut.set_area(RESERVED_COST - 1).is_ok());
    }

    #[test]
    fn test_display_prints_literal_form() {
        let cut = Cut::with_costs([1, 2], 0, 1, 0).unwrap();
        assert_eq!(cut.to_string(), "( 2 4 ) : area = 0 : delay = 1 : power = 0");
    }
}
