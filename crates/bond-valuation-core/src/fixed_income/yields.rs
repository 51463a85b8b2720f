//! Yield to maturity (IRR) of a [`Bond`] by bisection on its net present value.

use crate::fixed_income::bond::Bond;
use crate::solver::{bisect_decreasing, SolverOutcome};
use crate::types::Rate;
use crate::ValuationResult;

/// Solve for the discount rate at which the bond's net present value is zero,
/// keeping the solver diagnostics.
///
/// Running out of iterations is not an error; check `converged` on the
/// outcome to detect a degraded estimate.
pub fn solve_irr(bond: &Bond) -> ValuationResult<SolverOutcome> {
    bisect_decreasing(|rate| bond.net_present_value(rate))
}

impl Bond {
    /// Internal rate of return (yield to maturity).
    pub fn irr(&self) -> ValuationResult<Rate> {
        Ok(solve_irr(self)?.rate)
    }
}
