//! Bracketed bisection for rates at which a decreasing valuation function
//! crosses zero.
//!
//! The search starts from the bracket `[0, 1]`, doubles the upper bound until
//! the function is no longer positive, then halves the bracket a fixed number
//! of times. Exhausting the iteration budget is not an error: the last
//! midpoint is returned with `converged = false`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Rate;
use crate::ValuationResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const BISECTION_MAX_ITERATIONS: u32 = 50;
pub const BISECTION_TOLERANCE: Decimal = dec!(0.00001);
const MAX_BRACKET_DOUBLINGS: u32 = 64;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Result of a bisection search, including convergence diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOutcome {
    /// The rate found (or the best estimate when not converged)
    pub rate: Rate,
    /// Number of midpoints evaluated
    pub iterations: u32,
    /// Function value at `rate`
    pub residual: Decimal,
    /// Whether `|residual|` fell below the tolerance within the budget
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Find the rate where a decreasing function `f` crosses zero.
///
/// `f(r) > 0` means the root lies above `r`. The lower bound of the bracket
/// is never evaluated, so functions that are singular at zero are safe.
pub fn bisect_decreasing<F>(f: F) -> ValuationResult<SolverOutcome>
where
    F: Fn(Rate) -> ValuationResult<Decimal>,
{
    let mut bottom = Decimal::ZERO;
    let mut top = Decimal::ONE;

    let mut doublings = 0;
    while f(top)? > Decimal::ZERO && doublings < MAX_BRACKET_DOUBLINGS {
        top *= dec!(2);
        doublings += 1;
    }

    let mut rate = (top + bottom) / dec!(2);

    for iteration in 0..BISECTION_MAX_ITERATIONS {
        let value = f(rate)?;

        if value.abs() < BISECTION_TOLERANCE {
            return Ok(SolverOutcome {
                rate,
                iterations: iteration + 1,
                residual: value,
                converged: true,
            });
        } else if value > Decimal::ZERO {
            bottom = rate;
        } else {
            top = rate;
        }
        rate = (top + bottom) / dec!(2);
    }

    Ok(SolverOutcome {
        rate,
        iterations: BISECTION_MAX_ITERATIONS,
        residual: f(rate)?,
        converged: false,
    })
}
