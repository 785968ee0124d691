//! Percentage shares using the Largest Remainder Method.
//!
//! Category shares are rounded to two decimal places and must still add up to
//! exactly 100.00 within a partition:
//! 1. Calculate exact percentages
//! 2. Round each down to 0.01
//! 3. Hand the missing hundredths to the largest fractional parts

use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Decimal places of a share percentage.
pub const SHARE_SCALE: u32 = 2;

/// Returns each weight's share of the total as a percentage.
///
/// The result has the same length and order as `weights` and sums to exactly 100
/// when the total is positive. When the total is zero every share is zero.
/// Ties in fractional parts favor the earlier weight.
///
/// Returns `None` when the weights sum past the decimal range.
#[must_use]
pub fn percent_shares(weights: &[Decimal]) -> Option<Vec<Decimal>> {
    let total = weights
        .iter()
        .try_fold(Decimal::ZERO, |acc, w| acc.checked_add(*w))?;
    if total <= Decimal::ZERO {
        return Some(vec![Decimal::ZERO; weights.len()]);
    }

    let unit = Decimal::new(1, SHARE_SCALE);

    // Divide first: a weight times 100 can exceed the decimal range.
    let exact: Vec<Decimal> = weights
        .iter()
        .map(|w| *w / total * Decimal::ONE_HUNDRED)
        .collect();

    let mut rounded: Vec<Decimal> = exact
        .iter()
        .map(|e| e.round_dp_with_strategy(SHARE_SCALE, RoundingStrategy::ToZero))
        .collect();

    let sum_rounded: Decimal = rounded.iter().copied().sum();
    let units_to_distribute = ((Decimal::ONE_HUNDRED - sum_rounded) / unit)
        .round_dp_with_strategy(0, RoundingStrategy::ToZero)
        .to_usize()
        .unwrap_or(0);

    if units_to_distribute == 0 {
        return Some(rounded);
    }

    let mut remainders: Vec<(usize, Decimal)> = exact
        .iter()
        .zip(rounded.iter())
        .enumerate()
        .map(|(i, (e, r))| (i, *e - *r))
        .collect();

    // Largest remainder first; stable sort keeps earlier weights ahead on ties.
    remainders.sort_by(|a, b| b.1.cmp(&a.1));

    for (idx, _) in remainders.iter().take(units_to_distribute) {
        rounded[*idx] += unit;
    }

    Some(rounded)
}
