//! A module containing [`IntervalError`].

use thiserror::Error;

/// The error returned when a caller breaks the contract of an
/// [`IntervalSet`](crate::IntervalSet) operation.
///
/// None of these are transient: the set never retries or recovers from
/// them internally. A failing [`insert()`](crate::IntervalSet::insert)
/// leaves the set unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IntervalError {
	/// The domain given to [`IntervalSet::new()`](crate::IntervalSet::new)
	/// contains no points.
	#[error("the domain {low}..{high} contains no points")]
	InvalidDomain {
		/// The inclusive start of the rejected domain.
		low: u64,
		/// The exclusive end of the rejected domain.
		high: u64,
	},
	/// An inserted range is empty, reversed, or not within the domain.
	#[error(
		"the range {low}..{high} is empty or lies outside the domain \
		 {domain_low}..{domain_high}"
	)]
	InvalidRange {
		/// The inclusive start of the rejected range.
		low: u64,
		/// The exclusive end of the rejected range.
		high: u64,
		/// The inclusive start of the set's domain.
		domain_low: u64,
		/// The exclusive end of the set's domain.
		domain_high: u64,
	},
	/// A queried point is not within the domain.
	#[error(
		"the point {point} lies outside the domain {domain_low}..{domain_high}"
	)]
	OutOfDomain {
		/// The rejected point.
		point: u64,
		/// The inclusive start of the set's domain.
		domain_low: u64,
		/// The exclusive end of the set's domain.
		domain_high: u64,
	},
}
