//! A module containing [`Span`], the half-open interval every node of the
//! partition tree covers, and the helpers used to classify an inserted
//! range against it.

use core::ops::Range;

use crate::IntervalError;

/// A half-open interval `[low, high)` over `u64` points.
///
/// A `Span` is only ever constructed valid, that is with `low < high`, so
/// that it always contains at least one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Span {
	pub(crate) low: u64,
	pub(crate) high: u64,
}

/// How an inserted range relates to a node's span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
	/// The range shares no point with the span.
	Disjoint,
	/// The range contains every point of the span.
	Covers,
	/// The range contains some, but not all, points of the span.
	///
	/// This is either a partial overlap across one of the span's edges or
	/// the range being engulfed strictly inside the span.
	Splits,
}

impl Span {
	/// Returns `None` if `low >= high`.
	pub(crate) fn new(low: u64, high: u64) -> Option<Span> {
		(low < high).then_some(Span { low, high })
	}

	pub(crate) fn width(&self) -> u64 {
		self.high - self.low
	}

	pub(crate) fn midpoint(&self) -> u64 {
		self.low + self.width() / 2
	}

	/// Splits the span at its midpoint into `[low, mid)` and `[mid, high)`.
	///
	/// Returns `None` for spans of a single point, whose left half would be
	/// empty.
	pub(crate) fn halves(&self) -> Option<(Span, Span)> {
		let mid = self.midpoint();
		Some((Span::new(self.low, mid)?, Span::new(mid, self.high)?))
	}

	pub(crate) fn contains_point(&self, point: u64) -> bool {
		point >= self.low && point < self.high
	}

	/// Returns `true` if every point of `other` is also in `self`.
	pub(crate) fn contains_span(&self, other: Span) -> bool {
		self.low <= other.low && self.high >= other.high
	}

	pub(crate) fn overlaps(&self, other: Span) -> bool {
		self.low < other.high && other.low < self.high
	}

	/// Classifies `self`, an inserted range, against a node's `span`.
	pub(crate) fn relation_to(&self, span: Span) -> Relation {
		if !self.overlaps(span) {
			Relation::Disjoint
		} else if self.contains_span(span) {
			Relation::Covers
		} else {
			Relation::Splits
		}
	}
}

impl From<Span> for Range<u64> {
	fn from(span: Span) -> Self {
		span.low..span.high
	}
}

/// Validates `range` as an insertion into a set over `domain`.
pub(crate) fn checked_range(
	range: Range<u64>,
	domain: Span,
) -> Result<Span, IntervalError> {
	let invalid = || IntervalError::InvalidRange {
		low: range.start,
		high: range.end,
		domain_low: domain.low,
		domain_high: domain.high,
	};

	let span = Span::new(range.start, range.end).ok_or_else(invalid)?;
	if !domain.contains_span(span) {
		return Err(invalid());
	}

	Ok(span)
}

/// Validates `point` as a query against a set over `domain`.
pub(crate) fn checked_point(
	point: u64,
	domain: Span,
) -> Result<u64, IntervalError> {
	if domain.contains_point(point) {
		Ok(point)
	} else {
		Err(IntervalError::OutOfDomain {
			point,
			domain_low: domain.low,
			domain_high: domain.high,
		})
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	const NUMBERS: &[u64] = &[0, 1, 2, 3, 4, 5, 6, 7, 8];

	fn s(low: u64, high: u64) -> Span {
		Span::new(low, high).unwrap()
	}

	fn all_valid_test_spans() -> Vec<Span> {
		let mut output = Vec::new();
		for low in NUMBERS {
			for high in NUMBERS {
				if let Some(span) = Span::new(*low, *high) {
					output.push(span);
				}
			}
		}
		output
	}

	#[test]
	fn new_rejects_empty_and_reversed() {
		assert_eq!(Span::new(3, 3), None);
		assert_eq!(Span::new(4, 3), None);
		assert_eq!(Span::new(3, 4), Some(Span { low: 3, high: 4 }));
	}

	#[test]
	fn halves_partition_exactly() {
		assert_eq!(s(0, 256).halves(), Some((s(0, 128), s(128, 256))));
		assert_eq!(s(3, 6).halves(), Some((s(3, 4), s(4, 6))));
		assert_eq!(s(4, 6).halves(), Some((s(4, 5), s(5, 6))));
		assert_eq!(s(7, 8).halves(), None);

		let top = s(0, u64::MAX);
		let (left, right) = top.halves().unwrap();
		assert_eq!(left.high, right.low);
		assert_eq!(left.low, 0);
		assert_eq!(right.high, u64::MAX);
	}

	#[test]
	fn relation_tests() {
		let node = s(10, 20);
		assert_eq!(s(0, 10).relation_to(node), Relation::Disjoint);
		assert_eq!(s(20, 30).relation_to(node), Relation::Disjoint);
		assert_eq!(s(10, 20).relation_to(node), Relation::Covers);
		assert_eq!(s(0, 30).relation_to(node), Relation::Covers);
		assert_eq!(s(5, 11).relation_to(node), Relation::Splits);
		assert_eq!(s(19, 25).relation_to(node), Relation::Splits);
		assert_eq!(s(12, 15).relation_to(node), Relation::Splits);
		assert_eq!(s(10, 19).relation_to(node), Relation::Splits);
	}

	#[test]
	fn relation_matches_mathematical_definition() {
		for range in all_valid_test_spans() {
			for node in all_valid_test_spans() {
				let inside = (node.low..node.high)
					.filter(|x| range.contains_point(*x))
					.count() as u64;

				let expected = match inside {
					0 => Relation::Disjoint,
					n if n == node.width() => Relation::Covers,
					_ => Relation::Splits,
				};

				if range.relation_to(node) != expected {
					dbg!(range, node, expected);
					panic!("Discrepancy in relation_to() detected!");
				}
			}
		}
	}

	#[test]
	fn unit_spans_are_never_split_by_a_range() {
		for range in all_valid_test_spans() {
			for point in NUMBERS {
				let unit = s(*point, point + 1);
				assert_eq!(unit.width(), 1);
				assert_ne!(range.relation_to(unit), Relation::Splits);
			}
		}
	}

	#[test]
	fn checked_range_tests() {
		let domain = s(0, 256);
		assert_eq!(checked_range(10..20, domain), Ok(s(10, 20)));
		assert_eq!(checked_range(0..256, domain), Ok(s(0, 256)));
		assert!(matches!(
			checked_range(20..20, domain),
			Err(IntervalError::InvalidRange { low: 20, high: 20, .. })
		));
		assert!(matches!(
			checked_range(20..10, domain),
			Err(IntervalError::InvalidRange { .. })
		));
		assert!(matches!(
			checked_range(250..257, domain),
			Err(IntervalError::InvalidRange { .. })
		));
		assert!(matches!(
			checked_range(s(5, 10).into(), s(6, 256)),
			Err(IntervalError::InvalidRange { .. })
		));
	}

	#[test]
	fn checked_point_tests() {
		let domain = s(16, 32);
		assert_eq!(checked_point(16, domain), Ok(16));
		assert_eq!(checked_point(31, domain), Ok(31));
		assert_eq!(
			checked_point(32, domain),
			Err(IntervalError::OutOfDomain {
				point: 32,
				domain_low: 16,
				domain_high: 32
			})
		);
		assert!(checked_point(15, domain).is_err());
	}
}
