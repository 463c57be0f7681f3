//! A module containing [`IntervalSet`].

use core::ops::Range;

use crate::partition_node::PartitionNode;
use crate::span::{checked_point, checked_range, Span};
use crate::IntervalError;

/// A set of `u64` points over a fixed half-open domain, built from the
/// union of any number of possibly-overlapping half-open ranges.
///
/// The set is backed by a binary partition tree over the domain. A range
/// is inserted by splitting only the nodes it partially overlaps and
/// marking the nodes it fully covers, so memory grows with the number of
/// range edges rather than the size of the domain. Point queries walk a
/// single root-to-leaf path and therefore take time proportional to the
/// domain's bit-width, independent of how many ranges were inserted.
///
/// Ranges can only be added: there is no removal and no enumeration.
///
/// Once built, a set is safe to share between threads for concurrent
/// [`contains()`](IntervalSet::contains) calls. To update a shared set,
/// build a new one and swap it in.
///
/// # Examples
/// ```
/// use coverit::IntervalSet;
///
/// let mut set = IntervalSet::new(0..256).unwrap();
///
/// set.insert(10..20).unwrap();
/// set.insert(15..25).unwrap();
///
/// assert_eq!(set.contains(5), Ok(false));
/// assert_eq!(set.contains(12), Ok(true));
/// assert_eq!(set.contains(24), Ok(true));
/// assert_eq!(set.contains(25), Ok(false));
///
/// assert!(set.contains(256).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntervalSet {
	root: PartitionNode,
}

impl IntervalSet {
	/// Makes a new, empty `IntervalSet` over `domain`.
	///
	/// # Errors
	///
	/// Returns [`IntervalError::InvalidDomain`] if `domain` contains no
	/// points.
	///
	/// # Examples
	/// ```
	/// use coverit::{IntervalError, IntervalSet};
	///
	/// let set = IntervalSet::new(0..1 << 32).unwrap();
	/// assert!(set.is_empty());
	///
	/// assert_eq!(
	/// 	IntervalSet::new(10..10),
	/// 	Err(IntervalError::InvalidDomain { low: 10, high: 10 })
	/// );
	/// ```
	pub fn new(domain: Range<u64>) -> Result<IntervalSet, IntervalError> {
		let span = Span::new(domain.start, domain.end).ok_or(
			IntervalError::InvalidDomain {
				low: domain.start,
				high: domain.end,
			},
		)?;

		Ok(IntervalSet {
			root: PartitionNode::new(span),
		})
	}

	/// Makes a new `IntervalSet` over `domain` containing the union of
	/// `ranges`.
	///
	/// # Errors
	///
	/// Returns the first error produced by [`IntervalSet::new()`] or
	/// [`IntervalSet::insert()`]; no partially built set is returned.
	///
	/// # Examples
	/// ```
	/// use coverit::IntervalSet;
	///
	/// let set =
	/// 	IntervalSet::build(0..1 << 32, [3232235520..3232301056]).unwrap();
	///
	/// assert_eq!(set.contains(3232236805), Ok(true));
	/// assert_eq!(set.contains(3232301057), Ok(false));
	///
	/// assert!(IntervalSet::build(0..256, [0..10, 250..300]).is_err());
	/// ```
	pub fn build<T>(
		domain: Range<u64>,
		ranges: T,
	) -> Result<IntervalSet, IntervalError>
	where
		T: IntoIterator<Item = Range<u64>>,
	{
		let mut set = IntervalSet::new(domain)?;
		set.insert_all(ranges)?;
		return Ok(set);
	}

	/// Adds every point of `range` to the set.
	///
	/// Inserting a range that is already contained in the set leaves it
	/// unchanged.
	///
	/// # Errors
	///
	/// Returns [`IntervalError::InvalidRange`] if `range` is empty or not
	/// entirely within the set's domain, in which case the set is not
	/// modified.
	///
	/// # Examples
	/// ```
	/// use coverit::IntervalSet;
	///
	/// let mut set = IntervalSet::new(0..256).unwrap();
	///
	/// assert_eq!(set.insert(40..41), Ok(()));
	/// assert_eq!(set.contains(40), Ok(true));
	/// assert_eq!(set.contains(41), Ok(false));
	///
	/// assert!(set.insert(41..41).is_err());
	/// assert!(set.insert(200..257).is_err());
	/// ```
	pub fn insert(&mut self, range: Range<u64>) -> Result<(), IntervalError> {
		let span = checked_range(range, self.root.span())?;
		log::trace!("inserting {}..{}", span.low, span.high);

		self.root.insert(span);
		Ok(())
	}

	/// Inserts every range of `ranges` in iteration order.
	///
	/// The resulting set does not depend on the order of `ranges`.
	///
	/// # Errors
	///
	/// Stops at, and returns, the first error from
	/// [`IntervalSet::insert()`]. Ranges before the failing one remain
	/// inserted.
	pub fn insert_all<T>(&mut self, ranges: T) -> Result<(), IntervalError>
	where
		T: IntoIterator<Item = Range<u64>>,
	{
		let mut count = 0usize;
		for range in ranges {
			self.insert(range)?;
			count += 1;
		}

		log::debug!(
			"inserted {count} ranges, the tree now holds {} nodes",
			self.node_count()
		);
		Ok(())
	}

	/// Returns `Ok(true)` if `point` was included by any prior insertion,
	/// and `Ok(false)` if not.
	///
	/// # Errors
	///
	/// Returns [`IntervalError::OutOfDomain`] if `point` is not within the
	/// set's domain.
	///
	/// # Examples
	/// ```
	/// use coverit::{IntervalError, IntervalSet};
	///
	/// let set = IntervalSet::build(16..32, [20..24]).unwrap();
	///
	/// assert_eq!(set.contains(20), Ok(true));
	/// assert_eq!(set.contains(24), Ok(false));
	/// assert_eq!(
	/// 	set.contains(8),
	/// 	Err(IntervalError::OutOfDomain {
	/// 		point: 8,
	/// 		domain_low: 16,
	/// 		domain_high: 32
	/// 	})
	/// );
	/// ```
	pub fn contains(&self, point: u64) -> Result<bool, IntervalError> {
		let point = checked_point(point, self.root.span())?;
		Ok(self.root.contains(point))
	}

	/// Returns the domain the set was created over.
	pub fn domain(&self) -> Range<u64> {
		self.root.span().into()
	}

	/// Returns `true` if no point of the domain is in the set.
	pub fn is_empty(&self) -> bool {
		!self.root.covered && self.root.is_leaf()
	}

	/// Returns the number of tree nodes currently materialized.
	///
	/// This is `1` both for an empty set and for a set covering its whole
	/// domain.
	pub fn node_count(&self) -> usize {
		self.root.node_count()
	}
}

#[cfg(feature = "serde")]
mod serde {
	use serde::de::Error;
	use serde::{Deserialize, Deserializer, Serialize, Serializer};

	use crate::partition_node::{FlatNode, PartitionNode};
	use crate::IntervalSet;

	impl Serialize for IntervalSet {
		fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
		where
			S: Serializer,
		{
			serializer.collect_seq(self.root.to_preorder())
		}
	}

	impl<'de> Deserialize<'de> for IntervalSet {
		fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
		where
			D: Deserializer<'de>,
		{
			let nodes = Vec::<FlatNode>::deserialize(deserializer)?;
			let root = PartitionNode::from_preorder(&nodes).map_err(|reason| {
				D::Error::custom(format_args!(
					"invalid partition tree: {reason}"
				))
			})?;

			Ok(IntervalSet { root })
		}
	}
}
