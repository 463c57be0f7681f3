//! A module containing [`PartitionNode`], the recursive unit of the
//! partition tree behind [`IntervalSet`](crate::IntervalSet).

use smallvec::{smallvec, SmallVec};

use crate::span::{Relation, Span};

/// Each split halves a span, so a walk holds at most one pending sibling
/// per level. Only the deepest walks over a 64-bit domain spill to the heap.
const WORKLIST_INLINE: usize = 64;

/// A span narrower than 2^64 reaches a single point after at most this many
/// halvings.
#[cfg(feature = "serde")]
const MAX_DEPTH: u32 = u64::BITS;

/// A node of the partition tree covering the half-open span
/// `[low, high)`.
///
/// Children, when present, always come as a pair splitting the span
/// exactly at its midpoint. A covered node never has children: everything
/// below it is implicitly covered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PartitionNode {
	pub(crate) low: u64,
	pub(crate) high: u64,
	pub(crate) covered: bool,
	pub(crate) left: Option<Box<PartitionNode>>,
	pub(crate) right: Option<Box<PartitionNode>>,
}

/// A [`PartitionNode`] without its children, as it appears in the pre-order
/// node list a tree is serialized to.
#[cfg(feature = "serde")]
#[derive(
	Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub(crate) struct FlatNode {
	pub(crate) low: u64,
	pub(crate) high: u64,
	pub(crate) covered: bool,
	/// Whether the node's two children follow it in the list.
	pub(crate) split: bool,
}

impl PartitionNode {
	pub(crate) fn new(span: Span) -> PartitionNode {
		PartitionNode {
			low: span.low,
			high: span.high,
			covered: false,
			left: None,
			right: None,
		}
	}

	pub(crate) fn span(&self) -> Span {
		Span {
			low: self.low,
			high: self.high,
		}
	}

	pub(crate) fn is_leaf(&self) -> bool {
		self.left.is_none() && self.right.is_none()
	}

	fn cover(&mut self) {
		self.covered = true;
		self.left = None;
		self.right = None;
	}

	/// Returns both children, materializing them on first use from
	/// `halves`, the midpoint split of this node's span.
	fn split(
		&mut self,
		(left_span, right_span): (Span, Span),
	) -> (&mut PartitionNode, &mut PartitionNode) {
		let left = self
			.left
			.get_or_insert_with(|| Box::new(PartitionNode::new(left_span)));
		let right = self
			.right
			.get_or_insert_with(|| Box::new(PartitionNode::new(right_span)));

		(&mut **left, &mut **right)
	}

	/// Marks every point of `range` inside this subtree as covered.
	///
	/// `range` must already be validated against the domain.
	pub(crate) fn insert(&mut self, range: Span) {
		self.mark(range);
		self.coalesce(range);
	}

	fn mark(&mut self, range: Span) {
		let mut worklist: SmallVec<[&mut PartitionNode; WORKLIST_INLINE]> =
			smallvec![self];

		while let Some(node) = worklist.pop() {
			if node.covered {
				continue;
			}

			match range.relation_to(node.span()) {
				Relation::Disjoint => {}
				Relation::Covers => node.cover(),
				Relation::Splits => match node.span().halves() {
					Some(halves) => {
						let (left, right) = node.split(halves);
						worklist.push(left);
						worklist.push(right);
					}
					// a unit span has no interior edge to split on
					None => node.cover(),
				},
			}
		}
	}

	/// Folds split nodes whose children are both covered back into a single
	/// covered node, along the path touched by `range`.
	///
	/// Recursion depth is bounded by the domain's bit-width.
	fn coalesce(&mut self, range: Span) {
		if self.covered || !range.overlaps(self.span()) {
			return;
		}

		if let (Some(left), Some(right)) =
			(self.left.as_deref_mut(), self.right.as_deref_mut())
		{
			left.coalesce(range);
			right.coalesce(range);

			if left.covered && right.covered {
				self.cover();
			}
		}
	}

	/// Returns whether `point` is covered, descending from this node.
	///
	/// `point` must lie within this node's span.
	pub(crate) fn contains(&self, point: u64) -> bool {
		let mut node = self;
		while let Some(child) = node.child_at(point) {
			node = child;
		}

		node.covered
	}

	fn child_at(&self, point: u64) -> Option<&PartitionNode> {
		if point < self.span().midpoint() {
			self.left.as_deref()
		} else {
			self.right.as_deref()
		}
	}

	pub(crate) fn node_count(&self) -> usize {
		let mut count = 0;
		let mut worklist: SmallVec<[&PartitionNode; WORKLIST_INLINE]> =
			smallvec![self];

		while let Some(node) = worklist.pop() {
			count += 1;
			worklist.extend(node.left.as_deref());
			worklist.extend(node.right.as_deref());
		}

		count
	}

	/// Checks every structural invariant of the subtree rooted here,
	/// returning a description of the first violation found.
	#[cfg(any(feature = "serde", test))]
	pub(crate) fn validate(&self) -> Result<(), &'static str> {
		let mut worklist: SmallVec<[&PartitionNode; WORKLIST_INLINE]> =
			smallvec![self];

		while let Some(node) = worklist.pop() {
			let span = Span::new(node.low, node.high)
				.ok_or("node span contains no points")?;

			match (node.left.as_deref(), node.right.as_deref()) {
				(None, None) => {}
				(Some(left), Some(right)) => {
					if node.covered {
						return Err("covered node has children");
					}
					let (left_span, right_span) =
						span.halves().ok_or("unit span has children")?;
					if left.span() != left_span || right.span() != right_span {
						return Err("children do not halve their parent");
					}
					worklist.push(left);
					worklist.push(right);
				}
				_ => return Err("node has exactly one child"),
			}
		}

		Ok(())
	}

	/// Lists the nodes of this subtree in pre-order.
	#[cfg(feature = "serde")]
	pub(crate) fn to_preorder(&self) -> Vec<FlatNode> {
		let mut output = Vec::with_capacity(self.node_count());
		let mut worklist: SmallVec<[&PartitionNode; WORKLIST_INLINE]> =
			smallvec![self];

		while let Some(node) = worklist.pop() {
			output.push(FlatNode {
				low: node.low,
				high: node.high,
				covered: node.covered,
				split: !node.is_leaf(),
			});
			worklist.extend(node.right.as_deref());
			worklist.extend(node.left.as_deref());
		}

		output
	}

	/// Rebuilds a tree from its pre-order node list, rejecting any list that
	/// does not describe exactly one valid tree.
	///
	/// Nesting is checked before it is followed, so a hostile list cannot
	/// recurse deeper than [`MAX_DEPTH`].
	#[cfg(feature = "serde")]
	pub(crate) fn from_preorder(
		nodes: &[FlatNode],
	) -> Result<PartitionNode, &'static str> {
		let mut nodes = nodes.iter();
		let root = PartitionNode::take_preorder(&mut nodes, 0)?;
		if nodes.next().is_some() {
			return Err("node list continues after the tree");
		}

		root.validate()?;
		Ok(root)
	}

	#[cfg(feature = "serde")]
	fn take_preorder(
		nodes: &mut core::slice::Iter<FlatNode>,
		depth: u32,
	) -> Result<PartitionNode, &'static str> {
		if depth > MAX_DEPTH {
			return Err("tree is deeper than any span can be halved");
		}

		let flat = nodes.next().ok_or("node list ends inside the tree")?;
		let mut node = PartitionNode {
			low: flat.low,
			high: flat.high,
			covered: flat.covered,
			left: None,
			right: None,
		};

		if flat.split {
			let left = PartitionNode::take_preorder(nodes, depth + 1)?;
			let right = PartitionNode::take_preorder(nodes, depth + 1)?;
			node.left = Some(Box::new(left));
			node.right = Some(Box::new(right));
		}

		Ok(node)
	}
}
