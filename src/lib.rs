//! This crate provides [`IntervalSet`], a Coverage Interval Tree for
//! answering "is this point in any of these ranges?" over a fixed integer
//! domain, after any number of possibly-overlapping ranges have been
//! merged together.
//!
//! `coverit` stands for COVERage Interval Tree.
//!
//! The motivating use-case is testing whether an IP address belongs to a
//! provider's published address blocks (see the [`ipv4`] module), but the
//! set works over any half-open `u64` domain.
//!
//! ## Example
//!
//! ```rust
//! use coverit::IntervalSet;
//!
//! let mut set = IntervalSet::new(0..256).unwrap();
//!
//! set.insert(10..20).unwrap();
//! set.insert(15..25).unwrap();
//!
//! assert_eq!(set.contains(12), Ok(true));
//! assert_eq!(set.contains(25), Ok(false));
//! ```
//!
//! ## Key Understandings and Philosophies:
//!
//! ### Half-Open Ranges
//!
//! Every range in this crate, including the domain itself, is half-open:
//! `10..20` contains `10` but not `20`. A range is only valid if it contains
//! at least one point, so `4..4` and `9..8` are both rejected.
//!
//! ### The Partition Tree
//!
//! The set is a binary tree whose root spans the whole domain. Every node
//! that needs to be told apart into "in" and "out" regions is split exactly
//! at its midpoint into two children. A node whose whole span is in the set
//! is marked covered and its children, if any, are dropped: everything
//! below it is covered implicitly.
//!
//! Nodes are only created where an inserted range has an edge, so memory
//! grows with the number of distinct range edges rather than the size of
//! the domain. Since each split halves a span, both the depth of the tree
//! and the cost of a query are bounded by the domain's bit-width.
//!
//! ### Canonical Form
//!
//! After each insertion, any node whose two halves are both covered is
//! folded back into a single covered node. Two sets over the same domain
//! therefore compare equal exactly when they contain the same points,
//! regardless of the order or shape of the ranges they were built from.
//!
//! ### Contract Violations
//!
//! Inserting an invalid range, or querying a point outside the domain,
//! returns an [`IntervalError`] rather than silently doing nothing or
//! answering `false`.
//!
//! # Similar Crates
//!
//! - <https://docs.rs/nodit>
//!   Stores the merged ranges themselves in a `BTreeMap`, supports removal
//!   and iteration, with `O(log n)` queries in the number of ranges.
//! - <https://docs.rs/rangemap>
//!   Very similar to nodit but can only use [`Range`]s and
//!   [`RangeInclusive`]s as keys.
//! - <https://docs.rs/iprange>
//!   A prefix trie specialised to IPv4/IPv6 networks.
//!
//! [`range`]: https://doc.rust-lang.org/std/ops/struct.Range.html
//! [`rangeinclusive`]: https://doc.rust-lang.org/std/ops/struct.RangeInclusive.html

#![allow(clippy::tabs_in_doc_comments)]
#![allow(clippy::needless_return)]

pub mod error;
pub mod interval_set;
pub mod ipv4;

pub(crate) mod partition_node;
pub(crate) mod span;

pub use crate::error::IntervalError;
pub use crate::interval_set::IntervalSet;
