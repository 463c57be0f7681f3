//! Reads a provider's published range listing.
//!
//! The listing is a JSON document in the shape of AWS's `ip-ranges.json`:
//! a `prefixes` array whose entries each carry an `ip_prefix` in CIDR
//! notation. Every other field, including the `ipv6_prefixes` array, is
//! ignored.

use std::ops::Range;
use std::path::Path;

use coverit::ipv4::prefix_range;
use coverit::IntervalError;
use ipnetwork::Ipv4Network;
use itertools::Itertools;
use serde::Deserialize;

use crate::error::CheckError;

#[derive(Debug, Deserialize)]
pub struct RangeDocument {
	#[serde(rename = "syncToken")]
	pub sync_token: Option<String>,
	#[serde(rename = "createDate")]
	pub create_date: Option<String>,
	pub prefixes: Vec<PrefixEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PrefixEntry {
	pub ip_prefix: Ipv4Network,
}

impl RangeDocument {
	pub fn parse(json: &str) -> serde_json::Result<RangeDocument> {
		serde_json::from_str(json)
	}

	/// Returns the distinct ranges of every prefix in ascending order.
	///
	/// A prefix is listed once per service using it, so duplicates are common.
	pub fn ranges(&self) -> Result<Vec<Range<u64>>, IntervalError> {
		let ranges: Vec<Range<u64>> = self
			.prefixes
			.iter()
			.map(|entry| {
				prefix_range(entry.ip_prefix.ip(), entry.ip_prefix.prefix())
			})
			.collect::<Result<_, _>>()?;

		Ok(ranges
			.into_iter()
			.sorted_unstable_by_key(|range| (range.start, range.end))
			.dedup()
			.collect())
	}
}

/// Reads and parses the range listing at `path`.
pub fn read_ranges(path: &Path) -> Result<Vec<Range<u64>>, CheckError> {
	let json = std::fs::read_to_string(path).map_err(|source| {
		CheckError::ReadSource {
			path: path.to_path_buf(),
			source,
		}
	})?;

	let document = RangeDocument::parse(&json).map_err(|source| {
		CheckError::MalformedSource {
			path: path.to_path_buf(),
			source,
		}
	})?;

	let ranges = document.ranges()?;
	log::info!(
		"read {} prefixes ({} distinct) from {}",
		document.prefixes.len(),
		ranges.len(),
		path.display()
	);
	if let Some(token) = &document.sync_token {
		log::debug!(
			"range source sync token {token}, created {}",
			document.create_date.as_deref().unwrap_or("at an unknown date")
		);
	}

	Ok(ranges)
}
