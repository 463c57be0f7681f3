use std::net::AddrParseError;
use std::path::PathBuf;

use coverit::IntervalError;
use thiserror::Error;

/// Errors that stop the tool from answering a query.
#[derive(Debug, Error)]
pub enum CheckError {
	#[error("{input:?} is not an IPv4 address")]
	BadAddress {
		input: String,
		source: AddrParseError,
	},
	#[error("could not read the range source {}", path.display())]
	ReadSource {
		path: PathBuf,
		source: std::io::Error,
	},
	#[error("the range source {} is malformed", path.display())]
	MalformedSource {
		path: PathBuf,
		source: serde_json::Error,
	},
	#[error(
		"no usable cache and no range source; pass --source or set \
		 COVERIT_SOURCE"
	)]
	MissingSource,
	#[error("could not write the cache {}", path.display())]
	WriteCache {
		path: PathBuf,
		source: bincode::Error,
	},
	#[error(transparent)]
	Interval(#[from] IntervalError),
}
