//! Persists a built [`IntervalSet`] between runs so the range listing only
//! has to be parsed when it changes.
//!
//! The cache file holds a `u32` format version followed by the set, both
//! bincode-encoded.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use coverit::ipv4::IPV4_DOMAIN;
use coverit::IntervalSet;
use thiserror::Error;

use crate::error::CheckError;
use crate::source::read_ranges;

pub const CACHE_VERSION: u32 = 1;

/// Why a cached set could not be used. None of these are failures: each one
/// means the set has to be rebuilt from the range source.
#[derive(Debug, Error)]
pub enum CacheUnavailable {
	#[error("no cache has been written yet")]
	Absent,
	#[error("the range source changed after the cache was written")]
	Stale,
	#[error(
		"the cache has format version {found}, expected {expected}",
		expected = CACHE_VERSION
	)]
	VersionMismatch { found: u32 },
	#[error("the cache covers {found:?}, not the IPv4 address space")]
	WrongDomain { found: Range<u64> },
	#[error("the cache could not be read: {0}")]
	Unreadable(String),
}

#[derive(Debug, Clone)]
pub struct Cache {
	path: PathBuf,
}

impl Cache {
	pub fn new(path: PathBuf) -> Cache {
		Cache { path }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Loads the cached set, treating it as stale if `source` was modified
	/// after the cache was written.
	pub fn load(
		&self,
		source: Option<&Path>,
	) -> Result<IntervalSet, CacheUnavailable> {
		let file = match File::open(&self.path) {
			Ok(file) => file,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(CacheUnavailable::Absent)
			}
			Err(e) => return Err(CacheUnavailable::Unreadable(e.to_string())),
		};

		if let Some(source) = source {
			if is_older_than(&file, source) {
				return Err(CacheUnavailable::Stale);
			}
		}

		let mut reader = BufReader::new(file);
		let unreadable =
			|e: bincode::Error| CacheUnavailable::Unreadable(e.to_string());

		let found: u32 =
			bincode::deserialize_from(&mut reader).map_err(unreadable)?;
		if found != CACHE_VERSION {
			return Err(CacheUnavailable::VersionMismatch { found });
		}

		let set: IntervalSet =
			bincode::deserialize_from(&mut reader).map_err(unreadable)?;
		if set.domain() != IPV4_DOMAIN {
			return Err(CacheUnavailable::WrongDomain {
				found: set.domain(),
			});
		}

		Ok(set)
	}

	/// Writes `set` to the cache, replacing any previous contents atomically.
	pub fn store(&self, set: &IntervalSet) -> Result<(), CheckError> {
		self.write(set).map_err(|source| CheckError::WriteCache {
			path: self.path.clone(),
			source,
		})?;

		log::debug!(
			"cached {} nodes in {}",
			set.node_count(),
			self.path.display()
		);
		Ok(())
	}

	fn write(&self, set: &IntervalSet) -> Result<(), bincode::Error> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent)?;
		}

		let staging = self.path.with_extension("tmp");
		let mut writer = BufWriter::new(File::create(&staging)?);
		bincode::serialize_into(&mut writer, &CACHE_VERSION)?;
		bincode::serialize_into(&mut writer, set)?;
		writer.flush()?;
		drop(writer);

		fs::rename(&staging, &self.path)?;
		Ok(())
	}
}

fn is_older_than(cache: &File, source: &Path) -> bool {
	let cache_modified = cache.metadata().and_then(|m| m.modified());
	let source_modified = fs::metadata(source).and_then(|m| m.modified());

	match (cache_modified, source_modified) {
		(Ok(cache), Ok(source)) => source > cache,
		// an unreadable source cannot be rebuilt from either
		_ => false,
	}
}

/// Returns the set of ranges published in `source`, from `cache` when it is
/// usable and by rebuilding otherwise.
///
/// A rebuilt set is written back to `cache`; failing to do so is only
/// logged, since the query itself can still be answered.
pub fn load_or_build(
	source: Option<&Path>,
	cache: Option<&Cache>,
	rebuild: bool,
) -> Result<IntervalSet, CheckError> {
	if let Some(cache) = cache.filter(|_| !rebuild) {
		match cache.load(source) {
			Ok(set) => {
				log::info!(
					"using cached ranges from {}",
					cache.path().display()
				);
				return Ok(set);
			}
			Err(reason) => {
				log::info!("not using {}: {reason}", cache.path().display())
			}
		}
	}

	let source = source.ok_or(CheckError::MissingSource)?;
	let set = IntervalSet::build(IPV4_DOMAIN, read_ranges(source)?)?;
	log::info!(
		"built a set of {} nodes from {}",
		set.node_count(),
		source.display()
	);

	if let Some(cache) = cache {
		if let Err(e) = cache.store(&set) {
			log::warn!("{e}");
		}
	}

	Ok(set)
}

#[cfg(test)]
mod tests {
	use std::time::{Duration, SystemTime};

	use coverit::ipv4::parse_addr;
	use pretty_assertions::assert_eq;
	use serde::Serialize;

	use super::*;
	use crate::source::tests::SAMPLE;

	fn sample_set() -> IntervalSet {
		IntervalSet::build(
			IPV4_DOMAIN,
			[0x0a00_0000..0x0b00_0000, 0xc0a8_0500..0xc0a8_0501],
		)
		.unwrap()
	}

	fn set_modified(path: &Path, time: SystemTime) {
		File::options()
			.write(true)
			.open(path)
			.unwrap()
			.set_modified(time)
			.unwrap();
	}

	fn write_versioned<T: Serialize>(cache: &Cache, body: &T) {
		let mut bytes = bincode::serialize(&CACHE_VERSION).unwrap();
		bytes.extend(bincode::serialize(body).unwrap());
		fs::write(cache.path(), bytes).unwrap();
	}

	#[test]
	fn store_then_load() {
		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("nested").join("ranges.bin"));

		cache.store(&sample_set()).unwrap();

		assert_eq!(cache.load(None).unwrap(), sample_set());
		assert!(!cache.path().with_extension("tmp").exists());
	}

	#[test]
	fn absent_cache() {
		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("ranges.bin"));

		assert!(matches!(cache.load(None), Err(CacheUnavailable::Absent)));
	}

	#[test]
	fn corrupt_cache() {
		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("ranges.bin"));

		fs::write(cache.path(), [1u8, 0, 0, 0, 0xff, 0xff]).unwrap();
		assert!(matches!(
			cache.load(None),
			Err(CacheUnavailable::Unreadable(_))
		));

		fs::write(cache.path(), b"").unwrap();
		assert!(matches!(
			cache.load(None),
			Err(CacheUnavailable::Unreadable(_))
		));
	}

	#[test]
	fn deeply_nested_cache_is_unreadable() {
		#[derive(Clone, Serialize)]
		struct Node {
			low: u64,
			high: u64,
			covered: bool,
			split: bool,
		}

		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("ranges.bin"));
		let link = Node {
			low: 0,
			high: 2,
			covered: false,
			split: true,
		};
		write_versioned(&cache, &vec![link; 100_000]);

		assert!(matches!(
			cache.load(None),
			Err(CacheUnavailable::Unreadable(_))
		));
	}

	#[test]
	fn cache_over_another_domain() {
		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("ranges.bin"));
		let source = dir.path().join("ip-ranges.json");
		fs::write(&source, SAMPLE).unwrap();

		let foreign = IntervalSet::build(0..256, [0..10]).unwrap();
		write_versioned(&cache, &foreign);
		set_modified(&source, SystemTime::now() - Duration::from_secs(60));

		assert!(matches!(
			cache.load(Some(source.as_path())),
			Err(CacheUnavailable::WrongDomain { found }) if found == (0..256)
		));

		let set =
			load_or_build(Some(source.as_path()), Some(&cache), false).unwrap();
		assert_eq!(set.domain(), IPV4_DOMAIN);
		assert_eq!(set.contains(parse_addr("3.5.141.7").unwrap()), Ok(true));
		assert_eq!(cache.load(None).unwrap(), set);
	}

	#[test]
	fn version_mismatch() {
		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("ranges.bin"));

		let mut bytes = bincode::serialize(&(CACHE_VERSION + 1)).unwrap();
		bytes.extend(bincode::serialize(&sample_set()).unwrap());
		fs::write(cache.path(), bytes).unwrap();

		assert!(matches!(
			cache.load(None),
			Err(CacheUnavailable::VersionMismatch { found })
				if found == CACHE_VERSION + 1
		));
	}

	#[test]
	fn stale_cache() {
		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("ranges.bin"));
		let source = dir.path().join("ip-ranges.json");

		fs::write(&source, SAMPLE).unwrap();
		cache.store(&sample_set()).unwrap();

		let now = SystemTime::now();
		set_modified(cache.path(), now - Duration::from_secs(60));
		set_modified(&source, now);
		assert!(matches!(
			cache.load(Some(source.as_path())),
			Err(CacheUnavailable::Stale)
		));

		set_modified(&source, now - Duration::from_secs(120));
		assert_eq!(cache.load(Some(source.as_path())).unwrap(), sample_set());
	}

	#[test]
	fn load_or_build_requires_a_source_without_a_cache() {
		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("ranges.bin"));

		assert!(matches!(
			load_or_build(None, None, false),
			Err(CheckError::MissingSource)
		));
		assert!(matches!(
			load_or_build(None, Some(&cache), false),
			Err(CheckError::MissingSource)
		));
	}

	#[test]
	fn load_or_build_populates_and_reuses_the_cache() {
		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("ranges.bin"));
		let source = dir.path().join("ip-ranges.json");
		fs::write(&source, SAMPLE).unwrap();

		let built =
			load_or_build(Some(source.as_path()), Some(&cache), false).unwrap();
		assert_eq!(built.contains(parse_addr("3.5.141.7").unwrap()), Ok(true));
		assert_eq!(built.contains(parse_addr("3.5.144.0").unwrap()), Ok(false));
		assert_eq!(cache.load(None).unwrap(), built);

		// the source is no longer needed once cached
		fs::remove_file(&source).unwrap();
		assert_eq!(load_or_build(None, Some(&cache), false).unwrap(), built);

		// but a forced rebuild still reads it
		assert!(matches!(
			load_or_build(Some(source.as_path()), Some(&cache), true),
			Err(CheckError::ReadSource { .. })
		));
	}

	#[test]
	fn unusable_cache_falls_back_to_the_source() {
		let dir = tempfile::tempdir().unwrap();
		let cache = Cache::new(dir.path().join("ranges.bin"));
		let source = dir.path().join("ip-ranges.json");
		fs::write(&source, SAMPLE).unwrap();
		fs::write(cache.path(), b"not a cache").unwrap();

		let set =
			load_or_build(Some(source.as_path()), Some(&cache), false).unwrap();
		assert_eq!(set.contains(parse_addr("52.94.79.255").unwrap()), Ok(true));
		assert_eq!(cache.load(None).unwrap(), set);
	}

	#[test]
	fn malformed_source_is_an_error() {
		let dir = tempfile::tempdir().unwrap();
		let source = dir.path().join("ip-ranges.json");
		fs::write(&source, r#"{"prefixes": "none"}"#).unwrap();

		assert!(matches!(
			load_or_build(Some(source.as_path()), None, false),
			Err(CheckError::MalformedSource { .. })
		));
	}
}
