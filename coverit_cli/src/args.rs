use std::path::PathBuf;

use bpaf::*;

#[derive(Debug, Clone)]
pub struct Opts {
	pub source: Option<PathBuf>,
	pub cache: Option<PathBuf>,
	pub no_cache: bool,
	pub rebuild: bool,
	pub address: String,
}

impl Opts {
	/// The cache file to use, if any.
	pub fn cache_path(&self) -> Option<PathBuf> {
		if self.no_cache {
			return None;
		}
		self.cache.clone().or_else(default_cache_path)
	}
}

/// `$XDG_CACHE_HOME/coverit/ranges.bin`, falling back to
/// `$HOME/.cache/coverit/ranges.bin`.
fn default_cache_path() -> Option<PathBuf> {
	let base = std::env::var_os("XDG_CACHE_HOME")
		.filter(|dir| !dir.is_empty())
		.map(PathBuf::from)
		.or_else(|| {
			let home = PathBuf::from(std::env::var_os("HOME")?);
			Some(home.join(".cache"))
		})?;

	Some(base.join("coverit").join("ranges.bin"))
}

/// Set up bpaf argument parsing.
pub fn opts() -> OptionParser<Opts> {
	let source = short('s')
		.long("source")
		.env("COVERIT_SOURCE")
		.help("Path to the provider's ip-ranges.json listing")
		.argument::<PathBuf>("SOURCE")
		.optional();

	let cache = short('c')
		.long("cache")
		.env("COVERIT_CACHE")
		.help("Path to the cache of the built range set")
		.argument::<PathBuf>("CACHE")
		.optional();

	let no_cache = long("no-cache")
		.help("Neither read nor write the cache")
		.switch();

	let rebuild = long("rebuild")
		.help("Rebuild from the range listing even if the cache is usable")
		.switch();

	let address = positional::<String>("ADDRESS")
		.help("IPv4 address to check, e.g. 52.94.76.10");

	construct!(Opts {
		source,
		cache,
		no_cache,
		rebuild,
		address,
	})
	.to_options()
	.descr(
		"Check whether an IPv4 address lies in a provider's published \
		 address ranges",
	)
	.version(env!("CARGO_PKG_VERSION"))
}
