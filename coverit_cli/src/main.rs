/*
	coverit

	Checks whether an IPv4 address belongs to a provider's published address
	ranges, such as AWS's ip-ranges.json.

	The ranges are merged into a coverit::IntervalSet which is cached on disk,
	so the listing is only parsed again when it changes.
*/

mod args;
mod cache;
mod error;
mod source;

use anyhow::Error;
use coverit::ipv4::parse_addr;

use crate::args::{opts, Opts};
use crate::cache::{load_or_build, Cache};
use crate::error::CheckError;

fn main() -> Result<(), Error> {
	env_logger::Builder::from_env(
		env_logger::Env::default().default_filter_or("warn"),
	)
	.init();

	let opts = opts().run();

	match run(&opts) {
		Ok(contained) => {
			println!("{contained}");
			Ok(())
		}
		Err(e) => {
			eprintln!("coverit: {e}");
			for cause in e.chain().skip(1) {
				eprintln!("Caused by: {cause}");
			}
			std::process::exit(1);
		}
	}
}

fn run(opts: &Opts) -> Result<bool, Error> {
	let point =
		parse_addr(&opts.address).map_err(|source| CheckError::BadAddress {
			input: opts.address.clone(),
			source,
		})?;

	let cache = opts.cache_path().map(Cache::new);
	let set =
		load_or_build(opts.source.as_deref(), cache.as_ref(), opts.rebuild)?;

	let contained = set.contains(point)?;
	log::debug!("{} -> {contained}", opts.address);
	Ok(contained)
}
