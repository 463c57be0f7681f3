//! A module containing helpers for using an [`IntervalSet`] over the IPv4
//! address space.
//!
//! Addresses are encoded big-endian, so `a.b.c.d` becomes the integer
//! `a << 24 | b << 16 | c << 8 | d` and a prefix `a.b.c.d/n` becomes the
//! half-open range of the `2^(32 - n)` addresses sharing its first `n` bits.
//!
//! # Examples
//! ```
//! use std::net::Ipv4Addr;
//!
//! use coverit::ipv4::{parse_addr, prefix_range, IPV4_DOMAIN};
//! use coverit::IntervalSet;
//!
//! let range = prefix_range(Ipv4Addr::new(192, 168, 0, 0), 16).unwrap();
//! let set = IntervalSet::build(IPV4_DOMAIN, [range]).unwrap();
//!
//! assert_eq!(set.contains(parse_addr("192.168.5.5").unwrap()), Ok(true));
//! assert_eq!(set.contains(parse_addr("192.169.0.1").unwrap()), Ok(false));
//! ```
//!
//! [`IntervalSet`]: crate::IntervalSet

use core::ops::Range;
use std::net::{AddrParseError, Ipv4Addr};

use crate::IntervalError;

/// The domain spanning every IPv4 address.
pub const IPV4_DOMAIN: Range<u64> = 0..1 << 32;

/// Encodes `addr` as a point of [`IPV4_DOMAIN`].
pub fn encode_addr(addr: Ipv4Addr) -> u64 {
	u64::from(u32::from(addr))
}

/// Parses a dotted-quad address such as `"10.0.0.1"` and encodes it with
/// [`encode_addr()`].
///
/// # Errors
///
/// Returns the parse error if `input` is not a dotted-quad IPv4 address.
pub fn parse_addr(input: &str) -> Result<u64, AddrParseError> {
	input.trim().parse().map(encode_addr)
}

/// Returns the range of addresses in the prefix `addr/prefix_len`.
///
/// Host bits set in `addr` are ignored, so `10.1.2.3/8` is the same range
/// as `10.0.0.0/8`.
///
/// # Errors
///
/// Returns [`IntervalError::InvalidRange`] if `prefix_len` is greater than
/// `32`.
///
/// # Examples
/// ```
/// use std::net::Ipv4Addr;
///
/// use coverit::ipv4::prefix_range;
///
/// assert_eq!(
/// 	prefix_range(Ipv4Addr::new(10, 1, 2, 3), 8),
/// 	Ok(0x0a00_0000..0x0b00_0000)
/// );
/// assert_eq!(prefix_range(Ipv4Addr::UNSPECIFIED, 0), Ok(0..1 << 32));
/// assert!(prefix_range(Ipv4Addr::LOCALHOST, 33).is_err());
/// ```
pub fn prefix_range(
	addr: Ipv4Addr,
	prefix_len: u8,
) -> Result<Range<u64>, IntervalError> {
	if prefix_len > 32 {
		let low = encode_addr(addr);
		return Err(IntervalError::InvalidRange {
			low,
			high: low,
			domain_low: IPV4_DOMAIN.start,
			domain_high: IPV4_DOMAIN.end,
		});
	}

	let size = 1u64 << (32 - prefix_len);
	let low = encode_addr(addr) & !(size - 1);

	Ok(low..low + size)
}
