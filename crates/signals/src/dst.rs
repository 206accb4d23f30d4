//! Daylight savings time lookup for time signals.
//!
//! Time signals transmit UTC, but WWVB also announces local daylight savings time. The only
//! local timezone this crate knows about is the host's, so [`HostLocalTime`] uses it as a stand-in
//! for station time. That is a simplification: WWVB's DST bits are defined by US civil time, not
//! by whatever zone the transmitting host is configured for. Set `TZ` (for example
//! `EST5EDT,M3.2.0,M11.1.0`) to transmit US rules from a host in another zone.
//!
//! The lookup sits behind [`DstSource`] so the frame encoder can be tested without host state.
//! Closures over [`Tm`] and fixed [`DstStatus`] values are both sources.
//!
//! # Examples
//!
//! ```
//! # use signals::dst::{DstSource, DstStatus};
//! # use time::Tm;
//! // DST from the start of April to the end of October, decided on the UTC date alone
//! let summer = |date: &Tm| (4..=10).contains(&date.mon);
//!
//! // Mar 31, 2024 12:00 UTC
//! assert_eq!(summer.dst_status(&Tm::new(1711886400)), DstStatus { today: false, tomorrow: true });
//! ```

use time::Tm;
#[cfg(feature = "host")]
use time::local::LocalTm;

/// Daylight savings time status around a UTC date.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DstStatus {
	/// DST is in effect at local midnight of the UTC date.
	pub today: bool,
	/// DST is in effect 24 hours after that local midnight.
	pub tomorrow: bool
}

/// Resolve daylight savings time for local midnight of a UTC calendar date.
pub trait DstSource {
	/// DST status at local midnight of the UTC calendar date in `date`, and 24 hours later.
	///
	/// Only the date fields of `date` are meaningful; the time of day is ignored.
	fn dst_status(&self, date: &Tm) -> DstStatus;
}

/// A fixed status, regardless of date.
impl DstSource for DstStatus {
	fn dst_status(&self, _date: &Tm) -> DstStatus {
		*self
	}
}

/// A predicate deciding DST per date. `tomorrow` asks about the following UTC date.
impl<F> DstSource for F
where F: Fn(&Tm) -> bool
{
	fn dst_status(&self, date: &Tm) -> DstStatus {
		DstStatus {
			today: self(date),
			tomorrow: self(&date.next_day())
		}
	}
}

/// DST from the host's local timezone.
///
/// For a UTC date `Y-M-D`, this builds the local breakdown `Y-M-D 00:00:00` flagged as standard
/// time, normalizes it with `mktime` (which moves it forward an hour if DST is actually in
/// effect), converts it to a timestamp, and reads the DST flag back with `localtime_r`. That flag
/// is [`DstStatus::today`]. It then adds 24 hours to the hour field, normalizes again, and reads
/// [`DstStatus::tomorrow`].
///
/// Local times inside a DST gap or overlap are resolved however the host resolves them. If the
/// host cannot represent the date at all, both flags are `false`. If only the following day cannot
/// be normalized (e.g. a calendar day skipped by a date line change), [`DstStatus::tomorrow`]
/// repeats [`DstStatus::today`].
#[cfg(feature = "host")]
#[cfg_attr(docsrs, doc(cfg(feature = "host")))]
#[derive(Clone, Copy, Debug, Default)]
pub struct HostLocalTime;

#[cfg(feature = "host")]
impl DstSource for HostLocalTime {
	fn dst_status(&self, date: &Tm) -> DstStatus {
		let mut local = LocalTm::from_date(date.year, date.mon, date.day);
		// The first pass settles the standard time flag against the real offset
		let _ = local.normalize();
		let Some(midnight) = local.normalize().and_then(LocalTm::from_timestamp) else {
			return DstStatus::default();
		};

		let mut next = midnight;
		next.hour += 24;
		// A day the host skips entirely fails to normalize, leaving today's flag in place
		let _ = next.normalize();

		DstStatus {
			today: midnight.isdst == Some(true),
			tomorrow: next.isdst == Some(true)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fixed_status_test() {
		let status = DstStatus { today: true, tomorrow: false };
		assert_eq!(status.dst_status(&Tm::new(0)), status);
		assert_eq!(status.dst_status(&Tm::new(1710030600)), status);
	}

	#[test]
	fn predicate_test() {
		// US rules for 2024, by UTC date: DST from Mar 11 through Nov 3
		let us_2024 = |date: &Tm| (71..=308).contains(&date.yday);

		// Mar 10, 2024 00:30 UTC
		assert_eq!(us_2024.dst_status(&Tm::new(1710030600)), DstStatus { today: false, tomorrow: true });
		// Jul 4, 2024 17:30 UTC
		assert_eq!(us_2024.dst_status(&Tm::new(1720114200)), DstStatus { today: true, tomorrow: true });
		// Nov 3, 2024 12:00 UTC
		assert_eq!(us_2024.dst_status(&Tm::new(1730635200)), DstStatus { today: true, tomorrow: false });
		// Dec 31, 2024 23:59 UTC, rolling into the next year
		assert_eq!(us_2024.dst_status(&Tm::new(1735689540)), DstStatus { today: false, tomorrow: false });
	}
}
