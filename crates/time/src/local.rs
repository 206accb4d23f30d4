//! Host local time services.
//!
//! This module is a thin wrapper over the host C library's local time functions: `mktime` to
//! normalize a local calendar breakdown and convert it to a Unix timestamp, `localtime_r` to break
//! a Unix timestamp down into local calendar time, and `tzset` to select the host timezone.
//!
//! The host decides how local times that do not exist (spring-forward gaps) or exist twice
//! (fall-back overlaps) are resolved. This module passes that policy through unchanged. With glibc,
//! a gap time is shifted forward by the DST offset and an overlap time is resolved using the
//! [`LocalTm::isdst`] hint.
//!
//! All functions here read process-wide timezone state. [`set_timezone`] writes it and must not
//! race with any other call in this module.
//!
//! # Examples
//!
//! ```
//! # use time::local::LocalTm;
//! // Local midnight on Mar 10, 2024, normalized by the host
//! let mut midnight = LocalTm::from_date(2024, 3, 10);
//! let timestamp = midnight.normalize();
//! assert!(timestamp.is_some());
//! assert!(midnight.isdst.is_some());
//! ```

use core::ffi::CStr;
use core::mem::MaybeUninit;
use libc::{time_t, tm};

// libc only declares `tzset` for Windows targets.
unsafe extern "C" {
	fn tzset();
}

/// Years to add to `libc::tm::tm_year` to get the absolute calendar year.
const TM_YEAR_BASE: i64 = 1900;

/// Local calendar time, mirroring the host's `struct tm`.
///
/// Unlike [`Tm`](crate::time::Tm), fields are signed and may hold out-of-range values (e.g.
/// `hour: 24`) until [`LocalTm::normalize`] folds them back into range, exactly as `mktime` does.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTm {
	/// Seconds, normally [0, 60]
	pub sec: i32,
	/// Minutes, normally [0, 59]
	pub min: i32,
	/// Hours, normally [0, 23]
	pub hour: i32,
	/// Day of the month, normally [1, 31]
	pub day: i32,
	/// Month of the year, normally [1, 12]
	pub mon: i32,
	/// Absolute calendar year
	pub year: i64,
	/// Daylight savings time flag: `Some(true)` for DST, `Some(false)` for standard time, and
	/// `None` to let the host decide. Before normalization this is a hint; afterwards it is the
	/// host's answer.
	pub isdst: Option<bool>
}

impl LocalTm {
	/// Local midnight on the given date, flagged as standard time.
	///
	/// The standard time flag matches a breakdown produced by `gmtime`, which never reports DST.
	pub fn from_date(year: i64, mon: u8, day: u8) -> LocalTm {
		LocalTm {
			sec: 0,
			min: 0,
			hour: 0,
			day: day as i32,
			mon: mon as i32,
			year,
			isdst: Some(false)
		}
	}

	/// Break a Unix timestamp down into host local time.
	///
	/// Returns `None` if `localtime_r` fails, e.g. because the year does not fit in the host's
	/// `struct tm`.
	pub fn from_timestamp(time: i64) -> Option<LocalTm> {
		let t: time_t = time.try_into().ok()?;
		let mut out = MaybeUninit::<tm>::zeroed();
		// Safety: localtime_r only writes to `out`, and a non-null return means it was filled.
		unsafe {
			if libc::localtime_r(&t, out.as_mut_ptr()).is_null() {
				return None;
			}
			Some(LocalTm::from_host(&out.assume_init()))
		}
	}

	/// Normalize `self` in place using the host's `mktime` and return the matching Unix timestamp.
	///
	/// Out-of-range fields are carried into the next larger field, and [`LocalTm::isdst`] is
	/// replaced with the flag in effect at the resulting instant. Gaps and overlaps are resolved
	/// by the host.
	///
	/// Returns `None`, leaving `self` untouched, if the year does not fit in the host's
	/// `struct tm` or `mktime` reports failure. `mktime` cannot distinguish failure from the
	/// instant one second before the Unix epoch, so that instant is also reported as `None`.
	pub fn normalize(&mut self) -> Option<i64> {
		let mut host = self.to_host()?;
		// Safety: `host` is a fully initialized `struct tm` owned by this frame.
		let t = unsafe { libc::mktime(&mut host) };
		if t == -1 {
			return None;
		}
		*self = LocalTm::from_host(&host);
		Some(t as i64)
	}

	fn to_host(&self) -> Option<tm> {
		// Safety: `struct tm` is plain data, and all-zero is a valid value (null `tm_zone`).
		let mut host: tm = unsafe { MaybeUninit::zeroed().assume_init() };
		host.tm_sec = self.sec;
		host.tm_min = self.min;
		host.tm_hour = self.hour;
		host.tm_mday = self.day;
		host.tm_mon = self.mon - 1;
		host.tm_year = self.year.checked_sub(TM_YEAR_BASE)?.try_into().ok()?;
		host.tm_isdst = match self.isdst {
			Some(true) => 1,
			Some(false) => 0,
			None => -1
		};
		Some(host)
	}

	fn from_host(host: &tm) -> LocalTm {
		LocalTm {
			sec: host.tm_sec,
			min: host.tm_min,
			hour: host.tm_hour,
			day: host.tm_mday,
			mon: host.tm_mon + 1,
			year: host.tm_year as i64 + TM_YEAR_BASE,
			isdst: match host.tm_isdst {
				0 => Some(false),
				x if x > 0 => Some(true),
				_ => None
			}
		}
	}
}

/// Select the host timezone by setting `TZ` and calling `tzset`.
///
/// `tz` is anything the host accepts in `TZ`: a POSIX TZ string such as
/// `EST5EDT,M3.2.0,M11.1.0`, or a zoneinfo name such as `America/New_York`.
///
/// Returns `false` if the environment could not be updated.
///
/// # Safety
///
/// This mutates the process environment. No other thread may read or write the environment, or
/// call into the host's time functions, while this runs.
pub unsafe fn set_timezone(tz: &CStr) -> bool {
	// Safety: upheld by the caller.
	unsafe {
		let ok = libc::setenv(c"TZ".as_ptr(), tz.as_ptr(), 1) == 0;
		tzset();
		ok
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn from_date_test() {
		assert_eq!(LocalTm::from_date(2024, 3, 10), LocalTm {
			sec: 0,
			min: 0,
			hour: 0,
			day: 10,
			mon: 3,
			year: 2024,
			isdst: Some(false)
		});
	}

	#[test]
	fn host_conversion_test() {
		let mut t = LocalTm::from_date(2024, 11, 3);
		t.hour = 25;
		t.isdst = None;
		let host = t.to_host().unwrap();
		assert_eq!(host.tm_year, 124);
		assert_eq!(host.tm_mon, 10);
		assert_eq!(host.tm_hour, 25);
		assert_eq!(host.tm_isdst, -1);
		assert_eq!(LocalTm::from_host(&host), t);

		t.year = i64::MAX;
		assert!(t.to_host().is_none());
	}

	#[test]
	fn set_timezone_test() {
		// Safety: no other test in this module reads the timezone.
		assert!(unsafe { set_timezone(c"UTC0") });
		let t = LocalTm::from_timestamp(1720108800).unwrap();
		assert_eq!((t.year, t.mon, t.day, t.hour, t.isdst), (2024, 7, 4, 16, Some(false)));
	}
}
