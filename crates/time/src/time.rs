//! Utilities for dealing with time (UTC and Unix timestamps), unaware of timezone.
//!
//! This module provides the current Unix time with nanosecond granularity (feature `now`) and
//! calendar utilities to convert to/from Unix time. The calendar functions do not rely on libc's
//! `gmtime` family, so they are thread safe and total: every `i64` timestamp, including those
//! before the Unix epoch, maps to a proleptic Gregorian date.
//!
//! # Examples
//!
//! ```
//! # use time::time::Tm;
//! // Sun, Mar 10 2024 00:30:00 UTC
//! let date = Tm::new(1710030600);
//! assert_eq!((date.year, date.mon, date.day), (2024, 3, 10));
//! assert_eq!((date.hour, date.min, date.sec), (0, 30, 0));
//! assert_eq!(date.yday, 70);
//! ```

#[cfg(feature = "now")]
use core::mem::MaybeUninit;
#[cfg(feature = "now")]
use libc::{timespec, clock_gettime, CLOCK_REALTIME};

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: i64 = 60;
/// Seconds per hour.
pub const SECONDS_PER_HOUR: i64 = SECONDS_PER_MINUTE * 60;
/// Seconds per day.
pub const SECONDS_PER_DAY: i64 = SECONDS_PER_HOUR * 24;

/// Days per non-leap year.
const DAYS_PER_YEAR: i64 = 365;
/// Days per 400-year era of the Gregorian calendar.
const DAYS_PER_ERA: i64 = 146097;
/// Days from March 1, 0000 to January 1, 1970.
const DAYS_FROM_MARCH_0000_TO_EPOCH: i64 = 719468;
/// Days from March 1 to December 31, inclusive. January 1 is day 306 of a March-based year.
const DAYS_FROM_MAR_TO_DEC: i64 = 306;
/// Days from January 1 to February 28, inclusive.
const DAYS_FROM_JAN_TO_FEB: i64 = 59;

/// Unix time with nanosecond granularity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSpec {
	/// Seconds since the Unix epoch
	pub sec: i64,
	/// Nanoseconds since the beginning of `sec`, ranging [0-999999999]
	pub nsec: i64
}

impl TimeSpec {
	/// The Unix timestamp of the start of the minute containing `self`.
	///
	/// # Examples
	///
	/// ```
	/// # use time::time::TimeSpec;
	/// let t = TimeSpec { sec: 1716742645, nsec: 123456789 };
	/// assert_eq!(t.minute_start(), 1716742620);
	/// assert_eq!(TimeSpec { sec: -1, nsec: 0 }.minute_start(), -60);
	/// ```
	#[inline(always)]
	pub fn minute_start(&self) -> i64 {
		self.sec - self.sec.rem_euclid(SECONDS_PER_MINUTE)
	}

	/// The second within the current minute, ranged [0, 59].
	#[inline(always)]
	pub fn second_of_minute(&self) -> u32 {
		self.sec.rem_euclid(SECONDS_PER_MINUTE) as u32
	}
}

#[cfg_attr(docsrs, doc(cfg(feature = "now")))]
#[cfg(feature = "now")]
impl From<timespec> for TimeSpec {
	fn from(value: timespec) -> Self {
		TimeSpec {
			sec: value.tv_sec as i64,
			nsec: value.tv_nsec as i64
		}
	}
}

/// Get the current time as a Unix timestamp with nanosecond granularity.
///
/// Returns `None` if `libc::clock_gettime` fails.
///
/// # Examples
///
/// ```
/// # use time::time::now;
/// let c = now().expect("Failed to get current time");
/// assert!(c.sec > 0);
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "now")))]
#[cfg(feature = "now")]
pub fn now() -> Option<TimeSpec> {
	let mut time = MaybeUninit::<timespec>::uninit();
	// Safety: clock_gettime only writes to `time`, and a zero return means it was initialized.
	unsafe {
		match clock_gettime(CLOCK_REALTIME, time.as_mut_ptr()) {
			0 => Some(time.assume_init().into()),
			_ => None
		}
	}
}

/// Check whether a given `year` is a leap year in the proleptic Gregorian calendar.
///
/// A year is a leap year if it is divisible by 4, unless it is also divisible by 100 and not by
/// 400. `year` is the absolute calendar year (e.g. 2024), and may be zero or negative.
///
/// # Examples
///
/// ```
/// # use time::time::is_leap_year;
/// assert!(is_leap_year(2000));
/// assert!(is_leap_year(2024));
/// assert!(!is_leap_year(1900));
/// assert!(!is_leap_year(2023));
/// ```
#[inline(always)]
pub fn is_leap_year(year: i64) -> bool {
	year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// The number of days in month `m` (1-indexed) of year `y`.
///
/// Returns 0 for months outside [1, 12].
pub fn days_per_month(y: i64, m: u8) -> u8 {
	match m {
		2 => if is_leap_year(y) { 29 } else { 28 },
		4 | 6 | 9 | 11 => 30,
		1..=12 => 31,
		_ => 0
	}
}

/// Gregorian calendar date and time of day in UTC.
///
/// Similar to `libc::tm`, with these differences:
/// - `mon` is [1, 12] rather than [0, 11].
/// - `yday` is [1, 366] rather than [0, 365].
/// - `year` is the absolute calendar year rather than years since 1900.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tm {
	/// Seconds, ranged [0, 59]
	pub sec: u8,
	/// Minutes, ranged [0, 59]
	pub min: u8,
	/// Hours, ranged [0, 23]
	pub hour: u8,
	/// Day of the month, ranged [1, 31]
	pub day: u8,
	/// Month of the year, ranged [1, 12]
	pub mon: u8,
	/// Absolute calendar year
	pub year: i64,
	/// Day of the week, ranged [0, 6] => [Sunday, Saturday]
	pub wday: u8,
	/// Day of the year, ranged [1, 366]
	pub yday: u16
}

impl Tm {
	/// Convert a Unix timestamp into a UTC calendar date.
	///
	/// Every input is valid. Timestamps before the Unix epoch produce dates before 1970.
	pub fn new(unixtimestamp: i64) -> Tm {
		// Rotate the calendar so the year runs March to February, which puts the leap day last.
		// The Gregorian calendar then repeats exactly every 400 years, so the date is found by
		// locating the era, the year within the era, and the day within that year.
		// http://howardhinnant.github.io/date_algorithms.html#civil_from_days
		let days = unixtimestamp.div_euclid(SECONDS_PER_DAY);
		let rem = unixtimestamp.rem_euclid(SECONDS_PER_DAY);

		let z = days + DAYS_FROM_MARCH_0000_TO_EPOCH;
		let era = z.div_euclid(DAYS_PER_ERA);
		let doe = z.rem_euclid(DAYS_PER_ERA);
		let yoe = (doe - doe / 1460 + doe / 36524 - doe / (DAYS_PER_ERA - 1)) / DAYS_PER_YEAR;
		let doy = doe - (DAYS_PER_YEAR * yoe + yoe / 4 - yoe / 100);
		let mp = (5 * doy + 2) / 153;
		let day = doy - (153 * mp + 2) / 5 + 1;
		let (mon, year) = if mp < 10 {
			(mp + 3, yoe + era * 400)
		} else {
			(mp - 9, yoe + era * 400 + 1)
		};

		let yday = if mp < 10 {
			doy + DAYS_FROM_JAN_TO_FEB + is_leap_year(year) as i64
		} else {
			doy - DAYS_FROM_MAR_TO_DEC
		};

		Tm {
			sec: (rem % SECONDS_PER_MINUTE) as u8,
			min: (rem % SECONDS_PER_HOUR / SECONDS_PER_MINUTE) as u8,
			hour: (rem / SECONDS_PER_HOUR) as u8,
			day: day as u8,
			mon: mon as u8,
			year,
			wday: (days + 4).rem_euclid(7) as u8, // Jan 1, 1970 was a Thursday
			yday: (yday + 1) as u16
		}
	}

	/// Check whether `self` falls in a leap year.
	#[inline(always)]
	pub fn is_leap_year(&self) -> bool {
		is_leap_year(self.year)
	}

	/// The Unix timestamp of 00:00:00 UTC on this date.
	#[inline(always)]
	pub fn midnight(&self) -> i64 {
		timestamp_from_ymd(self.year, self.mon, self.day)
	}

	/// The following calendar date, at 00:00:00 UTC.
	///
	/// # Examples
	///
	/// ```
	/// # use time::time::Tm;
	/// // Dec 31, 2024 18:00:00 UTC
	/// let next = Tm::new(1735668000).next_day();
	/// assert_eq!((next.year, next.mon, next.day, next.hour), (2025, 1, 1, 0));
	/// ```
	#[inline(always)]
	pub fn next_day(&self) -> Tm {
		Tm::new(self.midnight().saturating_add(SECONDS_PER_DAY))
	}
}

/// Get the Unix timestamp for 00:00:00 UTC on a given year, month, and day.
///
/// `y` is the absolute calendar year, `m` the 1-indexed month, and `d` the day of the month. Days
/// past the end of the month roll into the next month. Results beyond the range of `i64` saturate.
///
/// # Examples
///
/// ```
/// # use time::time::timestamp_from_ymd;
/// assert_eq!(timestamp_from_ymd(2024, 2, 28), 1709078400);
/// assert_eq!(timestamp_from_ymd(2024, 2, 29), 1709164800);
/// assert_eq!(timestamp_from_ymd(2024, 3, 1), 1709251200);
/// ```
pub fn timestamp_from_ymd(y: i64, m: u8, d: u8) -> i64 {
	// http://howardhinnant.github.io/date_algorithms.html#days_from_civil
	let y = if m <= 2 { y - 1 } else { y };
	let era = y.div_euclid(400);
	let yoe = y.rem_euclid(400);
	let mp = (m as i64 + 9) % 12;
	let doy = (153 * mp + 2) / 5 + d as i64 - 1;
	let doe = yoe * DAYS_PER_YEAR + yoe / 4 - yoe / 100 + doy;
	(era * DAYS_PER_ERA + doe - DAYS_FROM_MARCH_0000_TO_EPOCH).saturating_mul(SECONDS_PER_DAY)
}
