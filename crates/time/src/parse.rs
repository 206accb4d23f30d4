//! Parse date time strings like `YYYY-MM-DD HH:mm:ss.sss`.
//!
//! This module provides a single function, [`parse_timestamp`], which parses a date time string
//! into a Unix timestamp, represented by [`TimeSpec`].
//!
//! # Examples
//! ```
//! # use time::{parse::parse_timestamp, time::TimeSpec};
//! assert_eq!(
//! 	parse_timestamp(b"2025-02-18T12:30:45Z"),
//! 	Ok(TimeSpec { sec: 1739881845, nsec: 0 })
//! );
//! assert_eq!(
//! 	parse_timestamp(b"2025-02-18 12:30:45 -01:00"),
//! 	Ok(TimeSpec { sec: 1739885445, nsec: 0 })
//! );
//! assert_eq!(
//! 	parse_timestamp(b"@1739881845"),
//! 	Ok(TimeSpec { sec: 1739881845, nsec: 0 })
//! );
//! ```

use crate::time::{days_per_month, timestamp_from_ymd, TimeSpec, SECONDS_PER_HOUR, SECONDS_PER_MINUTE};

/// Error type for parsing date time strings.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum ParseError {
	#[error("Year missing or malformed")]
	MissingYear,
	#[error("Month missing or malformed")]
	MissingMonth,
	#[error("Month out of range")]
	MonthOutOfRange,
	#[error("Day missing or malformed")]
	MissingDay,
	/// The day was outside of [1, 28|29|30|31] for the given month and year.
	#[error("Day out of range")]
	DayOutOfRange,
	#[error("Hours missing or malformed")]
	MissingHours,
	#[error("Hours out of range")]
	HoursOutOfRange,
	#[error("Minutes missing or malformed")]
	MissingMinutes,
	#[error("Minutes out of range")]
	MinutesOutOfRange,
	#[error("Seconds missing or malformed")]
	MissingSeconds,
	#[error("Seconds out of range")]
	SecondsOutOfRange,
	/// A `.` was not followed by 1-9 digits.
	#[error("Fractional seconds missing or malformed")]
	MissingFraction,
	#[error("Timezone offset malformed")]
	InvalidOffset,
	/// The input started with `@` but the rest was not an integer.
	#[error("Unix timestamp malformed")]
	InvalidTimestamp,
	#[error("Unexpected input at end of date time string")]
	UnexpectedInput
}

/// Byte cursor over the input.
struct Cursor<'a>(&'a [u8]);

impl Cursor<'_> {
	/// Read exactly `n` decimal digits (`n < 5`).
	fn num(&mut self, n: usize, e: ParseError) -> Result<u16, ParseError> {
		if self.0.len() < n {
			return Err(e);
		}
		let (digits, rest) = self.0.split_at(n);
		let mut r: u16 = 0;
		for &b in digits {
			match b {
				b'0'..=b'9' => r = r * 10 + (b - b'0') as u16,
				_ => return Err(e)
			}
		}
		self.0 = rest;
		Ok(r)
	}

	/// Consume one byte if it matches `f`.
	fn eat(&mut self, f: impl Fn(u8) -> bool) -> Option<u8> {
		match self.0.split_first() {
			Some((&b, rest)) if f(b) => {
				self.0 = rest;
				Some(b)
			},
			_ => None
		}
	}

	fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Parse a date time string into a Unix timestamp.
///
/// Accepted formats:
/// - `@SECONDS`: a raw Unix timestamp, possibly negative.
/// - `YYYY-MM-DD`
/// - `YYYY-MM-DDTHH:mm`, `YYYY-MM-DDTHH:mm:ss`, or `YYYY-MM-DDTHH:mm:ss.sss` (1-9 fractional
///   digits). The `T` may be a space.
/// - Any of the above with times, followed by `Z`, `+HH:mm`, or `-HH:mm`, optionally preceded by a
///   space. Without an offset the time is taken as UTC.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is malformed or out of range, including when a valid
/// timestamp is followed by extra bytes.
///
/// # Examples
/// ```
/// # use time::{parse::parse_timestamp, time::TimeSpec};
/// assert_eq!(
/// 	parse_timestamp(b"2025-02-18"),
/// 	Ok(TimeSpec { sec: 1739836800, nsec: 0 })
/// );
/// assert_eq!(
/// 	parse_timestamp(b"2025-02-18T12:30:45.123"),
/// 	Ok(TimeSpec { sec: 1739881845, nsec: 123000000 })
/// );
/// ```
pub fn parse_timestamp(bytes: &[u8]) -> Result<TimeSpec, ParseError> {
	if let Some(rest) = bytes.strip_prefix(b"@") {
		return core::str::from_utf8(rest)
			.ok()
			.and_then(|s| s.parse::<i64>().ok())
			.map(|sec| TimeSpec { sec, nsec: 0 })
			.ok_or(ParseError::InvalidTimestamp);
	}

	let mut c = Cursor(bytes);
	let year = c.num(4, ParseError::MissingYear)? as i64;
	c.eat(|b| b == b'-').ok_or(ParseError::MissingMonth)?;
	let mon = c.num(2, ParseError::MissingMonth)?;
	if !(1..=12).contains(&mon) {
		return Err(ParseError::MonthOutOfRange);
	}
	c.eat(|b| b == b'-').ok_or(ParseError::MissingDay)?;
	let day = c.num(2, ParseError::MissingDay)?;
	if day == 0 || day > days_per_month(year, mon as u8) as u16 {
		return Err(ParseError::DayOutOfRange);
	}

	let mut time = TimeSpec { sec: timestamp_from_ymd(year, mon as u8, day as u8), nsec: 0 };
	if c.is_empty() {
		return Ok(time);
	}

	c.eat(|b| b == b'T' || b == b' ').ok_or(ParseError::UnexpectedInput)?;
	let hours = c.num(2, ParseError::MissingHours)?;
	if hours > 23 {
		return Err(ParseError::HoursOutOfRange);
	}
	c.eat(|b| b == b':').ok_or(ParseError::MissingMinutes)?;
	let minutes = c.num(2, ParseError::MissingMinutes)?;
	if minutes > 59 {
		return Err(ParseError::MinutesOutOfRange);
	}
	time.sec += hours as i64 * SECONDS_PER_HOUR + minutes as i64 * SECONDS_PER_MINUTE;

	if c.eat(|b| b == b':').is_some() {
		let seconds = c.num(2, ParseError::MissingSeconds)?;
		if seconds > 59 {
			return Err(ParseError::SecondsOutOfRange);
		}
		time.sec += seconds as i64;

		if c.eat(|b| b == b'.').is_some() {
			let mut digits = 0;
			let mut fraction: i64 = 0;
			while let Some(b) = c.eat(|b| b.is_ascii_digit()) {
				if digits == 9 {
					return Err(ParseError::MissingFraction);
				}
				fraction = fraction * 10 + (b - b'0') as i64;
				digits += 1;
			}
			if digits == 0 {
				return Err(ParseError::MissingFraction);
			}
			time.nsec = fraction * 10_i64.pow(9 - digits);
		}
	}

	c.eat(|b| b == b' ');
	if let Some(sign @ (b'+' | b'-')) = c.eat(|b| matches!(b, b'Z' | b'+' | b'-')) {
		let h = c.num(2, ParseError::InvalidOffset)?;
		c.eat(|b| b == b':');
		let m = c.num(2, ParseError::InvalidOffset)?;
		if h > 23 || m > 59 {
			return Err(ParseError::InvalidOffset);
		}
		let offset = h as i64 * SECONDS_PER_HOUR + m as i64 * SECONDS_PER_MINUTE;
		// Local time = UTC + offset
		time.sec -= if sign == b'+' { offset } else { -offset };
	}

	if c.is_empty() {
		Ok(time)
	} else {
		Err(ParseError::UnexpectedInput)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parse_valid_test() {
		assert_eq!(parse_timestamp(b"2025-02-18"), Ok(TimeSpec { sec: 1739836800, nsec: 0 }));
		assert_eq!(parse_timestamp(b"2025-02-18 12:30"), Ok(TimeSpec { sec: 1739881800, nsec: 0 }));
		assert_eq!(parse_timestamp(b"2025-02-18T12:30:45Z"), Ok(TimeSpec { sec: 1739881845, nsec: 0 }));
		assert_eq!(parse_timestamp(b"2025-02-18T12:30:45+01:00"), Ok(TimeSpec { sec: 1739878245, nsec: 0 }));
		assert_eq!(parse_timestamp(b"2025-02-18 12:30:45 -01:00"), Ok(TimeSpec { sec: 1739885445, nsec: 0 }));
		assert_eq!(
			parse_timestamp(b"2024-04-12 10:27:00.519 -07:00"),
			Ok(TimeSpec { sec: 1712942820, nsec: 519000000 })
		);
		assert_eq!(
			parse_timestamp(b"2025-02-18T12:30:45.123456789"),
			Ok(TimeSpec { sec: 1739881845, nsec: 123456789 })
		);
		assert_eq!(parse_timestamp(b"2024-02-29T00:00"), Ok(TimeSpec { sec: 1709164800, nsec: 0 }));
		assert_eq!(parse_timestamp(b"@1710030600"), Ok(TimeSpec { sec: 1710030600, nsec: 0 }));
		assert_eq!(parse_timestamp(b"@-5"), Ok(TimeSpec { sec: -5, nsec: 0 }));
	}

	#[test]
	fn parse_invalid_test() {
		assert_eq!(parse_timestamp(b"20"), Err(ParseError::MissingYear));
		assert_eq!(parse_timestamp(b"2025"), Err(ParseError::MissingMonth));
		assert_eq!(parse_timestamp(b"2025-13-01"), Err(ParseError::MonthOutOfRange));
		assert_eq!(parse_timestamp(b"2025-02"), Err(ParseError::MissingDay));
		assert_eq!(parse_timestamp(b"2023-02-29"), Err(ParseError::DayOutOfRange));
		assert_eq!(parse_timestamp(b"2025-02-18T24:00"), Err(ParseError::HoursOutOfRange));
		assert_eq!(parse_timestamp(b"2025-02-18T12"), Err(ParseError::MissingMinutes));
		assert_eq!(parse_timestamp(b"2025-02-18T12:60"), Err(ParseError::MinutesOutOfRange));
		assert_eq!(parse_timestamp(b"2025-02-18T12:30:60"), Err(ParseError::SecondsOutOfRange));
		assert_eq!(parse_timestamp(b"2025-02-18T12:30:45."), Err(ParseError::MissingFraction));
		assert_eq!(parse_timestamp(b"2025-02-18T12:30:45.1234567890"), Err(ParseError::MissingFraction));
		assert_eq!(parse_timestamp(b"2025-02-18T12:30+1"), Err(ParseError::InvalidOffset));
		assert_eq!(parse_timestamp(b"2025-02-18T12:30:45x"), Err(ParseError::UnexpectedInput));
		assert_eq!(parse_timestamp(b"2025-02-18x"), Err(ParseError::UnexpectedInput));
		assert_eq!(parse_timestamp(b"@abc"), Err(ParseError::InvalidTimestamp));
	}
}
