//! Support for transmitting the WWVB time signal.
//!
//! See [WWVB documentation](https://en.wikipedia.org/wiki/WWVB) for details. This module supports
//! WWVB's amplitude modulated time code. Each UTC minute is one 60-bit frame; each second carries
//! one symbol, sent as a drop in carrier power at the top of the second:
//! - **Marker**: low for 800 ms. Sent at second 0 and at seconds 9, 19, 29, 39, 49 and 59.
//! - **One**: low for 500 ms.
//! - **Zero**: low for 200 ms.
//!
//! The frame holds the minute, hour, day of year and two-digit year in BCD, plus the leap year
//! indicator and two daylight savings time bits. Unsupported features, transmitted as zero:
//! - **DUT1**. The UT1 correction sign and magnitude (seconds 36-43) are always zero.
//! - **Leap second warning** (second 56).
//! - **Phase modulation**. The carrier phase is never shifted.
//!
//! # Examples
//!
//! ```
//! # use signals::{wwvb::WWVB, dst::DstStatus, TimeSignalSource, SecondModulation};
//! let mut wwvb = WWVB::new(DstStatus { today: false, tomorrow: true });
//!
//! // Sun, Mar 10 2024 00:30:00 UTC
//! wwvb.prepare_minute(1710030600);
//! assert_eq!(
//! 	wwvb.frame().to_string(),
//! 	"M01100000M000000000M000000111M000000000M000000010M010001010M"
//! );
//!
//! // Second 2 is the middle bit of the minutes tens digit, set for minute 30
//! assert_eq!(wwvb.get_modulation_for_second(2), SecondModulation::low_then_high(500));
//! ```

use core::fmt;
use time::Tm;
use crate::{SecondModulation, TimeSignalSource};
use crate::dst::{DstSource, DstStatus};
#[cfg(feature = "host")]
use crate::dst::HostLocalTime;

/// Frame bit holding second 0.
const FRAME_TOP: u32 = 59;

/// Last second of the minutes field.
const MINUTE_END: u32 = 8;
const MINUTE_WIDTH: u32 = 8;
/// Last second of the hours field.
const HOUR_END: u32 = 18;
const HOUR_WIDTH: u32 = 7;
/// Last second of the day of year field.
const YDAY_END: u32 = 33;
const YDAY_WIDTH: u32 = 12;
/// Last second of the year of century field.
const YEAR_END: u32 = 53;
const YEAR_WIDTH: u32 = 9;
const LEAP_YEAR_SECOND: u32 = 55;
const DST_TOMORROW_SECOND: u32 = 57;
const DST_TODAY_SECOND: u32 = 58;

/// Carrier reduced for 800 ms.
pub const MARKER: SecondModulation = SecondModulation::low_then_high(800);
/// Carrier reduced for 500 ms.
pub const ONE: SecondModulation = SecondModulation::low_then_high(500);
/// Carrier reduced for 200 ms.
pub const ZERO: SecondModulation = SecondModulation::low_then_high(200);

/// Encode `n` as BCD with a zero spacer bit between digits.
///
/// The ones digit occupies bits 3:0, the tens digit bits 8:5 and the hundreds digit bits 13:10.
/// Bits 4 and 9 are always zero. Digits above the hundreds are dropped.
///
/// # Examples
///
/// ```
/// # use signals::wwvb::to_padded_bcd;
/// assert_eq!(to_padded_bcd(30), 0b011_0_0000);
/// assert_eq!(to_padded_bcd(366), 0b11_0_0110_0_0110);
/// ```
#[inline(always)]
pub const fn to_padded_bcd(n: u16) -> u16 {
	(n / 100 % 10) << 10 | (n / 10 % 10) << 5 | n % 10
}

/// Decode a value produced by [`to_padded_bcd`]. Spacer bits are ignored.
#[inline(always)]
pub const fn from_padded_bcd(bcd: u16) -> u16 {
	(bcd >> 10 & 0xf) * 100 + (bcd >> 5 & 0xf) * 10 + (bcd & 0xf)
}

/// Shift `value` so its lowest bit lands on second `end`.
#[inline(always)]
const fn place(value: u64, end: u32) -> u64 {
	value << (FRAME_TOP - end)
}

/// Read the `width` bit field ending at second `end`.
#[inline(always)]
const fn field(bits: u64, end: u32, width: u32) -> u16 {
	(bits >> (FRAME_TOP - end) & ((1 << width) - 1)) as u16
}

/// Check whether `second` is a frame marker. Seconds past the end of the minute are markers too.
#[inline(always)]
pub const fn is_marker(second: u32) -> bool {
	second == 0 || second % 10 == 9 || second > FRAME_TOP
}

/// One minute of WWVB amplitude modulated time code.
///
/// The frame is 60 bits wide, stored in the low bits of a `u64` with second 0 at bit 59 and
/// second 59 at bit 0. Marker seconds are implied by position and always hold zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeFrame(u64);

impl TimeFrame {
	/// Encode the minute containing `time`, a Unix timestamp in seconds (UTC).
	///
	/// The seconds within the minute are ignored. DST bits come from `dst`, evaluated for the UTC
	/// calendar date of `time`.
	pub fn encode<D: DstSource + ?Sized>(time: i64, dst: &D) -> TimeFrame {
		let utc = Tm::new(time);
		let status = dst.dst_status(&utc);

		let mut bits = place(to_padded_bcd(utc.min as u16) as u64, MINUTE_END);
		bits |= place(to_padded_bcd(utc.hour as u16) as u64, HOUR_END);
		bits |= place(to_padded_bcd(utc.yday) as u64, YDAY_END);
		bits |= place(to_padded_bcd(utc.year.rem_euclid(100) as u16) as u64, YEAR_END);
		bits |= place(utc.is_leap_year() as u64, LEAP_YEAR_SECOND);
		bits |= place(status.tomorrow as u64, DST_TOMORROW_SECOND);
		bits |= place(status.today as u64, DST_TODAY_SECOND);

		let frame = TimeFrame(bits);
		tracing::debug!(
			time,
			year = utc.year,
			yday = utc.yday,
			hour = utc.hour,
			minute = utc.min,
			dst_today = status.today,
			dst_tomorrow = status.tomorrow,
			"prepared WWVB frame {frame}"
		);
		frame
	}

	/// Wrap raw frame bits. Bits above bit 59 are discarded.
	#[inline(always)]
	pub const fn from_bits(bits: u64) -> TimeFrame {
		TimeFrame(bits & ((1 << (FRAME_TOP + 1)) - 1))
	}

	/// The raw frame bits, second 0 at bit 59.
	#[inline(always)]
	pub const fn bits(&self) -> u64 {
		self.0
	}

	/// The data bit sent during `second`. Seconds past the end of the minute read as zero.
	#[inline(always)]
	pub const fn bit(&self, second: u32) -> bool {
		second <= FRAME_TOP && self.0 >> (FRAME_TOP - second) & 1 == 1
	}

	/// Minute of the hour.
	pub const fn minute(&self) -> u8 {
		from_padded_bcd(field(self.0, MINUTE_END, MINUTE_WIDTH)) as u8
	}

	/// Hour of the day.
	pub const fn hour(&self) -> u8 {
		from_padded_bcd(field(self.0, HOUR_END, HOUR_WIDTH)) as u8
	}

	/// Day of the year, starting from 1 on January 1.
	pub const fn day_of_year(&self) -> u16 {
		from_padded_bcd(field(self.0, YDAY_END, YDAY_WIDTH))
	}

	/// Year of the century.
	pub const fn year(&self) -> u8 {
		from_padded_bcd(field(self.0, YEAR_END, YEAR_WIDTH)) as u8
	}

	pub const fn is_leap_year(&self) -> bool {
		self.bit(LEAP_YEAR_SECOND)
	}

	/// DST was in effect at local midnight of this UTC date.
	pub const fn dst_in_effect(&self) -> bool {
		self.bit(DST_TODAY_SECOND)
	}

	/// DST is in effect 24 hours after local midnight of this UTC date.
	pub const fn dst_announced(&self) -> bool {
		self.bit(DST_TOMORROW_SECOND)
	}

	/// The carrier modulation for `second` of this frame.
	pub const fn modulation(&self, second: u32) -> SecondModulation {
		if is_marker(second) {
			MARKER
		} else if self.bit(second) {
			ONE
		} else {
			ZERO
		}
	}
}

/// Sixty symbols, one per second: `M` for markers, otherwise `1` or `0`.
impl fmt::Display for TimeFrame {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		use fmt::Write;
		for second in 0..=FRAME_TOP {
			f.write_char(match (is_marker(second), self.bit(second)) {
				(true, _) => 'M',
				(false, true) => '1',
				(false, false) => '0'
			})?;
		}
		Ok(())
	}
}

/// WWVB time signal source.
///
/// Holds the frame for the most recently prepared minute. Before the first call to
/// [`prepare_minute`](TimeSignalSource::prepare_minute) the frame is all zeros, which still
/// transmits a well formed sequence of markers and zero bits.
///
/// # Examples
///
/// ```
/// # use signals::{wwvb::{self, WWVB}, TimeSignalSource};
/// # use time::Tm;
/// // DST by UTC month, instead of the host timezone
/// let mut wwvb = WWVB::new(|date: &Tm| (4..=10).contains(&date.mon));
///
/// // Sun, May 26 2024 16:57:00 UTC
/// wwvb.prepare_minute(1716742620);
/// assert_eq!(wwvb.frame().minute(), 57);
/// assert_eq!(wwvb.frame().hour(), 16);
/// assert!(wwvb.frame().dst_in_effect());
/// assert_eq!(wwvb.get_modulation_for_second(0), wwvb::MARKER);
/// ```
#[derive(Clone, Debug)]
pub struct WWVB<D> {
	frame: TimeFrame,
	dst: D
}

impl<D: DstSource> WWVB<D> {
	/// Create a new WWVB source that reads daylight savings time from `dst`.
	pub fn new(dst: D) -> WWVB<D> {
		WWVB { frame: TimeFrame::default(), dst }
	}

	/// The currently prepared frame.
	#[inline(always)]
	pub fn frame(&self) -> TimeFrame {
		self.frame
	}

	/// The DST source used by [`prepare_minute`](TimeSignalSource::prepare_minute).
	pub fn dst_source(&self) -> &D {
		&self.dst
	}
}

/// Create a WWVB source using the host's local timezone for daylight savings time.
///
/// See [`HostLocalTime`] for how the host timezone stands in for station time.
#[cfg(feature = "host")]
#[cfg_attr(docsrs, doc(cfg(feature = "host")))]
pub fn new() -> WWVB<HostLocalTime> {
	WWVB::new(HostLocalTime)
}

impl<D: DstSource> TimeSignalSource for WWVB<D> {
	fn prepare_minute(&mut self, time: i64) {
		self.frame = TimeFrame::encode(time, &self.dst);
	}

	fn get_modulation_for_second(&self, second: u32) -> SecondModulation {
		self.frame.modulation(second)
	}
}

/// A fixed status, for sources built without a date dependent lookup.
impl From<DstStatus> for WWVB<DstStatus> {
	fn from(status: DstStatus) -> Self {
		WWVB::new(status)
	}
}
