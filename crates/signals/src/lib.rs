//! Generate time signals.
//!
//! This crate computes what a [WWVB] transmitter must emit: for a UTC minute it prepares the
//! 60-bit time code, and for each second of that minute it describes the carrier amplitude
//! envelope as a short list of power levels and durations. It never produces audio or RF output
//! itself; see the `wwvbsignal` binary for a transmitter built on top of it.
//!
//! Time signal sources implement [`TimeSignalSource`]. The caller prepares each minute once, then
//! asks for the modulation of each second:
//!
//! ```
//! # use signals::{TimeSignalSource, CarrierPower, wwvb::WWVB, dst::DstStatus};
//! // A WWVB source with a fixed DST status, independent of the host timezone
//! let mut source = WWVB::new(DstStatus { today: false, tomorrow: false });
//!
//! // Sun, Mar 10 2024 00:30:00 UTC
//! source.prepare_minute(1710030600);
//! for second in 0..60 {
//! 	let m = source.get_modulation_for_second(second);
//! 	// Every WWVB second starts with reduced carrier power
//! 	assert_eq!(m.segments()[0].power, CarrierPower::Low);
//! }
//! ```
//!
//! This crate is `no_std`. The default `host` feature enables [`dst::HostLocalTime`], which reads
//! daylight savings time from the host's local timezone through libc.
//!
//! [WWVB]: https://en.wikipedia.org/wiki/WWVB

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod dst;
pub mod wwvb;

/// Carrier power level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CarrierPower {
	/// Reduced carrier power (WWVB drops the carrier by 17 dB).
	Low,
	/// Full carrier power.
	High
}

/// A span of constant carrier power within one second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
	/// The carrier power during this span.
	pub power: CarrierPower,
	/// How long the power is held, in milliseconds. The last segment of a second is held until the
	/// second ends, and conventionally has a duration of 0.
	pub duration_ms: u32
}

/// The carrier amplitude envelope for one second of transmission.
///
/// Segments are transmitted in order, starting at the top of the second. The final segment is
/// held until the end of the second regardless of its duration, so the segments always cover
/// exactly one second.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SecondModulation([Segment; 2]);

impl SecondModulation {
	/// Low power for `low_ms` milliseconds, then high power for the rest of the second.
	pub const fn low_then_high(low_ms: u32) -> SecondModulation {
		SecondModulation([
			Segment { power: CarrierPower::Low, duration_ms: low_ms },
			Segment { power: CarrierPower::High, duration_ms: 0 }
		])
	}

	/// The segments of this second, in transmission order.
	#[inline(always)]
	pub fn segments(&self) -> &[Segment] {
		&self.0
	}

	/// The carrier power `ms` milliseconds into the second.
	///
	/// # Examples
	///
	/// ```
	/// # use signals::{SecondModulation, CarrierPower};
	/// let m = SecondModulation::low_then_high(200);
	/// assert_eq!(m.power_at(0), CarrierPower::Low);
	/// assert_eq!(m.power_at(199), CarrierPower::Low);
	/// assert_eq!(m.power_at(200), CarrierPower::High);
	/// assert_eq!(m.power_at(5000), CarrierPower::High);
	/// ```
	pub fn power_at(&self, ms: u32) -> CarrierPower {
		let (last, leading) = match self.0.split_last() {
			Some(v) => v,
			None => return CarrierPower::High
		};
		let mut end: u32 = 0;
		for segment in leading {
			end = end.saturating_add(segment.duration_ms);
			if ms < end {
				return segment.power;
			}
		}
		last.power
	}
}

/// Trait for time signal sources.
///
/// A source holds exactly one prepared minute. [`prepare_minute`] replaces it wholesale, and
/// [`get_modulation_for_second`] reads it without side effects, so any number of readers may query
/// a prepared minute while the borrow checker keeps writers out.
///
/// [`prepare_minute`]: TimeSignalSource::prepare_minute
/// [`get_modulation_for_second`]: TimeSignalSource::get_modulation_for_second
pub trait TimeSignalSource {
	/// Prepare the minute containing `time`, a Unix timestamp in seconds (UTC).
	///
	/// This must be called at or before each minute boundary, before any calls to
	/// [`get_modulation_for_second`](TimeSignalSource::get_modulation_for_second) for that minute.
	fn prepare_minute(&mut self, time: i64);

	/// The carrier modulation to transmit during `second` of the prepared minute.
	///
	/// `second` is nominally [0, 59]. Every value, including out-of-range ones, has a defined
	/// result.
	fn get_modulation_for_second(&self, second: u32) -> SecondModulation;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn power_at_test() {
		let m = SecondModulation::low_then_high(800);
		assert_eq!(m.segments(), &[
			Segment { power: CarrierPower::Low, duration_ms: 800 },
			Segment { power: CarrierPower::High, duration_ms: 0 }
		]);
		assert_eq!(m.power_at(0), CarrierPower::Low);
		assert_eq!(m.power_at(799), CarrierPower::Low);
		assert_eq!(m.power_at(800), CarrierPower::High);
		assert_eq!(m.power_at(999), CarrierPower::High);

		// A zero-length leading segment is never transmitted
		let m = SecondModulation::low_then_high(0);
		assert_eq!(m.power_at(0), CarrierPower::High);

		// Segments longer than a second still end in the last segment
		let m = SecondModulation::low_then_high(u32::MAX);
		assert_eq!(m.power_at(999), CarrierPower::Low);
	}
}
