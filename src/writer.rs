//! Render carrier modulation as audio samples.

use std::f32::consts::TAU;

use signals::{CarrierPower, SecondModulation};

/// Carrier frequency in Hz. The 60 kHz WWVB carrier is its third harmonic, which audio hardware
/// cannot sample directly.
pub const CARRIER_HZ: u64 = 20000;

/// Sample amplitude at reduced carrier power.
pub const LOW_POWER: f32 = 0.14;
/// Sample amplitude at full carrier power.
pub const HIGH_POWER: f32 = 1.0;

/// One second queued for transmission.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Second {
	/// Second of the minute, for logging.
	pub second: u32,
	/// The carrier modulation to transmit.
	pub modulation: SecondModulation,
	/// Samples of this second already elapsed. Non-zero when transmission starts partway through a
	/// second, and advanced by the writer as the second is rendered.
	pub offset: u64
}

/// Make a writer that renders seconds sampled at `sample_rate` Hz.
///
/// Returns a closure that takes two inputs:
/// 1. The second to transmit. Its `offset` is advanced as samples are written.
/// 2. The buffer to write the transmitted values into (ranging [-1, 1]).
///
/// The closure returns a tuple with two values:
/// 1. The number of samples written. This is the length of the buffer unless the second ends
///    first.
/// 2. A boolean indicating whether the second has been transmitted completely.
///
/// The carrier phase runs continuously across seconds, so consecutive calls produce one unbroken
/// sine wave.
pub fn make_writer(sample_rate: u32) -> impl FnMut(&mut Second, &mut [f32]) -> (usize, bool) + Send {
	let s = sample_rate as u64;
	let mut i: u64 = 0;
	move |second: &mut Second, data: &mut [f32]| -> (usize, bool) {
		let mut written = 0;
		for sample in data.iter_mut() {
			if second.offset >= s {
				break;
			}
			let ms = (second.offset * 1000 / s) as u32;
			let power = match second.modulation.power_at(ms) {
				CarrierPower::Low => LOW_POWER,
				CarrierPower::High => HIGH_POWER
			};
			let phase = (i * CARRIER_HZ % s) as f32 / s as f32;
			*sample = power * (TAU * phase).sin();

			i = (i + 1) % s;
			second.offset += 1;
			written += 1;
		}
		(written, second.offset >= s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn peak(buffer: &[f32]) -> f32 {
		buffer.iter().fold(0.0, |m, v| v.abs().max(m))
	}

	fn render(modulation: SecondModulation, offset: u64) -> Vec<f32> {
		let mut writer = make_writer(48000);
		let mut second = Second { second: 1, modulation, offset };
		let mut out = Vec::new();
		let mut buf = vec![0.0; 1024];
		loop {
			let (n, done) = writer(&mut second, &mut buf);
			out.extend_from_slice(&buf[..n]);
			if done { break; }
			assert_eq!(n, buf.len());
		}
		out
	}

	#[test]
	fn envelope_test() {
		for (low_ms, boundary) in [(200, 9600), (500, 24000), (800, 38400)] {
			let out = render(SecondModulation::low_then_high(low_ms), 0);
			assert_eq!(out.len(), 48000);
			assert!(peak(&out[..boundary]) <= LOW_POWER + 1e-6, "{} ms", low_ms);
			assert!(peak(&out[..boundary]) > LOW_POWER * 0.99, "{} ms", low_ms);
			assert!(peak(&out[boundary..]) > 0.99, "{} ms", low_ms);
		}
	}

	#[test]
	fn offset_test() {
		// Start halfway through a zero bit
		let out = render(SecondModulation::low_then_high(200), 24000);
		assert_eq!(out.len(), 24000);
		assert!(peak(&out) > 0.99);

		// A second that has already elapsed writes nothing
		let mut writer = make_writer(48000);
		let mut second = Second { second: 0, modulation: SecondModulation::low_then_high(800), offset: 48000 };
		let mut buf = [0.0; 16];
		assert_eq!(writer(&mut second, &mut buf[..]), (0, true));
	}

	#[test]
	fn continuous_phase_test() {
		let mut writer = make_writer(48000);
		let mut buf = vec![0.0; 48003];
		let mut first = Second { second: 1, modulation: SecondModulation::low_then_high(0), offset: 47997 };
		assert_eq!(writer(&mut first, &mut buf), (3, true));
		let mut next = Second { second: 2, modulation: SecondModulation::low_then_high(0), offset: 0 };
		let (n, done) = writer(&mut next, &mut buf[3..]);
		assert_eq!((n, done), (48000, true));
		// 20 kHz at 48 kHz repeats every 12 samples
		for k in 0..24 {
			assert!((buf[k] - buf[k + 12]).abs() < 1e-5, "sample {}", k);
		}
	}
}
