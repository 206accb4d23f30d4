//! Transmit the WWVB time signal using simple audio output.
//!
//! This program generates the amplitude modulated [WWVB] time code and plays it through the
//! device's default audio output. This works by taking advantage of stray RF signals created by
//! audio hardware as a side effect of their operation -- the audio output itself is not useful as
//! clocks listening for WWVB use RF rather than audio.
//!
//! [WWVB]: https://en.wikipedia.org/wiki/WWVB
//!
//! # Command Line Arguments
//!
//! General form: `wwvbsignal [options...]`
//!
//! | Short form | Long form       | Argument                 | Default      | Description                      |
//! | ---------- | --------------- | ------------------------ | ------------ | -------------------------------- |
//! | `-n`, `-c` | `--count`       | Integer > 0              | 4            | The number of minutes to output  |
//! | `-z`       | `--timezone`    | Zoneinfo name, TZ string | Host default | The host timezone for DST bits   |
//! | `-t`       | `--time`        | [Date time string]       | Current time | The starting time to transmit    |
//! |            | `--dry-run`     |                          | Off          | Log frames instead of playing    |
//! |            | `--sample-rate` | Integer in Hz            | 48000        | The audio output sample rate     |
//!
//! WWVB announces daylight savings time as observed in the US. The DST bits are computed from the
//! host's local timezone, so hosts outside US Eastern/Central/Mountain/Pacific time should pass
//! `-z`, e.g. `-z "EST5EDT,M3.2.0,M11.1.0"`.
//!
//! Logging goes to stderr and is configured with `RUST_LOG`, defaulting to `info`. Use
//! `RUST_LOG=debug` with `--dry-run` to see the modulation of every second.
//!
//! [date time string]: time::parse::parse_timestamp
//!
//! # Examples
//!
//! Launch with default settings
//! ```sh
//! wwvbsignal
//! ```
//!
//! Transmit for 8 minutes using US Eastern DST rules
//! ```sh
//! wwvbsignal -n 8 -z "EST5EDT,M3.2.0,M11.1.0"
//! ```
//!
//! Show the frames for the night DST starts
//! ```sh
//! wwvbsignal -z America/New_York -t "2024-03-10 00:30Z" --dry-run
//! ```

use std::num::NonZero;
use std::process::ExitCode;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError, TrySendError};
use std::thread;
use std::time::Duration;

use clap::Parser;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;
use signals::dst::DstSource;
use signals::wwvb::{self, WWVB};
use signals::TimeSignalSource;
use time::{TimeSpec, SECONDS_PER_MINUTE};
use tracing_subscriber::EnvFilter;

use args::Args;
use error::Error;
use writer::{make_writer, Second};

mod args;
mod error;
mod writer;

/// Seconds queued ahead of the audio callback.
const QUEUE_SECONDS: usize = 2;
/// How often a full queue is retried.
const QUEUE_POLL: Duration = Duration::from_millis(10);

/// Simple multi-threaded flag using a condition variable.
///
/// Note that this type does not support re-use, i.e. when a single thread calls
/// [`Flagger::notify`], all subsequent calls to [`Flagger::wait`] will return immediately.
struct Flagger {
	/// Mutex containing the flag. `true` means continue waiting.
	mutex: Mutex<bool>,
	/// Condition variable to manage wait/notify.
	cond: Condvar
}

impl Flagger {
	/// Create a new [`Flagger`] ready to be [`wait`](Flagger::wait)ed on.
	fn new() -> Arc<Flagger> {
		Arc::new(Flagger {
			mutex: Mutex::new(true),
			cond: Condvar::new()
		})
	}

	/// Block until another thread calls [`Flagger::notify`].
	fn wait(&self) {
		let guard = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
		drop(self.cond.wait_while(guard, |pending| *pending).unwrap_or_else(PoisonError::into_inner));
	}

	/// Unblock all current and future [`wait`](Flagger::wait)ers.
	fn notify(&self) {
		let mut flag = self.mutex.lock().unwrap_or_else(PoisonError::into_inner);
		*flag = false;
		self.cond.notify_all();
	}
}

/// Current state of the audio callback.
enum CallbackState {
	/// Waiting for the next second. Write [`f32::EQUILIBRIUM`].
	Waiting,
	/// Writing a second.
	Running(Second),
	/// All seconds were written. Notify the main thread once the last buffer has been handed off.
	Finishing
}

/// Make the audio callback that renders queued seconds with `func`.
///
/// The callback reads seconds from `rx` and repeatedly calls `func` until the output buffer is
/// full. When no second is queued it writes silence. Once the sender is dropped and every queued
/// second has been written, `flagger` is notified on the following callback.
///
/// `func` follows the contract of [`make_writer`].
fn make_callback<F>(rx: Receiver<Second>, flagger: Arc<Flagger>, mut func: F)
-> impl FnMut(&mut [f32]) + Send + 'static
where F: FnMut(&mut Second, &mut [f32]) -> (usize, bool) + Send + 'static
{
	let mut state = CallbackState::Waiting;

	move |data: &mut [f32]| {
		if let CallbackState::Finishing = state {
			flagger.notify();
		}

		let mut i = 0;
		while i < data.len() {
			if let CallbackState::Waiting = state {
				state = match rx.try_recv() {
					Ok(second) => CallbackState::Running(second),
					Err(TryRecvError::Empty) => break,
					Err(TryRecvError::Disconnected) => CallbackState::Finishing
				};
			}

			let CallbackState::Running(second) = &mut state else { break };
			let (n, done) = func(second, &mut data[i..]);
			i += n;
			if done {
				state = CallbackState::Waiting;
			}
		}

		data[i..].iter_mut().for_each(|v| *v = f32::EQUILIBRIUM);
	}
}

/// Prepare `count` minutes starting at `start`, and hand each remaining second to `send`.
///
/// The first minute starts partway through when `start` is not on a minute boundary, and the first
/// second carries the sample offset of `start.nsec` at `sample_rate`.
///
/// # Errors
///
/// Returns the first error from `send`.
fn transmit<D, E>(
	wwvb: &mut WWVB<D>,
	start: TimeSpec,
	count: NonZero<usize>,
	sample_rate: u32,
	mut send: impl FnMut(Second) -> Result<(), E>
) -> Result<(), E>
where D: DstSource
{
	let mut minute = start.minute_start();
	let mut first = Some((start.second_of_minute(), start.nsec as u64 * sample_rate as u64 / 1_000_000_000));

	for _ in 0..count.get() {
		wwvb.prepare_minute(minute);
		let frame = wwvb.frame();
		tracing::info!(
			time = minute,
			yday = frame.day_of_year(),
			hour = frame.hour(),
			minute = frame.minute(),
			dst = frame.dst_in_effect(),
			dst_next = frame.dst_announced(),
			"{frame}"
		);

		let (begin, offset) = first.take().unwrap_or((0, 0));
		for second in begin..SECONDS_PER_MINUTE as u32 {
			send(Second {
				second,
				modulation: wwvb.get_modulation_for_second(second),
				offset: if second == begin { offset } else { 0 }
			})?;
		}

		minute = minute.saturating_add(SECONDS_PER_MINUTE);
	}

	Ok(())
}

/// Queue `second` for the audio callback, waiting while the queue is full.
///
/// # Errors
///
/// Returns [`Error::StreamFailed`] once `failed` is set, and [`Error::ChannelClosed`] if the
/// callback has been dropped.
fn queue_second(tx: &SyncSender<Second>, failed: &AtomicBool, mut second: Second) -> Result<(), Error> {
	loop {
		if failed.load(Ordering::Acquire) {
			return Err(Error::StreamFailed);
		}
		match tx.try_send(second) {
			Ok(()) => return Ok(()),
			Err(TrySendError::Full(s)) => {
				second = s;
				thread::sleep(QUEUE_POLL);
			},
			Err(TrySendError::Disconnected(_)) => return Err(Error::ChannelClosed)
		}
	}
}

/// Log every second instead of playing it.
fn dry_run<D: DstSource>(wwvb: &mut WWVB<D>, start: TimeSpec, args: &Args) -> Result<(), Error> {
	transmit(wwvb, start, args.count, args.sample_rate, |s| {
		tracing::debug!(second = s.second, offset = s.offset, segments = ?s.modulation.segments());
		Ok(())
	})
}

/// Play the time signal over the default audio output device.
///
/// Creates and configures mono `f32` output at `args.sample_rate` with a 1024 sample buffer, and
/// transmits `args.count` minutes, blocking until complete.
///
/// # Errors
///
/// Returns an [`Error`] if the audio device cannot be opened or stops accepting seconds.
fn play<D: DstSource>(wwvb: &mut WWVB<D>, start: TimeSpec, args: &Args) -> Result<(), Error> {
	// Set up output device
	let host = cpal::default_host();
	let device = host.default_output_device().ok_or(Error::NoOutputDevice)?;
	let config = cpal::StreamConfig {
		channels: 1,
		sample_rate: cpal::SampleRate(args.sample_rate),
		buffer_size: cpal::BufferSize::Fixed(1024)
	};

	// Set up thread synchronization
	let (tx, rx) = sync_channel::<Second>(QUEUE_SECONDS);
	let flagger = Flagger::new();
	let error_flagger = flagger.clone();
	let failed = Arc::new(AtomicBool::new(false));
	let error_failed = failed.clone();

	let mut callback = make_callback(rx, flagger.clone(), make_writer(args.sample_rate));
	let stream = device.build_output_stream(
		&config,
		move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| callback(data),
		move |error| {
			tracing::error!(%error, "Audio stream error");
			error_failed.store(true, Ordering::Release);
			error_flagger.notify();
		},
		None)?;
	stream.play()?;
	tracing::info!(device = ?device.name().ok(), sample_rate = args.sample_rate, "Playing");

	transmit(wwvb, start, args.count, args.sample_rate, |s| queue_second(&tx, &failed, s))?;
	drop(tx);

	// Wait for audio to complete
	flagger.wait();
	if failed.load(Ordering::Acquire) {
		return Err(Error::StreamFailed);
	}
	Ok(())
}

/// Set up the timezone and start time, then transmit.
fn run(args: Args) -> Result<(), Error> {
	if let Some(tz) = &args.timezone {
		// Safety: no other threads have been started yet.
		if !unsafe { time::local::set_timezone(tz) } {
			return Err(Error::Timezone(tz.clone()));
		}
		tracing::info!(timezone = ?tz, "Using host timezone");
	}

	let start = match args.time {
		Some(t) => t,
		None => time::now().ok_or(Error::Clock)?
	};

	let mut wwvb = wwvb::new();
	if args.dry_run {
		dry_run(&mut wwvb, start, &args)
	} else {
		play(&mut wwvb, start, &args)
	}
}

/// Main program entry point.
///
/// Parses input arguments and plays time signal audio output. See [`crate`] documentation for
/// details.
fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_writer(std::io::stderr)
		.init();

	let args = Args::parse();
	tracing::debug!(?args);

	match run(args) {
		Ok(()) => ExitCode::SUCCESS,
		Err(error) => {
			tracing::error!("{}", error);
			ExitCode::FAILURE
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use signals::dst::DstStatus;

	fn collect(start: TimeSpec, count: usize) -> Vec<Second> {
		let mut wwvb = WWVB::new(DstStatus { today: false, tomorrow: true });
		let mut out = Vec::new();
		transmit(&mut wwvb, start, NonZero::new(count).unwrap(), 48000, |s| {
			out.push(s);
			Ok::<_, ()>(())
		}).unwrap();
		out
	}

	#[test]
	fn transmit_test() {
		// Sun, Mar 10 2024 00:30:00 UTC
		let seconds = collect(TimeSpec { sec: 1710030600, nsec: 0 }, 2);
		assert_eq!(seconds.len(), 120);
		assert!(seconds.iter().all(|s| s.offset == 0));
		assert_eq!(seconds.iter().map(|s| s.second).take(60).collect::<Vec<_>>(), (0..60).collect::<Vec<_>>());
		assert_eq!(seconds[0].modulation, wwvb::MARKER);
		// Minute 30 tens digit, then minute 31 ones digit in the second frame
		assert_eq!(seconds[2].modulation, wwvb::ONE);
		assert_eq!(seconds[60 + 8].modulation, wwvb::ONE);
		assert_eq!(seconds[8].modulation, wwvb::ZERO);
	}

	#[test]
	fn transmit_mid_minute_test() {
		// Sun, Mar 10 2024 00:30:45.5 UTC
		let seconds = collect(TimeSpec { sec: 1710030645, nsec: 500_000_000 }, 2);
		assert_eq!(seconds.len(), 15 + 60);
		assert_eq!(seconds[0].second, 45);
		assert_eq!(seconds[0].offset, 24000);
		assert_eq!(seconds[1].offset, 0);
		assert_eq!(seconds[15].second, 0);
		assert_eq!(seconds[15].offset, 0);
	}

	#[test]
	fn transmit_error_test() {
		let mut wwvb = WWVB::new(DstStatus::default());
		let mut sent = 0;
		let result = transmit(&mut wwvb, TimeSpec { sec: 0, nsec: 0 }, NonZero::new(4).unwrap(), 48000, |_| {
			sent += 1;
			if sent == 3 { Err("closed") } else { Ok(()) }
		});
		assert_eq!(result, Err("closed"));
		assert_eq!(sent, 3);
	}

	#[test]
	fn queue_second_test() {
		let second = Second { second: 1, modulation: wwvb::ONE, offset: 0 };
		let failed = AtomicBool::new(false);
		let (tx, rx) = sync_channel::<Second>(1);
		assert!(queue_second(&tx, &failed, second).is_ok());
		assert_eq!(rx.try_recv(), Ok(second));

		// A stream error releases a sender stuck on a full queue
		tx.send(second).unwrap();
		let stuck = AtomicBool::new(false);
		thread::scope(|scope| {
			let sender = scope.spawn(|| queue_second(&tx, &stuck, second));
			thread::sleep(QUEUE_POLL * 3);
			stuck.store(true, Ordering::Release);
			assert!(matches!(sender.join().unwrap(), Err(Error::StreamFailed)));
		});

		drop(rx);
		assert!(matches!(queue_second(&tx, &failed, second), Err(Error::ChannelClosed)));
	}

	#[test]
	fn callback_test() {
		let (tx, rx) = sync_channel::<Second>(4);
		let flagger = Flagger::new();
		let mut callback = make_callback(rx, flagger.clone(), |s: &mut Second, data: &mut [f32]| {
			// One sample per second, valued by the second
			data[0] = s.second as f32;
			(1, true)
		});

		// Nothing queued yet
		let mut buf = [1.0; 4];
		callback(&mut buf[..]);
		assert_eq!(buf, [0.0; 4]);

		for second in [7, 8, 9] {
			tx.send(Second { second, modulation: wwvb::ZERO, offset: 0 }).unwrap();
		}
		drop(tx);
		callback(&mut buf[..]);
		assert_eq!(buf, [7.0, 8.0, 9.0, 0.0]);

		// Finishing notifies on the next callback, so wait returns immediately
		callback(&mut buf[..]);
		assert_eq!(buf, [0.0; 4]);
		flagger.wait();
	}
}
