//! Support for command line argument parsing.
//!
//! See [crate] documentation for details on command line arguments and examples.

use std::ffi::{CString, NulError};
use std::num::NonZero;

use clap::Parser;
use time::{parse_timestamp, ParseError, TimeSpec};

/// Transmit the WWVB time code through the default audio output.
#[derive(Debug, Parser)]
#[command(version, after_help = "\
Examples:
  wwvbsignal -n 6
  wwvbsignal -z \"EST5EDT,M3.2.0,M11.1.0\"
  wwvbsignal -t \"2024-03-10 00:30\" --dry-run")]
pub struct Args {
	/// The number of minutes to transmit
	#[arg(short = 'n', short_alias = 'c', long, default_value = "4")]
	pub count: NonZero<usize>,

	/// Host timezone used for daylight savings time, as a TZ string or zoneinfo name
	#[arg(short = 'z', long, value_parser = parse_timezone)]
	pub timezone: Option<CString>,

	/// The starting time to transmit, defaults to now
	#[arg(short = 't', long, value_parser = parse_time)]
	pub time: Option<TimeSpec>,

	/// Log frames instead of playing audio
	#[arg(long)]
	pub dry_run: bool,

	/// Output sample rate in Hz
	#[arg(long, default_value = "48000", value_parser = clap::value_parser!(u32).range(44100..=192000))]
	pub sample_rate: u32
}

/// Parse a date time string, see [`parse_timestamp`] for accepted formats.
fn parse_time(s: &str) -> Result<TimeSpec, ParseError> {
	parse_timestamp(s.as_bytes())
}

/// Timezones are handed to the host C library, so they cannot contain NUL.
fn parse_timezone(s: &str) -> Result<CString, NulError> {
	CString::new(s)
}
