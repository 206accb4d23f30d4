//! Utilities for dealing with time.
//!
//! This crate is divided into three parts:
//! - [`time`] converts between Unix timestamps and UTC calendar time, with no understanding of
//!   timezones. It is pure Rust and thread safe.
//! - [`local`] wraps the host's local time services (`mktime`, `localtime_r`, `tzset`), which are
//!   the only source of timezone and daylight savings time information in this crate.
//! - [`parse`] parses date time strings into Unix timestamps.
//!
//! The crate is `no_std`. The `now` feature enables [`time::now`], and the `local` feature enables
//! the [`local`] module. Both pull in `libc`.
//!
//! # Examples
//!
//! Basic conversion from Unix time to UTC calendar time.
//! ```
//! # use time::time::Tm;
//! let date = Tm::new(1718617807);
//!	assert_eq!(date, Tm {
//!		sec: 7,
//!		min: 50,
//!		hour: 9,
//!		day: 17,
//!		mon: 6,
//!		year: 2024,
//!		wday: 1,
//!		yday: 169
//!	});
//! ```

#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod time;
pub mod parse;

#[cfg(feature = "local")]
#[cfg_attr(docsrs, doc(cfg(feature = "local")))]
pub mod local;

pub use time::*;
pub use parse::*;
