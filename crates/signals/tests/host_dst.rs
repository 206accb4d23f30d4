//! DST bits from the host timezone. Everything lives in one test so `TZ` is never changed
//! concurrently.

#![cfg(feature = "host")]

use signals::dst::{DstSource, DstStatus, HostLocalTime};
use signals::{wwvb, TimeSignalSource};
use time::Tm;
use time::local::set_timezone;

#[test]
fn host_dst_test() {
	// Safety: this is the only test in this binary.
	assert!(unsafe { set_timezone(c"EST5EDT,M3.2.0,M11.1.0") });

	let status = |time| HostLocalTime.dst_status(&Tm::new(time));
	// Sun, Mar 10 2024: DST starts at 02:00 local
	assert_eq!(status(1710030600), DstStatus { today: false, tomorrow: true });
	// Sun, Nov 3 2024: DST ends at 02:00 local
	assert_eq!(status(1730635200), DstStatus { today: true, tomorrow: false });
	// Thu, Jul 4 2024
	assert_eq!(status(1720114200), DstStatus { today: true, tomorrow: true });
	// Mon, Jan 15 2024
	assert_eq!(status(1705320000), DstStatus { today: false, tomorrow: false });

	// 2024-03-10T00:30:00Z announces DST without putting it in effect
	let mut source = wwvb::new();
	source.prepare_minute(1710030600);
	let frame = source.frame();
	assert!(frame.bit(57));
	assert!(!frame.bit(58));
	assert_eq!(frame.to_string(), "M01100000M000000000M000000111M000000000M000000010M010001010M");
	assert_eq!(source.get_modulation_for_second(57), wwvb::ONE);
	assert_eq!(source.get_modulation_for_second(58), wwvb::ZERO);

	// Samoa skipped Fri, Dec 30 2011 local. The missing day keeps today's DST flag.
	// Safety: as above.
	assert!(unsafe { set_timezone(c"Pacific/Apia") });
	assert_eq!(status(1325120705), DstStatus { today: true, tomorrow: true });
	source.prepare_minute(1325120705);
	assert_eq!(source.frame().bits(), 0x2802330c000846);

	// Without DST rules, neither bit is ever set
	// Safety: as above.
	assert!(unsafe { set_timezone(c"UTC0") });
	assert_eq!(status(1720114200), DstStatus::default());
	source.prepare_minute(1720114200);
	assert!(!source.frame().dst_in_effect());
	assert!(!source.frame().dst_announced());
}
