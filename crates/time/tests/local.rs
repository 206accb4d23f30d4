//! Host local time behavior. Everything lives in one test so `TZ` is never changed concurrently.

#![cfg(feature = "local")]

use time::local::{set_timezone, LocalTm};

#[test]
fn host_local_time_test() {
	// Safety: this is the only test in this binary.
	assert!(unsafe { set_timezone(c"EST5EDT,M3.2.0,M11.1.0") });

	// Jan 15, 2024 12:00 UTC => 07:00 EST
	let t = LocalTm::from_timestamp(1705320000).unwrap();
	assert_eq!((t.year, t.mon, t.day, t.hour, t.isdst), (2024, 1, 15, 7, Some(false)));

	// Jul 4, 2024 16:00 UTC => 12:00 EDT
	let t = LocalTm::from_timestamp(1720108800).unwrap();
	assert_eq!((t.year, t.mon, t.day, t.hour, t.isdst), (2024, 7, 4, 12, Some(true)));

	// Local midnight on the day DST starts is still standard time
	let mut m = LocalTm::from_date(2024, 3, 10);
	assert_eq!(m.normalize(), Some(1710046800));
	assert_eq!(m.isdst, Some(false));

	// 24 hours later rolls into the next day, which is in DST
	m.hour += 24;
	assert!(m.normalize().is_some());
	assert_eq!((m.mon, m.day), (3, 11));
	assert_eq!(m.isdst, Some(true));

	// 02:30 on Mar 10 does not exist locally; the host resolves it into DST
	let mut gap = LocalTm::from_date(2024, 3, 10);
	gap.hour = 2;
	gap.min = 30;
	assert!(gap.normalize().is_some());
	assert_eq!(gap.isdst, Some(true));

	// Safety: as above.
	assert!(unsafe { set_timezone(c"UTC0") });
	let mut m = LocalTm::from_date(2024, 7, 4);
	assert_eq!(m.normalize(), Some(1720051200));
	assert_eq!(m.isdst, Some(false));
}
