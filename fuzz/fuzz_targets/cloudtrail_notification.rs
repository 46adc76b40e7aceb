#![no_main]

use libfuzzer_sys::fuzz_target;
use syslogidx_cloudtrail::CloudTrailNotification;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = std::str::from_utf8(data) {
        let _ = CloudTrailNotification::from_queue_body(body);
    }
});
