#![no_main]

use libfuzzer_sys::fuzz_target;
use syslogidx_cloudtrail::bundle::{Record, enrich, event_time};

fuzz_target!(|data: &[u8]| {
    let Ok(record) = serde_json::from_slice::<Record>(data) else {
        return;
    };
    let Some(time) = event_time(&record) else {
        return;
    };

    // 보강 결과는 항상 @timestamp를 가진 JSON 객체여야 한다
    let Ok(doc) = enrich(record, &time, "syslogidx") else {
        return;
    };
    let value: serde_json::Value = serde_json::from_slice(&doc).expect("enriched record is JSON");
    assert!(value.get("@timestamp").is_some());
});
