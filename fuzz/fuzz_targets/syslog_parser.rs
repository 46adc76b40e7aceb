#![no_main]

use libfuzzer_sys::fuzz_target;
use syslogidx_syslog::Rfc5424Parser;

fuzz_target!(|data: &[u8]| {
    let parser = Rfc5424Parser::new();

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    if let Ok(parts) = parser.parse(data) {
        // 파싱에 성공하면 우선순위는 항상 0..=191 범위로 분해된다
        assert!(parts.facility <= 23);
        assert!(parts.severity <= 7);
    }
});
