#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Day files come from disk and may be truncated or hand-edited
    if let Ok(records) = tibber_price::persistence::parse_records(data) {
        assert!(!records.is_empty());
        let _ = serde_json::to_vec(&records);
    }
});
