#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_discovery::models::PaperRecord;

fuzz_target!(|data: &[u8]| {
    // Parsing must return Ok or Err, never panic; parsed records must be
    // safe to inspect.
    if let Ok(paper) = serde_json::from_slice::<PaperRecord>(data) {
        let _ = paper.keyword_set();
        let _ = paper.age(2024);
        let _ = paper.text();
    }
});
