#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_discovery::models::SemanticSearchInput;

fuzz_target!(|data: &[u8]| {
    let _ = serde_json::from_slice::<SemanticSearchInput>(data);
});
