#![no_main]

use libfuzzer_sys::fuzz_target;
use scholar_discovery::models::{
    DeepDiveInput, PrimaryReviewOutput, RecommendationsInput, RecordInteractionInput, ReviewInput,
    UserProfile,
};

fuzz_target!(|data: &[u8]| {
    // First try to parse as valid JSON
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        // Then try each model type
        let _ = serde_json::from_value::<RecommendationsInput>(json.clone());
        let _ = serde_json::from_value::<RecordInteractionInput>(json.clone());
        let _ = serde_json::from_value::<DeepDiveInput>(json.clone());
        let _ = serde_json::from_value::<ReviewInput>(json.clone());
        let _ = serde_json::from_value::<PrimaryReviewOutput>(json.clone());
        let _ = serde_json::from_value::<UserProfile>(json);
    }
});
