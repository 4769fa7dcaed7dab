#![no_main]

use std::sync::{Arc, LazyLock};

use libfuzzer_sys::fuzz_target;
use scholar_discovery::ConceptOntology;
use scholar_discovery::engine::QueryExpander;

static EXPANDER: LazyLock<QueryExpander> =
    LazyLock::new(|| QueryExpander::new(Arc::new(ConceptOntology::embedded())));

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let domains = vec!["oncology".to_string()];
        let terms = EXPANDER.expand(text, &domains, true);
        assert_eq!(terms.first().map(String::as_str), Some(text));
        let _ = EXPANDER.expand_concepts(text, &domains);
        let _ = EXPANDER.extract_concepts(text, 10);
        let _ = EXPANDER.ontology().classify_domain(text);
    }
});
