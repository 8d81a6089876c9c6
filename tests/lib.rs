/// Main test module that includes all sub-modules
/// Run specific tests with `cargo test <module>::<submodule>`
/// For example: `cargo test algorithm::matching_test`
// Utility modules
pub mod utils;

// Normalizer tests
pub mod normalize {
    pub mod normalize_test;
}

// Algorithm tests
pub mod algorithm {
    pub mod duration_test;
    pub mod matching_test;
}

// Integration tests
pub mod integration {
    pub mod pipeline_test;
    pub mod source_test;
}
