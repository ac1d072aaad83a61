/// Integration tests for the NHANES pipeline
/// Run specific tests with `cargo test <module>::<submodule>`
/// For example: `cargo test integration::pipeline_test`
// Utility modules
pub mod utils;

// Integration tests
pub mod integration {
    pub mod loader_test;
    pub mod pipeline_test;
}
