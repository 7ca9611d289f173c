// Common test utilities and fixtures


// Re-export commonly used items
// Note: Not every test binary uses every helper
#[allow(unused_imports)]
pub use fixtures::{numbered_pages, Utf8TestData, SAMPLE_MANUAL};
#[allow(unused_imports)]
pub use helpers::{
    assert_chunk_invariants, create_session, create_test_services, slice_chars,
};
