//! Segmentation layer tests
//!
//! Marker codec, page map and chunk assembly exercised through the
//! public segment API, including multi-byte text.
