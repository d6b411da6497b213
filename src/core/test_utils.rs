//! Test utilities for building symbol graphs.
//!
//! Unit tests describe the declarations they need with a [`test::Fixture`]
//! and mangle them against a fresh session per call, so no state leaks from
//! one request into the next.
