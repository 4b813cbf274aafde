//! Test utilities for arena-based testing.
//!
//! Sessions borrow their arena, so tests keep a [`test::TestContext`] alive
//! for as long as a session is in use.
