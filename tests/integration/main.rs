//! Integration test suite entry point.

mod fixture;
mod materializer_tests;
mod ranking_tests;
mod sync_tests;
