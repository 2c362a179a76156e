//! Integration tests for docs-harvest

mod crawl_tests;
mod http_renderer_tests;
