//! Integration tests for Listing-Harvest
//!
//! The scrape tests drive the coordinator end-to-end over the scripted
//! `MemorySession`; the WebDriver tests use wiremock to stand in for a
//! WebDriver server.

mod batch_tests;
mod output_tests;
mod scrape_tests;
mod support;
mod webdriver_tests;
