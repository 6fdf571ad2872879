//! Page driving
//!
//! The crawler talks to pages only through the [`PageSession`] trait. Two
//! engines implement it: [`WebDriverSession`] drives a real browser over the
//! W3C WebDriver protocol and [`MemorySession`] replays scripted pages.

mod memory;
mod traits;
mod webdriver;

pub use memory::{ClickAction, MemoryElement, MemorySession};
pub use traits::{DriverError, DriverResult, ElementHandle, PageSession, POLL_INTERVAL};
pub use webdriver::{WebDriverSession, ELEMENT_KEY};
