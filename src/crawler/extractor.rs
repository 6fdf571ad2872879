//! Extraction Fallback Chain
//!
//! A field value is pulled from the page by trying an ordered list of
//! strategies. The first strategy that finds its element and reads a
//! non-empty value wins. Absence and driver errors both just move the chain
//! on to the next strategy; when every strategy misses the field is absent,
//! which is a normal outcome and not an error.

use crate::driver::{DriverError, ElementHandle, PageSession};
use std::time::Duration;

/// What to read from a located element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadMode {
    /// Visible text
    Text,
    /// Value of the named attribute
    Attribute(String),
}

/// One way of reading a field
///
/// A strategy locates an element by `selector` (inside the first element
/// matching `within`, when set) and reads it according to `read`. By default
/// the outermost lookup waits up to the caller's timeout for the element to
/// appear; `immediate` strategies look once and move on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    selector: String,
    within: Option<String>,
    read: ReadMode,
    strip_prefix: Option<String>,
    wait: bool,
}

impl Strategy {
    /// Reads the visible text of the element matching `selector`
    pub fn text(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            within: None,
            read: ReadMode::Text,
            strip_prefix: None,
            wait: true,
        }
    }

    /// Reads attribute `name` of the element matching `selector`
    pub fn attribute(selector: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            read: ReadMode::Attribute(name.into()),
            ..Self::text(selector)
        }
    }

    /// Looks for the element inside the first element matching `container`
    pub fn within(mut self, container: impl Into<String>) -> Self {
        self.within = Some(container.into());
        self
    }

    /// Requires the value to start with `prefix` and removes it
    ///
    /// Values without the prefix count as a miss.
    pub fn strip_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.strip_prefix = Some(prefix.into());
        self
    }

    /// Looks once instead of waiting for the element to appear
    pub fn immediate(mut self) -> Self {
        self.wait = false;
        self
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn read_mode(&self) -> &ReadMode {
        &self.read
    }

    /// Runs this strategy once
    pub async fn attempt<S: PageSession + ?Sized>(
        &self,
        session: &mut S,
        timeout: Duration,
    ) -> StrategyOutcome {
        match self.read_value(session, timeout).await {
            Ok(Some(value)) => match self.finish(value) {
                Some(value) => StrategyOutcome::Found(value),
                None => StrategyOutcome::Missing,
            },
            Ok(None) => StrategyOutcome::Missing,
            Err(e) if e.is_absence() => StrategyOutcome::Missing,
            Err(e) => StrategyOutcome::Failed(e),
        }
    }

    async fn locate<S: PageSession + ?Sized>(
        &self,
        session: &mut S,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<ElementHandle>, DriverError> {
        if self.wait {
            session.wait_until_present(selector, timeout).await.map(Some)
        } else {
            session.find(selector, None).await
        }
    }

    async fn read_value<S: PageSession + ?Sized>(
        &self,
        session: &mut S,
        timeout: Duration,
    ) -> Result<Option<String>, DriverError> {
        let element = match &self.within {
            Some(container) => match self.locate(session, container, timeout).await? {
                Some(scope) => session.find(&self.selector, Some(&scope)).await?,
                None => None,
            },
            None => self.locate(session, &self.selector, timeout).await?,
        };
        let Some(element) = element else {
            return Ok(None);
        };

        match &self.read {
            ReadMode::Text => session.text(&element).await.map(Some),
            ReadMode::Attribute(name) => session.attribute(&element, name).await,
        }
    }

    /// Trims, strips the required prefix and drops empty values
    fn finish(&self, value: String) -> Option<String> {
        let value = value.trim();
        let value = match &self.strip_prefix {
            Some(prefix) => value.strip_prefix(prefix.as_str())?.trim(),
            None => value,
        };
        (!value.is_empty()).then(|| value.to_string())
    }
}

/// Result of running one strategy
#[derive(Debug)]
pub enum StrategyOutcome {
    /// A non-empty value was read
    Found(String),
    /// The element or value is not there
    Missing,
    /// The page driver reported an error
    Failed(DriverError),
}

/// Result of a whole fallback chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Value read by the strategy at index `strategy`
    Found { value: String, strategy: usize },
    /// No strategy produced a value
    Absent,
}

impl Extraction {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Found { value, .. } => Some(value),
            Self::Absent => None,
        }
    }

    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Found { value, .. } => Some(value),
            Self::Absent => None,
        }
    }
}

/// Tries `strategies` in order and returns the first value found
///
/// Strategies after the winning one are never run, and no strategy is
/// retried. Waiting is left to the page session's `wait_until_present`,
/// bounded by `timeout` per strategy.
///
/// # Arguments
///
/// * `session` - Page to read from
/// * `field` - Field name, used only for logging
/// * `strategies` - Strategies in decreasing order of preference
/// * `timeout` - Bound for each waiting lookup
pub async fn extract_field<S: PageSession + ?Sized>(
    session: &mut S,
    field: &str,
    strategies: &[Strategy],
    timeout: Duration,
) -> Extraction {
    for (index, strategy) in strategies.iter().enumerate() {
        match strategy.attempt(session, timeout).await {
            StrategyOutcome::Found(value) => {
                tracing::debug!(
                    "Found {} via strategy {} ({})",
                    field,
                    index + 1,
                    strategy.selector()
                );
                return Extraction::Found {
                    value,
                    strategy: index,
                };
            }
            StrategyOutcome::Missing => {
                tracing::debug!(
                    "No {} via strategy {} ({})",
                    field,
                    index + 1,
                    strategy.selector()
                );
            }
            StrategyOutcome::Failed(e) => {
                tracing::debug!(
                    "Strategy {} for {} failed ({}): {}",
                    index + 1,
                    field,
                    strategy.selector(),
                    e
                );
            }
        }
    }

    tracing::debug!("Could not find {} using any strategy", field);
    Extraction::Absent
}
