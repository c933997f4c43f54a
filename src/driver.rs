use std::error::Error;
use std::fmt;

use crate::cookies::SessionCookie;

/// Handle to a located page element. Only meaningful to the driver that
/// produced it, and only until the next page update replaces the DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef(u32);

impl ElementRef {
    pub fn new(node_id: u32) -> Self {
        ElementRef(node_id)
    }

    pub fn node_id(self) -> u32 {
        self.0
    }
}

/// Browser interaction failure. Fatal for the run: the page will not answer
/// differently to an identical query, so nothing is retried.
#[derive(Debug)]
pub enum DriverError {
    Launch(String),
    Locate { selector: String, detail: String },
    Interact { action: String, detail: String },
}

impl DriverError {
    pub fn locate(selector: &str, detail: impl Into<String>) -> Self {
        DriverError::Locate {
            selector: selector.to_string(),
            detail: detail.into(),
        }
    }

    pub fn interact(action: &str, detail: impl Into<String>) -> Self {
        DriverError::Interact {
            action: action.to_string(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Launch(detail) => write!(f, "browser launch failed: {}", detail),
            DriverError::Locate { selector, detail } => {
                write!(f, "locate {:?}: {}", selector, detail)
            }
            DriverError::Interact { action, detail } => write!(f, "{}: {}", action, detail),
        }
    }
}

impl Error for DriverError {}

/// The narrow browser-automation contract the rest of the tool consumes.
/// Everything above this trait is browser-free.
pub trait Driver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError>;
    fn wait_navigated(&mut self) -> Result<(), DriverError>;
    fn current_url(&mut self) -> Result<String, DriverError>;
    /// Fails unless the selector matches exactly one element.
    fn locate_one(&mut self, selector: &str) -> Result<ElementRef, DriverError>;
    fn locate_all(&mut self, selector: &str) -> Result<Vec<ElementRef>, DriverError>;
    fn read_text(&mut self, element: ElementRef) -> Result<String, DriverError>;
    fn read_attribute(
        &mut self,
        element: ElementRef,
        name: &str,
    ) -> Result<Option<String>, DriverError>;
    /// Outer HTML of the element, for snapshotting a widget.
    fn read_html(&mut self, element: ElementRef) -> Result<String, DriverError>;
    fn click(&mut self, element: ElementRef) -> Result<(), DriverError>;
    /// Type into whatever currently holds focus.
    fn type_text(&mut self, text: &str) -> Result<(), DriverError>;
    /// Assign a form field's value directly (login inputs).
    fn set_value(&mut self, element: ElementRef, value: &str) -> Result<(), DriverError>;
    /// Select an option by value; returns the values selected afterwards.
    fn select_option(
        &mut self,
        element: ElementRef,
        value: &str,
    ) -> Result<Vec<String>, DriverError>;
    fn set_cookies(&mut self, cookies: &[SessionCookie]) -> Result<(), DriverError>;
    fn cookies(&mut self) -> Result<Vec<SessionCookie>, DriverError>;
}
