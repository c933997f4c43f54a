//! Production driver over a headless Chrome instance. Nothing outside this
//! module names the browser library; everything else talks to the
//! `driver::Driver` trait.

use std::sync::Arc;
use std::time::Duration;

use headless_chrome::protocol::cdp::Network::CookieParam;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};

use crate::cookies::SessionCookie;
use crate::driver::{Driver, DriverError, ElementRef};

pub struct ChromeDriver {
    // Dropping the browser kills the child process; keep it alive as long
    // as the tab is in use.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(headless: bool, ignore_https_errors: bool) -> Result<Self, DriverError> {
        let options = LaunchOptions::default_builder()
            .headless(headless)
            .ignore_certificate_errors(ignore_https_errors)
            .idle_browser_timeout(Duration::from_secs(600))
            .build()
            .map_err(|err| DriverError::Launch(err.to_string()))?;
        let browser = Browser::new(options).map_err(|err| DriverError::Launch(err.to_string()))?;
        let tab = browser
            .new_tab()
            .map_err(|err| DriverError::Launch(err.to_string()))?;
        tab.set_default_timeout(Duration::from_secs(120));
        Ok(ChromeDriver {
            _browser: browser,
            tab,
        })
    }

    fn element(&self, element: ElementRef) -> Result<Element<'_>, DriverError> {
        Element::new(&self.tab, element.node_id())
            .map_err(|err| DriverError::interact("resolve element", err.to_string()))
    }
}

impl Driver for ChromeDriver {
    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.tab
            .navigate_to(url)
            .map_err(|err| DriverError::interact("navigate", err.to_string()))?;
        self.wait_navigated()
    }

    fn wait_navigated(&mut self) -> Result<(), DriverError> {
        self.tab
            .wait_until_navigated()
            .map_err(|err| DriverError::interact("wait for navigation", err.to_string()))?;
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, DriverError> {
        Ok(self.tab.get_url())
    }

    fn locate_one(&mut self, selector: &str) -> Result<ElementRef, DriverError> {
        let elements = self.locate_all(selector)?;
        match elements.as_slice() {
            [element] => Ok(*element),
            found => Err(DriverError::locate(
                selector,
                format!("expected exactly one match, found {}", found.len()),
            )),
        }
    }

    fn locate_all(&mut self, selector: &str) -> Result<Vec<ElementRef>, DriverError> {
        let elements = self
            .tab
            .find_elements(selector)
            .map_err(|err| DriverError::locate(selector, err.to_string()))?;
        Ok(elements
            .into_iter()
            .map(|element| ElementRef::new(element.node_id))
            .collect())
    }

    fn read_text(&mut self, element: ElementRef) -> Result<String, DriverError> {
        self.element(element)?
            .get_inner_text()
            .map_err(|err| DriverError::interact("read text", err.to_string()))
    }

    fn read_attribute(
        &mut self,
        element: ElementRef,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        self.element(element)?
            .get_attribute_value(name)
            .map_err(|err| DriverError::interact("read attribute", err.to_string()))
    }

    fn read_html(&mut self, element: ElementRef) -> Result<String, DriverError> {
        self.element(element)?
            .get_content()
            .map_err(|err| DriverError::interact("read outer HTML", err.to_string()))
    }

    fn click(&mut self, element: ElementRef) -> Result<(), DriverError> {
        self.element(element)?
            .click()
            .map_err(|err| DriverError::interact("click", err.to_string()))?;
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<(), DriverError> {
        self.tab
            .type_str(text)
            .map_err(|err| DriverError::interact("type text", err.to_string()))?;
        Ok(())
    }

    fn set_value(&mut self, element: ElementRef, value: &str) -> Result<(), DriverError> {
        self.element(element)?
            .call_js_fn(
                "function (value) { this.value = value; }",
                vec![serde_json::Value::String(value.to_string())],
                false,
            )
            .map_err(|err| DriverError::interact("set value", err.to_string()))?;
        Ok(())
    }

    fn select_option(
        &mut self,
        element: ElementRef,
        value: &str,
    ) -> Result<Vec<String>, DriverError> {
        let result = self
            .element(element)?
            .call_js_fn(
                "function (value) {\
                   this.value = value;\
                   this.dispatchEvent(new Event('change', { bubbles: true }));\
                   return Array.from(this.selectedOptions)\
                     .map(function (option) { return option.value; })\
                     .join('\\n');\
                 }",
                vec![serde_json::Value::String(value.to_string())],
                false,
            )
            .map_err(|err| DriverError::interact("select option", err.to_string()))?;
        match result.value {
            Some(serde_json::Value::String(values)) if !values.is_empty() => {
                Ok(values.lines().map(str::to_string).collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    fn set_cookies(&mut self, cookies: &[SessionCookie]) -> Result<(), DriverError> {
        let params: Vec<CookieParam> = cookies
            .iter()
            .map(|cookie| CookieParam {
                name: cookie.name.clone(),
                value: cookie.value.clone(),
                url: None,
                domain: Some(cookie.domain.clone()),
                path: Some(cookie.path.clone()),
                secure: Some(cookie.secure),
                http_only: Some(cookie.http_only),
                same_site: None,
                expires: Some(cookie.expires),
                priority: None,
                same_party: None,
                source_scheme: None,
                source_port: None,
                partition_key: None,
            })
            .collect();
        self.tab
            .set_cookies(params)
            .map_err(|err| DriverError::interact("set cookies", err.to_string()))?;
        Ok(())
    }

    fn cookies(&mut self) -> Result<Vec<SessionCookie>, DriverError> {
        let cookies = self
            .tab
            .get_cookies()
            .map_err(|err| DriverError::interact("read cookies", err.to_string()))?;
        Ok(cookies
            .into_iter()
            .map(|cookie| SessionCookie {
                name: cookie.name,
                value: cookie.value,
                domain: cookie.domain,
                path: cookie.path,
                expires: cookie.expires,
                http_only: cookie.http_only,
                secure: cookie.secure,
            })
            .collect())
    }
}
