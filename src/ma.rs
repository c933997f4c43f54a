//! MA-EYES page binding: login, the loading-overlay wait contract, the
//! year/month calendar, and the live per-week session.
//!
//! The work-result page does full-document async updates that fire no
//! navigation events, so "the page settled" is approximated by watching the
//! blocking overlay appear and disappear, each phase with its own timeout.
//! A timeout means "proceed anyway": the overlay is sometimes gone before
//! the first poll.

use std::error::Error;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::{Month, RunConfig};
use crate::cookies::{self, CookieError};
use crate::driver::{Driver, DriverError};
use crate::markup::{self, HoursTable, Table};
use crate::session::WeekSession;

const LOGIN_USER_INPUT: &str = r#"input[data-p-label="ユーザコード"]"#;
const LOGIN_PASS_INPUT: &str = r#"input[data-p-label="パスワード"]"#;
const LOGIN_BUTTON: &str = "div.login-actions button";
const LOGGED_IN_PAGE_SUFFIX: &str = "/workResult.xhtml";

const YEAR_SELECT: &str = "select.ui-datepicker-year";
const MONTH_SELECT: &str = "select.ui-datepicker-month";
const CALENDAR_ROWS: &str = "table.ui-datepicker-calendar tbody tr";

const ATTENDANCE_TABLE: &str = r#"table[id="workResultView:j_idt69"]"#;
const HOURS_WIDGET: &str = r#"div[id="workResultView:items"]"#;
const HOURS_DATA_ROWS: &str = r#"tbody[id="workResultView:items_data"] tr"#;
const SAVE_BUTTON: &str = "#workResultView\\:j_idt50\\:saveButton";
const IMPORT_BUTTON: &str = "#workResultView\\:j_idt52";
const LOADING_OVERLAY: &str = "div.ui-blockui-content";

const OVERLAY_POLL: Duration = Duration::from_millis(100);
const OVERLAY_TIMEOUT: Duration = Duration::from_secs(30);
/// Cell commits often finish without ever showing the overlay; waiting the
/// full timeout for it to appear would stall every edit.
const CELL_COMMIT_APPEAR_TIMEOUT: Duration = Duration::from_millis(300);
const OVERLAY_SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug)]
pub enum MaError {
    Driver(DriverError),
    Cookie(CookieError),
}

impl fmt::Display for MaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaError::Driver(err) => write!(f, "{}", err),
            MaError::Cookie(err) => write!(f, "{}", err),
        }
    }
}

impl Error for MaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MaError::Driver(err) => Some(err),
            MaError::Cookie(err) => Some(err),
        }
    }
}

impl From<DriverError> for MaError {
    fn from(value: DriverError) -> Self {
        MaError::Driver(value)
    }
}

impl From<CookieError> for MaError {
    fn from(value: CookieError) -> Self {
        MaError::Cookie(value)
    }
}

/// Log in, either with an imported cookie file or through the login form.
/// With a cookie-save path configured, the fresh session's cookies are
/// written after the form login.
pub fn login(driver: &mut dyn Driver, config: &RunConfig) -> Result<(), MaError> {
    if let Some(path) = &config.cookie_load {
        let cookies = cookies::load(path)?;
        debug!("imported {} cookies from {}", cookies.len(), path.display());
        driver.set_cookies(&cookies)?;
        debug!("navigate {}", config.ma_url);
        driver.navigate(&config.ma_url)?;
        return Ok(());
    }

    debug!("navigate {}", config.ma_url);
    driver.navigate(&config.ma_url)?;

    if driver.current_url()?.ends_with(LOGGED_IN_PAGE_SUFFIX) {
        debug!("already logged in");
        return Ok(());
    }

    let user = driver.locate_one(LOGIN_USER_INPUT)?;
    driver.set_value(user, &config.ma_user)?;
    let pass = driver.locate_one(LOGIN_PASS_INPUT)?;
    driver.set_value(pass, &config.ma_pass)?;
    let button = driver.locate_one(LOGIN_BUTTON)?;
    driver.click(button)?;
    driver.wait_navigated()?;

    if let Some(path) = &config.cookie_save {
        let cookies = driver.cookies()?;
        cookies::save(path, &cookies)?;
        info!("saved {} cookies to {}", cookies.len(), path.display());
    }
    Ok(())
}

/// Point the work-result calendar at the target month.
pub fn select_year_month(driver: &mut dyn Driver, month: Month) -> Result<(), DriverError> {
    let year_value = month.year.to_string();
    let year = driver.locate_one(YEAR_SELECT)?;
    debug!("select year {year_value}");
    let selected = driver.select_option(year, &year_value)?;
    if selected != [year_value.clone()] {
        return Err(DriverError::interact(
            "select year",
            format!("selected {:?}", selected),
        ));
    }
    wait_loading(driver);

    // The month control is zero-based.
    let month_value = (month.month - 1).to_string();
    let month_select = driver.locate_one(MONTH_SELECT)?;
    debug!("select month {month_value}");
    let selected = driver.select_option(month_select, &month_value)?;
    if selected != [month_value.clone()] {
        return Err(DriverError::interact(
            "select month",
            format!("selected {:?}", selected),
        ));
    }
    wait_loading(driver);
    Ok(())
}

enum OverlayPhase {
    Appear,
    Disappear,
}

enum OverlayOutcome {
    Reached,
    Timeout,
    Unexpected,
}

pub fn wait_loading(driver: &mut dyn Driver) {
    wait_loading_with(driver, OVERLAY_TIMEOUT);
}

fn wait_loading_with(driver: &mut dyn Driver, appear_timeout: Duration) {
    match wait_overlay(driver, OverlayPhase::Appear, appear_timeout) {
        OverlayOutcome::Timeout => {
            debug!("loading overlay did not appear; assume settled");
            return;
        }
        OverlayOutcome::Unexpected => return,
        OverlayOutcome::Reached => {}
    }
    thread::sleep(OVERLAY_SETTLE);
    if let OverlayOutcome::Timeout = wait_overlay(driver, OverlayPhase::Disappear, OVERLAY_TIMEOUT)
    {
        debug!("loading overlay did not disappear; assume settled");
        return;
    }
    thread::sleep(OVERLAY_SETTLE);
}

fn wait_overlay(
    driver: &mut dyn Driver,
    phase: OverlayPhase,
    timeout: Duration,
) -> OverlayOutcome {
    let started = Instant::now();
    loop {
        let overlays = match driver.locate_all(LOADING_OVERLAY) {
            Ok(overlays) => overlays,
            Err(err) => {
                warn!("loading overlay query failed: {err}; wait 5s and continue");
                thread::sleep(Duration::from_secs(5));
                return OverlayOutcome::Unexpected;
            }
        };
        if overlays.len() != 2 {
            warn!(
                "unexpected number of loading overlays: {}; wait 5s and continue",
                overlays.len()
            );
            thread::sleep(Duration::from_secs(5));
            return OverlayOutcome::Unexpected;
        }
        let style = driver
            .read_attribute(overlays[1], "style")
            .ok()
            .flatten()
            .unwrap_or_default();
        let visible = style.contains("display: block");
        match phase {
            OverlayPhase::Appear if visible => return OverlayOutcome::Reached,
            OverlayPhase::Disappear if !visible => return OverlayOutcome::Reached,
            _ => {}
        }
        if started.elapsed() >= timeout {
            debug!("loading overlay wait timed out");
            return OverlayOutcome::Timeout;
        }
        thread::sleep(OVERLAY_POLL);
    }
}

/// Live implementation of the per-week contract over the browser driver.
pub struct MaSession<'d> {
    driver: &'d mut dyn Driver,
}

impl<'d> MaSession<'d> {
    pub fn new(driver: &'d mut dyn Driver) -> Self {
        MaSession { driver }
    }

    fn hours_cell_selector(project_row: usize, day: usize) -> String {
        // Day columns start at td 7 within a data row.
        format!(
            r#"tbody[id="workResultView:items_data"] tr:nth-child({}) td:nth-child({})"#,
            project_row + 1,
            day + 7
        )
    }

    fn attendance_row_cells(&mut self) -> Result<Vec<String>, DriverError> {
        let selector = format!("{ATTENDANCE_TABLE} tr:nth-child(1) td");
        let cells = self.driver.locate_all(&selector)?;
        if cells.len() != 8 {
            return Err(DriverError::locate(
                &selector,
                format!("expected 8 cells (label + 月..日), found {}", cells.len()),
            ));
        }
        let mut texts = Vec::with_capacity(7);
        for cell in cells.into_iter().skip(1) {
            texts.push(self.driver.read_text(cell)?.trim().to_string());
        }
        Ok(texts)
    }
}

impl WeekSession for MaSession<'_> {
    fn week_rows(&mut self) -> Result<usize, DriverError> {
        Ok(self.driver.locate_all(CALENDAR_ROWS)?.len())
    }

    fn select_week(&mut self, row: usize) -> Result<bool, DriverError> {
        let selector = format!("{CALENDAR_ROWS}:nth-child({}) td", row + 1);
        let cells = self.driver.locate_all(&selector)?;
        for cell in cells {
            let text = self.driver.read_text(cell)?;
            let text = text.replace('\u{a0}', " ");
            let day = text.trim();
            if day.is_empty() {
                continue;
            }
            info!("select week: calendar row {}, day {day}", row + 1);
            self.driver.click(cell)?;
            wait_loading(self.driver);
            return Ok(true);
        }
        Ok(false)
    }

    fn attendance_table(&mut self) -> Result<Table, DriverError> {
        let widget = self.driver.locate_one(ATTENDANCE_TABLE)?;
        let html = self.driver.read_html(widget)?;
        Ok(markup::parse_attendance(&html))
    }

    fn hours_table(&mut self) -> Result<HoursTable, DriverError> {
        let widget = self.driver.locate_one(HOURS_WIDGET)?;
        let html = self.driver.read_html(widget)?;
        Ok(markup::parse_hours(&html))
    }

    fn week_dates(&mut self) -> Result<Vec<String>, DriverError> {
        self.attendance_row_cells()
    }

    fn project_rows(&mut self) -> Result<Vec<String>, DriverError> {
        let selector = format!("{HOURS_DATA_ROWS} td:nth-child(4)");
        let cells = self.driver.locate_all(&selector)?;
        let mut ids = Vec::with_capacity(cells.len());
        for cell in cells {
            ids.push(self.driver.read_text(cell)?.trim().to_string());
        }
        Ok(ids)
    }

    fn cell_text(&mut self, project_row: usize, day: usize) -> Result<String, DriverError> {
        let cell = self
            .driver
            .locate_one(&Self::hours_cell_selector(project_row, day))?;
        Ok(self.driver.read_text(cell)?.trim().to_string())
    }

    fn set_cell(
        &mut self,
        project_row: usize,
        day: usize,
        text: &str,
    ) -> Result<(), DriverError> {
        let cell = self
            .driver
            .locate_one(&Self::hours_cell_selector(project_row, day))?;
        self.driver.click(cell)?;
        self.driver.type_text(text)?;
        // Commit by clicking outside the editor; the grid sends the value
        // on focus loss.
        let commit_anchor = format!("{ATTENDANCE_TABLE} tr:nth-child(1) td:nth-child(1)");
        let anchor = self.driver.locate_one(&commit_anchor)?;
        self.driver.click(anchor)?;
        wait_loading_with(self.driver, CELL_COMMIT_APPEAR_TIMEOUT);
        Ok(())
    }

    fn save_week(&mut self) -> Result<(), DriverError> {
        let button = self.driver.locate_one(SAVE_BUTTON)?;
        self.driver.click(button)?;
        wait_loading(self.driver);
        Ok(())
    }

    fn import_attendance(&mut self) -> Result<(), DriverError> {
        let button = self.driver.locate_one(IMPORT_BUTTON)?;
        self.driver.click(button)?;
        wait_loading(self.driver);
        Ok(())
    }
}
