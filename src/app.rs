use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use log::info;

use crate::chrome::ChromeDriver;
use crate::config::RunConfig;
use crate::cookies::CookieError;
use crate::driver::DriverError;
use crate::extract::StructuralError;
use crate::ma::{self, MaError, MaSession};
use crate::schema::{self, ValidationError};
use crate::walker::{self, WalkError};

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Structural(StructuralError),
    Driver(DriverError),
    Cookie(CookieError),
    Render(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(err) => write!(f, "{}", err),
            AppError::Structural(err) => write!(f, "{}", err),
            AppError::Driver(err) => write!(f, "{}", err),
            AppError::Cookie(err) => write!(f, "{}", err),
            AppError::Render(err) => write!(f, "unable to render document: {}", err),
            AppError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            AppError::Validation(err) => Some(err),
            AppError::Structural(err) => Some(err),
            AppError::Driver(err) => Some(err),
            AppError::Cookie(err) => Some(err),
            AppError::Render(err) => Some(err),
            AppError::Io(err) => Some(err),
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(value: ValidationError) -> Self {
        AppError::Validation(value)
    }
}

impl From<StructuralError> for AppError {
    fn from(value: StructuralError) -> Self {
        AppError::Structural(value)
    }
}

impl From<DriverError> for AppError {
    fn from(value: DriverError) -> Self {
        AppError::Driver(value)
    }
}

impl From<CookieError> for AppError {
    fn from(value: CookieError) -> Self {
        AppError::Cookie(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::Io(value)
    }
}

impl From<WalkError> for AppError {
    fn from(value: WalkError) -> Self {
        match value {
            WalkError::Driver(err) => AppError::Driver(err),
            WalkError::Structural(err) => AppError::Structural(err),
        }
    }
}

impl From<MaError> for AppError {
    fn from(value: MaError) -> Self {
        match value {
            MaError::Driver(err) => AppError::Driver(err),
            MaError::Cookie(err) => AppError::Cookie(err),
        }
    }
}

/// `get`: scrape the configured month and write the document file. The file
/// is written only after the whole month extracted successfully.
pub fn run_get(config: &RunConfig, out: &Path) -> Result<(), AppError> {
    let mut driver = ChromeDriver::launch(config.headless, config.ignore_https)?;
    ma::login(&mut driver, config)?;
    if config.cookie_save.is_some() {
        info!("cookie save done");
        return Ok(());
    }
    ma::select_year_month(&mut driver, config.month)?;

    let mut session = MaSession::new(&mut driver);
    let document = walker::collect_month(&mut session)?;

    let rendered = document.render().map_err(AppError::Render)?;
    fs::write(out, rendered)?;
    info!(
        "wrote {} work days and {} projects to {}",
        document.works.len(),
        document.projects.len(),
        out.display()
    );
    Ok(())
}

/// `put`: load and validate the document first, then write differing cells
/// back onto the live grid.
pub fn run_put(config: &RunConfig, input: &Path) -> Result<(), AppError> {
    let document = schema::load(input)?;

    let mut driver = ChromeDriver::launch(config.headless, config.ignore_https)?;
    ma::login(&mut driver, config)?;
    if config.cookie_save.is_some() {
        info!("cookie save done");
        return Ok(());
    }
    ma::select_year_month(&mut driver, config.month)?;

    let mut session = MaSession::new(&mut driver);
    let summary = walker::apply_month(&mut session, &document)?;
    info!(
        "applied {} cell edits; saved {} weeks",
        summary.edits, summary.saved_weeks
    );
    Ok(())
}

/// `import-kinmu`: run the grid's attendance import and save on every week.
pub fn run_import_kinmu(config: &RunConfig) -> Result<(), AppError> {
    let mut driver = ChromeDriver::launch(config.headless, config.ignore_https)?;
    ma::login(&mut driver, config)?;
    if config.cookie_save.is_some() {
        info!("cookie save done");
        return Ok(());
    }
    ma::select_year_month(&mut driver, config.month)?;

    let mut session = MaSession::new(&mut driver);
    let weeks = walker::import_month(&mut session)?;
    info!("imported attendance for {weeks} weeks");
    Ok(())
}
