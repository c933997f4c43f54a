use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use time::OffsetDateTime;

use crate::cli::Cli;

/// A calendar month in the `yyyy-mm` form the CLI takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Month {
    pub year: i32,
    pub month: u8,
}

impl Month {
    /// The previous calendar month: the usual fill-in-last-month workflow.
    pub fn previous() -> Month {
        let today = OffsetDateTime::now_utc().date();
        let month = u8::from(today.month());
        if month == 1 {
            Month {
                year: today.year() - 1,
                month: 12,
            }
        } else {
            Month {
                year: today.year(),
                month: month - 1,
            }
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let error = || ParseMonthError {
            value: value.to_string(),
        };
        let (year, month) = value.split_once('-').ok_or_else(error)?;
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(error());
        }
        if month.len() != 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
            return Err(error());
        }
        let year: i32 = year.parse().map_err(|_| error())?;
        let month: u8 = month.parse().map_err(|_| error())?;
        if !(1..=12).contains(&month) {
            return Err(error());
        }
        Ok(Month { year, month })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMonthError {
    value: String,
}

impl fmt::Display for ParseMonthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "month must be yyyy-mm (given: {})", self.value)
    }
}

impl Error for ParseMonthError {}

/// Everything the run needs, fixed at startup. Built once from the parsed
/// CLI and passed by reference; nothing reads option state ambiently.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub ma_url: String,
    pub ma_user: String,
    pub ma_pass: String,
    pub month: Month,
    pub ignore_https: bool,
    pub headless: bool,
    pub cookie_load: Option<PathBuf>,
    pub cookie_save: Option<PathBuf>,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> RunConfig {
        RunConfig {
            ma_url: cli.ma_url.clone(),
            ma_user: cli.ma_user.clone(),
            ma_pass: cli.ma_pass.clone(),
            month: cli.month,
            ignore_https: cli.ignore_https,
            headless: cli.headless,
            cookie_load: cli.cookie_load.clone(),
            cookie_save: cli.cookie_save.clone(),
        }
    }
}
