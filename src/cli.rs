use std::path::PathBuf;
use std::str::FromStr;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::Month;

fn cli_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::BrightCyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightGreen.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::BrightMagenta.on_default())
}

#[derive(Debug, Parser)]
#[command(name = "kousu")]
#[command(bin_name = "kousu")]
#[command(version)]
#[command(about = "Read and write MA-EYES (web) timesheet work records")]
#[command(styles = cli_styles())]
pub struct Cli {
    #[arg(
        long,
        env = "KOUSU_MA_URL",
        value_name = "url",
        help = "MA-EYES login page URL."
    )]
    pub ma_url: String,

    #[arg(
        long,
        env = "KOUSU_MA_USER",
        value_name = "user",
        help = "MA-EYES user code."
    )]
    pub ma_user: String,

    #[arg(
        long,
        env = "KOUSU_MA_PASS",
        value_name = "pass",
        help = "MA-EYES password."
    )]
    pub ma_pass: String,

    #[arg(
        long,
        env = "KOUSU_MONTH",
        value_name = "yyyy-mm",
        value_parser = Month::from_str,
        default_value_t = Month::previous(),
        help = "Month to process (defaults to the previous month)."
    )]
    pub month: Month,

    #[arg(long, help = "Ignore HTTPS certificate errors.")]
    pub ignore_https: bool,

    #[arg(long, help = "Run the browser without a visible window.")]
    pub headless: bool,

    #[arg(
        long = "cookie-load",
        value_name = "path",
        conflicts_with = "cookie_save",
        help = "Import cookies from this file instead of logging in."
    )]
    pub cookie_load: Option<PathBuf>,

    #[arg(
        long = "cookie-save",
        value_name = "path",
        help = "Log in, write the session cookies to this file, and exit."
    )]
    pub cookie_save: Option<PathBuf>,

    #[arg(short, long, conflicts_with = "verbose", help = "Only log errors.")]
    pub quiet: bool,

    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Print verbose output; -vv to print debug output."
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Log in to MA-EYES and fetch the month's work records.")]
    Get(GetArgs),
    #[command(about = "Log in to MA-EYES and write a file's work records onto the grid.")]
    Put(PutArgs),
    #[command(about = "Log in to MA-EYES and run the attendance import plus save for every week.")]
    ImportKinmu,
}

#[derive(Debug, Args)]
#[command(about = "Fetch work records.")]
pub struct GetArgs {
    #[arg(value_name = "file", help = "Output JSON path.")]
    pub file: PathBuf,

    #[arg(
        long = "out-csv",
        value_name = "path",
        env = "KOUSU_OUT_CSV",
        hide = true,
        value_parser = removed_out_csv
    )]
    pub out_csv: Option<String>,

    #[arg(
        long = "out-json",
        value_name = "path",
        env = "KOUSU_OUT_JSON",
        hide = true,
        value_parser = removed_out_json
    )]
    pub out_json: Option<String>,
}

#[derive(Debug, Args)]
#[command(about = "Write work records.")]
pub struct PutArgs {
    #[arg(value_name = "file", help = "Input JSON path.")]
    pub file: PathBuf,

    #[arg(
        long = "in-csv",
        value_name = "path",
        env = "KOUSU_IN_CSV",
        hide = true,
        value_parser = removed_in_csv
    )]
    pub in_csv: Option<String>,

    #[arg(
        long = "in-json",
        value_name = "path",
        env = "KOUSU_IN_JSON",
        hide = true,
        value_parser = removed_in_json
    )]
    pub in_json: Option<String>,
}

fn removed_out_csv(_: &str) -> Result<String, String> {
    Err(
        "--out-csv (KOUSU_OUT_CSV) was removed in 0.2.0; JSON is the only output format"
            .to_string(),
    )
}

fn removed_out_json(_: &str) -> Result<String, String> {
    Err(
        "--out-json (KOUSU_OUT_JSON) was removed in 0.3.0; pass the output path as the \
         positional argument: kousu get <file>"
            .to_string(),
    )
}

fn removed_in_csv(_: &str) -> Result<String, String> {
    Err("--in-csv (KOUSU_IN_CSV) was removed in 0.2.0; JSON is the only input format".to_string())
}

fn removed_in_json(_: &str) -> Result<String, String> {
    Err(
        "--in-json (KOUSU_IN_JSON) was removed in 0.3.0; pass the input path as the \
         positional argument: kousu put <file>"
            .to_string(),
    )
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
