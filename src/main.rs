mod app;
mod chrome;
mod cli;
mod config;
mod cookies;
mod document;
mod driver;
mod extract;
mod ma;
mod markup;
mod reconcile;
mod schema;
mod session;
mod walker;

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), app::AppError> {
    use clap::Parser;

    let cli = cli::Cli::parse();
    init_logger(cli.quiet, cli.verbose);

    let config = config::RunConfig::from_cli(&cli);
    match &cli.command {
        cli::Commands::Get(args) => app::run_get(&config, &args.file),
        cli::Commands::Put(args) => app::run_put(&config, &args.file),
        cli::Commands::ImportKinmu => app::run_import_kinmu(&config),
    }
}

fn init_logger(quiet: bool, verbose: u8) {
    let level = if quiet {
        log::LevelFilter::Error
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
