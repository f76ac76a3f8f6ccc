use clap::Parser;
use habitual::cli::commands::Cli;
use habitual::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    // dispatch has already reported the error
    if handlers::dispatch(cli).is_err() {
        std::process::exit(1);
    }
}
