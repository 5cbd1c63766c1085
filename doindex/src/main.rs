use colored::Colorize;
use commands::command_argument_builder;
use doindex::handlers::{exit_code_for, format_summary, handle_run};

mod commands;

#[tokio::main]
async fn main() {
    let _matches = command_argument_builder().get_matches();

    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    match handle_run().await {
        Ok(summary) => print!("{}", format_summary(&summary)),
        Err(e) => {
            eprintln!("{} {:#}", "✗".red().bold(), e);
            std::process::exit(exit_code_for(&e));
        }
    }
}

pub const CLAP_STYLING: clap::builder::styling::Styles = clap::builder::styling::Styles::styled()
    .header(clap_cargo::style::HEADER)
    .usage(clap_cargo::style::USAGE)
    .literal(clap_cargo::style::LITERAL)
    .placeholder(clap_cargo::style::PLACEHOLDER)
    .error(clap_cargo::style::ERROR)
    .valid(clap_cargo::style::VALID)
    .invalid(clap_cargo::style::INVALID);
