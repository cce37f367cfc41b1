use std::process;

use clap::Parser;
use ollie::commands::ask::{self, AskArgs};

#[derive(Debug, Parser)]
#[command(
    name = "ochat",
    about = "Send a prompt to the local model",
    disable_version_flag = true
)]
struct Cli {
    #[command(flatten)]
    ask: AskArgs,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = ask::run(cli.ask) {
        eprintln!("{err}");
        process::exit(1);
    }
}
