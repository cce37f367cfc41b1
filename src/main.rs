use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use ollie::commands::ask::{self, AskArgs};
use ollie::commands::config::{self, ConfigArgs};
use ollie::commands::demo::{self, DemoArgs};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  ollie ask --preset greeting \"Hello!\"\n  echo \"What's the weather in Tokyo?\" | ollie ask --preset weather\n  ollie demo --all\n  ollie config check\n  ollie completion bash > ~/.local/share/bash-completion/completions/ollie";

const ASK_HELP_EXAMPLES: &str = "Examples:\n  ollie ask --preset greeting \"Hello!\"\n  ollie ask --model qwen3:4b --system \"Answer in one word.\" \"Capital of France?\"\n  ollie ask --preset refund --dry-run --json \"Return order #12345\"";

#[derive(Debug, Parser)]
#[command(
    name = "ollie",
    about = "Local Ollama chat CLI with storefront assistant presets",
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Send a prompt to the local model", after_help = ASK_HELP_EXAMPLES)]
    Ask(AskArgs),
    #[command(about = "Run the scripted preset walkthrough")]
    Demo(DemoArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "ollie", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "ollie", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "ollie", &mut io::stdout()),
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask(args) => ask::run(args),
        Commands::Demo(args) => demo::run(args),
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}
