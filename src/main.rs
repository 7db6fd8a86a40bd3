use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use parley::commands::ask::{self, AskArgs};
use parley::commands::config::{self, ConfigArgs};
use parley::commands::run::{self, RunArgs};
use parley::commands::scenarios;
use parley::web::{self, ServeArgs};

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  parley ask --provider local-inference \"2+2?\"\n  echo \"2+2?\" | parley ask --provider openai\n  parley run travel --rounds 3\n  LLM_PROVIDER=alternate-hosted parley serve --addr 127.0.0.1:8000\n  parley completion bash > ~/.local/share/bash-completion/completions/parley";

const ASK_HELP_EXAMPLES: &str = "Examples:\n  parley ask --provider local-inference \"2+2?\"\n  echo \"2+2?\" | parley ask --provider openai\n  parley ask --provider alternate-hosted --dry-run --json \"Explain retries\"";

const RUN_HELP_EXAMPLES: &str = "Examples:\n  parley run research --topic 1\n  parley run travel --provider local-inference --rounds 3\n  parley run codegen --workspace /tmp/parley-demo --dry-run";

#[derive(Debug, Parser)]
#[command(
    name = "parley",
    about = "Agent-persona conversation demos over interchangeable LLM providers",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("PARLEY_GIT_SHA"), ")"),
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Ask a single question to an LLM provider", after_help = ASK_HELP_EXAMPLES)]
    Ask(AskArgs),
    #[command(about = "Run a built-in conversation scenario", after_help = RUN_HELP_EXAMPLES)]
    Run(RunArgs),
    #[command(about = "List the built-in scenarios")]
    Scenarios,
    #[command(about = "Serve the demo web API")]
    Serve(ServeArgs),
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
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "parley", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "parley", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "parley", &mut io::stdout()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ask(args) => ask::run(args).await,
        Commands::Run(args) => run::run(args).await,
        Commands::Scenarios => scenarios::run(),
        Commands::Serve(args) => web::run(args).await,
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
