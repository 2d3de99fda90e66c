use clap::Parser;
use miette::Result;
use vcat::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    // This is standard practice for CLI tools that output to stdout.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Years => vcat::cli::commands::years::run(&global),
        Commands::Makes(args) => vcat::cli::commands::makes::run(args, &global),
        Commands::Models(args) => vcat::cli::commands::models::run(args, &global),
        Commands::Trims(args) => vcat::cli::commands::trims::run(args, &global),
        Commands::Engines => vcat::cli::commands::engines::run(&global),
        Commands::Load(args) => vcat::cli::commands::load::run(args, &global),
        Commands::Clear => vcat::cli::commands::clear::run(&global),
        Commands::Reload => vcat::cli::commands::reload::run(&global),
        Commands::Status => vcat::cli::commands::status::run(&global),
    }
}
