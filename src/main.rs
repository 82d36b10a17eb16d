use clap::Parser;
use costsim::cli::commands::{
    catalog, completions, config, export, import, init, load, mat, op, set, show,
};
use costsim::cli::{Cli, Commands};
use miette::Result;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
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
    costsim::init_tracing(global.verbose);

    match cli.command {
        Commands::Init(args) => init::run(args),
        Commands::Show(args) => show::run(args, &global),
        Commands::Set(cmd) => set::run(cmd, &global),
        Commands::Mat(cmd) => mat::run(cmd, &global),
        Commands::Op(cmd) => op::run(cmd, &global),
        Commands::Export(args) => export::run(args, &global),
        Commands::Import(args) => import::run(args, &global),
        Commands::Load(args) => load::run(args, &global),
        Commands::Catalog(args) => catalog::run(args, &global),
        Commands::Config(cmd) => config::run(cmd, &global),
        Commands::Completions(args) => completions::run(args),
    }
}
