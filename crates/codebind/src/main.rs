use clap::Parser;

fn main() -> anyhow::Result<()> {
    let cli = codebind::cli::Cli::parse();
    codebind::init(cli.verbose);
    codebind::cli::run(cli)
}
