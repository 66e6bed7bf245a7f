use anyhow::Context;
use clap::Parser;
use payoff::api::{Cli, Command, execute_run, run_http_server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve { port } => run_http_server(port)
            .await
            .with_context(|| format!("server on port {port} failed")),
        Command::Run(args) => {
            let output = execute_run(&args)
                .with_context(|| format!("could not simulate {}", args.input.display()))?;
            println!("{output}");
            Ok(())
        }
    }
}
