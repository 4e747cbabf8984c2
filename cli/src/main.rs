use clap::Parser;
use netlog_cli::{Args, Shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    match netlog_cli::run(args).await? {
        Shutdown::Completed => Ok(()),
        // A pending stdin read would otherwise hold the runtime open.
        Shutdown::Interrupted => std::process::exit(130),
    }
}
