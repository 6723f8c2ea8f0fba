use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = rotary::cli::Cli::parse();
    if let Err(e) = rotary::cmd::dispatch(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
