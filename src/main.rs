use clap::Parser;
use studyplan_dashboard::cli::{run, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}
