#[tokio::main]
async fn main() {
    if let Err(err) = fin360::cli::run().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}
