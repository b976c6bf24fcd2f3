#[tokio::main]
async fn main() {
    if let Err(e) = medbook_lib::run().await {
        eprintln!("medbook: {e}");
        std::process::exit(1);
    }
}
