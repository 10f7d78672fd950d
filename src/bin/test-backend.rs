//! Demo upstream for trying the proxy by hand.
//!
//! Serves `/hello` with a body the sample rewrite rules act on:
//!
//! ```text
//! cargo run --bin test-backend &
//! cargo run -- --config proxy.example.toml
//! curl localhost:8080/hello
//! ```

use std::net::SocketAddr;

use axum::{routing::get, Router};
use clap::Parser;

const HELLO_BODY: &str = "a b c d e f g -pq-pxxq-\n";

#[derive(Parser)]
#[command(name = "test-backend")]
#[command(about = "Tiny upstream used to exercise rewrite-proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:9595")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let app = Router::new()
        .route("/hello", get(|| async { HELLO_BODY }))
        .route("/status", get(|| async { "Backend is healthy" }));

    let listener = tokio::net::TcpListener::bind(cli.addr).await?;
    println!("test backend listening on http://{}", cli.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
