use tokio::net::TcpListener;

use mock_broker::BrokerState;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), std::io::Error> {
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    println!("mock broker listening on {addr}");
    mock_broker::run(listener, BrokerState::new()).await
}
