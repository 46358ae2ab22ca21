#[tokio::main]
async fn main() {
    if let Err(e) = netsuite_proxy_lib::run().await {
        netsuite_proxy_lib::modules::logger::log_error(&format!("Proxy service failed: {}", e));
        std::process::exit(1);
    }
}
