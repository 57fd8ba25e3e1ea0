#[tokio::main]
async fn main() {
    offers_backend::run().await;
}
