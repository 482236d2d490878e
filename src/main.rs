#[tokio::main]
async fn main() {
    blog_server::start_server().await;
}
