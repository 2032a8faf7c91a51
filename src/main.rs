use book_catalog::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("book-catalog".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber)?;

    book_catalog::run().await
}
