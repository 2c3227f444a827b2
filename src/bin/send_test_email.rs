//! Post a sample message to a running service
//!
//! Run with: cargo run --bin send_test_email

use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let url = std::env::var("MAIL_FAILOVER_URL")
        .unwrap_or_else(|_| "http://localhost:8000/email".to_string());

    let payload = json!({
        "to": "fake@example.com",
        "to_name": "Ms. Fake",
        "from": "noreply@example.com",
        "from_name": "Example",
        "subject": "A message from Example.",
        "body": "<h1>Your billing amount:</h1><p>$10</p>"
    });

    println!("Posting sample message to {}", url);

    let response = reqwest::Client::new().post(&url).json(&payload).send().await?;
    let status = response.status();
    let body = response.text().await?;

    println!("Status: {}", status);
    println!("{}", body);

    Ok(())
}
