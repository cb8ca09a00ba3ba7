//! Walk through the docgate HTTP API against a local dev-mode server
//!
//! Start the server with `DEV_MODE=1` first, then:
//!
//! ```text
//! cargo run -p docgate-server --example api_client -- path/to/report.pdf
//! ```

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};

const SERVER_URL: &str = "http://localhost:8000";
const WALLET: &str = "demo-wallet";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Health check
    println!("1. Health Check:");
    let resp = client.get(format!("{SERVER_URL}/health")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 2: Payment reference
    println!("2. Create Payment:");
    let resp = client
        .post(format!("{SERVER_URL}/create_payment"))
        .json(&json!({
            "wallet_address": WALLET,
            "rental_hours": 2,
            "amount": 0.2
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 3: Dev-mode token
    println!("3. Dev Token:");
    let resp = client
        .get(format!("{SERVER_URL}/verify_dev"))
        .query(&[("tx_signature", "dev-ok"), ("wallet_address", WALLET)])
        .send()
        .await?;
    println!("Status: {}", resp.status());
    let body: Value = resp.json().await?;
    let token = body["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("no token in response (is DEV_MODE on?): {body}"))?
        .to_string();
    println!("Token: {token}");
    println!();

    // Example 4: Upload a document
    println!("4. Upload Document:");
    let (file_name, content) = match std::env::args().nth(1) {
        Some(path) => {
            let content = tokio::fs::read(&path).await?;
            let name = std::path::Path::new(&path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload.bin".to_string());
            (name, content)
        }
        None => ("sample.txt".to_string(), b"docgate sample document".to_vec()),
    };
    let form = Form::new().part("file", Part::bytes(content).file_name(file_name));
    let resp = client
        .post(format!("{SERVER_URL}/upload_document"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 5: Upload without a token is rejected
    println!("5. Upload Without Token:");
    let form = Form::new().part("file", Part::bytes(b"x".to_vec()).file_name("x.txt"));
    let resp = client
        .post(format!("{SERVER_URL}/upload_document"))
        .multipart(form)
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);

    Ok(())
}
