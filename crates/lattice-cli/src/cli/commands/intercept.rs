//! One-shot intercept demo request.

use anyhow::Result;
use lattice_core::Config;
use lattice_core::intercept::{InterceptClient, InterceptStatus};

pub async fn run(config: &Config, payload: Option<&str>, base_url: Option<&str>) -> Result<()> {
    let base_url = base_url.unwrap_or(&config.intercept.base_url);
    let payload = payload.unwrap_or(&config.intercept.payload_hex);
    let client = InterceptClient::new(base_url)?;

    println!("{}", InterceptStatus::Sending.text());
    let report = match client.send(payload).await {
        Ok(report) => report,
        Err(err) => {
            let status = err.status_text();
            return Err(anyhow::Error::new(err).context(status));
        }
    };

    println!("{}", InterceptStatus::Success.text());
    println!("Original size:    {} bytes", report.original_size);
    println!("Packed size:      {} bytes", report.packed_size);
    println!("Gas used:         {}", report.gas_used);
    println!("Compression time: {} ms", report.compression_time_text());
    println!("Tx hash:          {}", report.short_hash());
    Ok(())
}
