use anyhow::Result;
use console::style;

use lifeguard::clients::PoolApiClient;

/// Check that the product service answers, printing what it reports
pub async fn execute(client: &PoolApiClient) -> Result<()> {
    match client.health().await {
        Ok(status) => {
            println!(
                "{} {}",
                style("Product service is up:").bold().green(),
                client.base_url()
            );
            println!("{}", serde_json::to_string_pretty(&status)?);
            Ok(())
        }
        Err(e) => {
            println!(
                "{} {}",
                style("Product service is unreachable:").bold().red(),
                client.base_url()
            );
            Err(e.into())
        }
    }
}
