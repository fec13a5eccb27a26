use std::time::Duration;

use mongodb::{Client, bson::doc, options::ClientOptions};
use tokio::time::sleep;
use tracing::debug;

use super::error::{MongoDaoError, MongoResult};

/// Database the ping command is sent to; it exists on every deployment.
const PING_DATABASE: &str = "admin";
const CONNECT_ATTEMPTS: u32 = 10;
const FIRST_RETRY_DELAY: Duration = Duration::from_millis(250);
const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

fn retry_delay(attempt: u32) -> Duration {
    FIRST_RETRY_DELAY
        .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        .min(MAX_RETRY_DELAY)
}

/// Round-trip to the server.
pub async fn ping(client: &Client) -> mongodb::error::Result<()> {
    client
        .database(PING_DATABASE)
        .run_command(doc! { "ping": 1 })
        .await
        .map(|_| ())
}

/// Build a client and wait until the deployment answers a ping.
pub async fn establish_connection(options: &ClientOptions) -> MongoResult<Client> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;

    let mut attempt = 1;
    loop {
        match ping(&client).await {
            Ok(()) => return Ok(client),
            Err(source) if attempt >= CONNECT_ATTEMPTS => {
                return Err(MongoDaoError::InitialPing {
                    attempts: attempt,
                    source,
                });
            }
            Err(err) => {
                let delay = retry_delay(attempt);
                debug!(attempt, ?delay, error = %err, "MongoDB not answering yet");
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_doubles_up_to_cap() {
        assert_eq!(retry_delay(1), Duration::from_millis(250));
        assert_eq!(retry_delay(2), Duration::from_millis(500));
        assert_eq!(retry_delay(5), Duration::from_secs(4));
        assert_eq!(retry_delay(6), MAX_RETRY_DELAY);
        assert_eq!(retry_delay(40), MAX_RETRY_DELAY);
    }
}
