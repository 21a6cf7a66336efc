use thiserror::Error;

#[derive(Error, Debug)]
pub enum CarrierError {
    #[error("Carrier API unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Carrier API returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to parse carrier response: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Tracking data I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tracking data is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),
}

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
}
