//! Response bodies for the Soundshelf API

use bounded_file_store::{StoreStats, UploadReceipt};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub name: String,
    pub size: u64,
    pub evicted: Vec<String>,
}

impl From<UploadReceipt> for UploadResponse {
    fn from(receipt: UploadReceipt) -> Self {
        Self {
            message: format!("File {} uploaded successfully", receipt.name),
            name: receipt.name,
            size: receipt.size,
            evicted: receipt.evicted,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
    pub storage: StoreStats,
}
