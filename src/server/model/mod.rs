use serde::Deserialize;

pub(crate) mod bill;
pub(crate) mod config;
pub(crate) mod inventory;
pub(crate) mod payment;
pub(crate) mod pickup;
pub(crate) mod report;
pub(crate) mod session;

/// Paging for the history endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommonRequestParams {
    pub page: Option<u8>,
    pub page_size: Option<u8>,
}

impl CommonRequestParams {
    pub const DEFAULT_PAGE_SIZE: u8 = 10;

    /// (offset, limit) to pass to the store
    pub fn window(&self) -> (i64, i64) {
        let page_size = self.page_size.unwrap_or(Self::DEFAULT_PAGE_SIZE).max(1) as i64;
        (self.page.unwrap_or(0) as i64 * page_size, page_size)
    }
}

/// Plain `{success, message}` acknowledgement.
#[derive(Debug, serde::Serialize)]
pub(crate) struct AckResponse {
    pub success: bool,
    pub message: String,
}

impl AckResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
