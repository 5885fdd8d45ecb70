use super::analysis::LocationHint;

/// A validated request to analyze one trip folder.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub member_id: String,
    pub retrip_id: String,
    pub location: Option<LocationHint>,
}

impl TripRequest {
    /// Key prefix the trip's photos live under.
    pub fn prefix(&self) -> String {
        format!("{}/{}/", self.member_id, self.retrip_id)
    }
}

/// A validated request to analyze images fetched from arbitrary URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteImagesRequest {
    pub urls: Vec<String>,
    pub location: Option<LocationHint>,
}

/// Concrete bucket/prefix a trip resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageScope {
    pub bucket: String,
    pub prefix: String,
}

impl StorageScope {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// `s3://bucket/prefix` form used in log lines and messages.
    pub fn display_url(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix)
    }
}
