use serde::Deserialize;
use thiserror::Error;

/// ORS error code for "Could not find routable point".
pub const ORS_UNROUTABLE_POINT: u32 = 2010;

// Helper structs to parse the JSON error response from ORS
#[derive(Deserialize, Debug)]
pub struct OrsErrorDetail {
    pub code: u32,
    pub message: String,
}
#[derive(Deserialize, Debug)]
pub struct OrsErrorPayload {
    pub error: OrsErrorDetail,
}

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("A point was not routable on the road network")]
    UnroutablePoint,

    #[error("API Error (Code {code}): {message}")]
    ApiError { code: u32, message: String },

    // Non-success status without the ORS error envelope
    #[error("Unstructured API Error (HTTP {status}): {body}")]
    RawApiError { status: u16, body: String },

    #[error("Underlying request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("No route found in success response")]
    NoRoute,
}

impl RoutingError {
    /// Maps an ORS error payload onto the matching variant.
    pub fn from_payload(payload: OrsErrorPayload) -> Self {
        if payload.error.code == ORS_UNROUTABLE_POINT {
            RoutingError::UnroutablePoint
        } else {
            RoutingError::ApiError {
                code: payload.error.code,
                message: payload.error.message,
            }
        }
    }
}
