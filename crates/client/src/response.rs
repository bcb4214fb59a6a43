//! Response envelope of the CURA API.
//!
//! Every body is `{"status":"ok","data":...}` or
//! `{"status":"error","code":...,"message":...}`. Anything else fails to
//! decode; payloads are never passed on untyped.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ServiceResponse<T> {
    Ok { data: T },
    Error { code: String, message: String },
}

impl<T> ServiceResponse<T> {
    pub fn ok(data: T) -> Self {
        ServiceResponse::Ok { data }
    }

    pub fn into_result(self) -> ServiceResult<T> {
        match self {
            ServiceResponse::Ok { data } => Ok(data),
            ServiceResponse::Error { code, message } => {
                Err(ServiceError::Rejected { code, message })
            }
        }
    }
}

/// Decode and unwrap an envelope.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> ServiceResult<T> {
    serde_json::from_slice::<ServiceResponse<T>>(body)?.into_result()
}
