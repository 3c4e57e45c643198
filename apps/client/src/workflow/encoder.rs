//! Transmission Encoder: turns accepted file bytes into a data URL the
//! service can embed in a JSON body.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::workflow::validator::{CandidateFile, MAX_FILE_BYTES};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("file '{0}' has no readable content")]
    Empty(String),

    #[error("file '{name}' is {size} bytes, above the {limit} byte transmission limit")]
    TooLarge { name: String, size: u64, limit: u64 },
}

/// `data:<media type>;base64,<payload>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Injected so the controller can be exercised with a failing encoder.
pub trait PayloadEncoder: Send + Sync {
    fn encode(&self, file: &CandidateFile) -> Result<EncodedPayload, EncodingError>;
}

/// Upper bound on the encoded length for a file of the given media type.
pub fn max_payload_len(media_type: &str) -> usize {
    let prefix = "data:".len() + media_type.len() + ";base64,".len();
    prefix + (MAX_FILE_BYTES as usize).div_ceil(3) * 4
}

/// Default encoder: standard-alphabet base64 wrapped in a data URL.
#[derive(Debug, Default, Clone, Copy)]
pub struct DataUrlEncoder;

impl PayloadEncoder for DataUrlEncoder {
    fn encode(&self, file: &CandidateFile) -> Result<EncodedPayload, EncodingError> {
        if file.content.is_empty() {
            return Err(EncodingError::Empty(file.name.clone()));
        }
        if file.size() > MAX_FILE_BYTES {
            return Err(EncodingError::TooLarge {
                name: file.name.clone(),
                size: file.size(),
                limit: MAX_FILE_BYTES,
            });
        }

        let media_type = file.essence();
        let mut out = String::with_capacity(max_payload_len(&media_type));
        out.push_str("data:");
        out.push_str(&media_type);
        out.push_str(";base64,");
        STANDARD.encode_string(&file.content, &mut out);
        Ok(EncodedPayload(out))
    }
}
