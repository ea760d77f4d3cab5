use serde::{Deserialize, Serialize};

/// A captured complaint recording, ready for multipart upload.
///
/// The recorder flushes all buffered chunks into one of these when capture
/// stops; there is no chunked or streaming upload. A failed submission is
/// retried by resubmitting the same blob (or re-recording).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioBlob {
    pub data: Vec<u8>,
    /// Best-effort media type; `audio/webm` when detection fails.
    pub media_type: String,
    /// Upload filename, e.g. `triage_1704067200000.webm`.
    pub file_name: String,
}

impl AudioBlob {
    pub fn new(data: Vec<u8>, media_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            data,
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_size() {
        let blob = AudioBlob::new(vec![1, 2, 3], "audio/webm", "triage_1.webm");
        assert_eq!(blob.len(), 3);
        assert!(!blob.is_empty());
        assert!(AudioBlob::new(vec![], "audio/webm", "x.webm").is_empty());
    }
}
