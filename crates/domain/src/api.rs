//! Backend response shapes.
//!
//! Every WriteFlow endpoint wraps its body as `{ success, data?, error? }`;
//! the request client unwraps that transparently and hands callers the
//! payload. The one shape that survives unwrapping is the bodyless
//! acknowledgement, where `success`/`message` are the payload.

use serde::Deserialize;

/// A bodyless success response, e.g. from `DELETE /posts/{slug}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
pub struct Acknowledgement {
    /// Whether the operation succeeded.
    #[serde(default)]
    pub success: bool,
    /// Optional human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_acknowledgements_with_and_without_a_message() {
        let ack: Acknowledgement =
            serde_json::from_str(r#"{"success":true,"message":"Post deleted"}"#).unwrap();
        assert!(ack.success);
        assert_eq!(ack.message.as_deref(), Some("Post deleted"));

        let bare: Acknowledgement = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(bare.message, None);
    }
}
