use std::fmt;
use std::ops::Deref;

use serde::de::DeserializeOwned;
use tracing::warn;

/// Conversion from a response body's text into the caller's requested type.
///
/// Every [`DeserializeOwned`] type is parsed as JSON. [`Opaque`] skips parsing
/// and keeps the text unchanged. Returning `None` means the body could not be
/// represented as `Self`; the pipeline does not treat that as a failure.
pub trait FromBody: Sized {
    fn from_body(raw: &str) -> Option<Self>;
}

impl<T: DeserializeOwned> FromBody for T {
    fn from_body(raw: &str) -> Option<Self> {
        serde_json::from_str(raw)
            .inspect_err(|e| {
                warn!(
                    error = %e,
                    target_type = std::any::type_name::<T>(),
                    "response body did not deserialize; leaving body empty"
                );
            })
            .ok()
    }
}

/// Passthrough body: the raw response text, never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Opaque(pub String);

impl Opaque {
    pub fn into_inner(self) -> String { self.0 }
}

impl FromBody for Opaque {
    fn from_body(raw: &str) -> Option<Self> { Some(Opaque(raw.to_owned())) }
}

impl Deref for Opaque {
    type Target = str;

    fn deref(&self) -> &str { &self.0 }
}

impl fmt::Display for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Decode body bytes as UTF-8 text, replacing invalid sequences.
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
