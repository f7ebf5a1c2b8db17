use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Wraps personal data so that `Debug`/`Display` (and therefore `tracing`
/// fields) only ever show a redacted form. Serialization is unaffected: API
/// responses still carry the real value.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Masked<T>(pub T);

impl<T: AsRef<str>> Masked<T> {
    /// `jane.doe@example.com` -> `j***@example.com`
    fn redacted(&self) -> String {
        let value = self.0.as_ref();
        match value.split_once('@') {
            Some((local, domain)) => {
                let head: String = local.chars().take(1).collect();
                format!("{}***@{}", head, domain)
            }
            None => "********".to_string(),
        }
    }
}

impl<T: AsRef<str>> fmt::Debug for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: AsRef<str>> fmt::Display for Masked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T: Serialize> Serialize for Masked<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<T> Masked<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}
