use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Query parameter names shared by every step of the flow.
pub mod keys {
    pub const PICK: &str = "pick";
    pub const PICK_REF: &str = "pickRef";
    pub const DROP: &str = "drop";
    pub const DROP_REF: &str = "dropRef";
    pub const MAKE: &str = "make";
    pub const MODEL: &str = "model";
    pub const AGE: &str = "age";
    pub const DRIVE: &str = "drive";
    pub const AUCTION: &str = "auction";
    pub const SALVAGE: &str = "salvage";
    pub const CAR_LENGTH: &str = "carLength";
    pub const CAR_HEIGHT: &str = "carHeight";
    pub const CAR_CLEARANCE: &str = "carClearance";
    pub const CAR_VALUE: &str = "carValue";

    // Exit page only.
    pub const REASON: &str = "reason";

    // Contact details are validated but never written into a link.
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
}

/// Every key the answer set knows about, in canonical link order.
pub const VOCABULARY: [&str; 14] = [
    keys::PICK,
    keys::PICK_REF,
    keys::DROP,
    keys::DROP_REF,
    keys::MAKE,
    keys::MODEL,
    keys::AGE,
    keys::DRIVE,
    keys::AUCTION,
    keys::SALVAGE,
    keys::CAR_LENGTH,
    keys::CAR_HEIGHT,
    keys::CAR_CLEARANCE,
    keys::CAR_VALUE,
];

pub fn is_known_key(key: &str) -> bool {
    VOCABULARY.contains(&key)
}

/// Field key to string value mapping accumulated while the user walks the flow.
///
/// Values are kept exactly as given. Blank values only survive in answers a
/// caller builds by hand (for example a dimension toggle that is on but not yet
/// filled in); answers produced by [`crate::codec::merge`] or
/// [`crate::codec::from_query`] never contain them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    data: BTreeMap<String, String>,
}

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.insert(key.into(), value.into());
    }

    /// Builder-style [`Answers::set`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// The value for `key` if it is present and not blank.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// True when `key` holds a non-blank answer.
    pub fn has(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    pub fn is(&self, key: &str, expected: &str) -> bool {
        self.get(key) == Some(expected)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys from `required` that do not hold a non-blank answer.
    pub fn missing(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|key| !self.has(key))
            .map(|key| key.to_string())
            .collect()
    }

    /// Raw union of both sets, `other` winning on conflicts. Blank values are
    /// kept so validators can see half-filled inputs.
    pub fn overlay(&self, other: &Answers) -> Answers {
        let mut combined = self.clone();
        for (key, value) in other.iter() {
            combined.set(key, value);
        }
        combined
    }

    /// Only the entries whose key is in `keys`.
    pub fn restricted_to(&self, keys: &[&str]) -> Answers {
        self.iter()
            .filter(|(key, _)| keys.contains(key))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Answers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut answers = Answers::new();
        for (key, value) in iter {
            answers.set(key, value);
        }
        answers
    }
}

impl From<BTreeMap<String, String>> for Answers {
    fn from(data: BTreeMap<String, String>) -> Self {
        Self { data }
    }
}
