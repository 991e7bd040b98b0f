//! Project record model.
//!
//! Only the fields the secret layer and project service touch are typed.
//! Everything else in a project file (assets, train records, ...) rides along
//! in the flattened `extra` maps so a load/save cycle never drops data.

use fott_crypto::Envelope;
use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name of the marker object that wraps an envelope.
pub const ENCRYPTED_FIELD: &str = "encrypted";

/// Connection settings for a storage provider.
///
/// On the wire this is either the options map itself or
/// `{"encrypted": "<envelope>"}`. In memory the two states are distinct
/// variants, so a plaintext map that has an `encrypted` key among others is
/// never mistaken for protected data.
///
/// A plaintext map whose only entry is a string `encrypted` has the marker's
/// wire shape and would read back as protected, so
/// [`protect`](crate::protect) refuses it.
#[derive(Clone, Debug, PartialEq)]
pub enum ProviderOptions {
    Plaintext(Map<String, Value>),
    Protected(Envelope),
}

impl ProviderOptions {
    /// Classifies a raw options object.
    ///
    /// Protected when the object has exactly one key, `encrypted`, holding a
    /// string. The string is not validated here; a corrupt envelope fails on
    /// reveal.
    pub fn from_map(map: Map<String, Value>) -> Self {
        match marker_envelope(&map) {
            Some(text) => Self::Protected(Envelope::from(text)),
            None => Self::Plaintext(map),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected(_))
    }

    /// Looks up a plaintext option. Always `None` while protected.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Plaintext(map) => map.get(name),
            Self::Protected(_) => None,
        }
    }

    /// Convenience for string-valued options such as `sas`.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }
}

/// The envelope text of a `{"encrypted": "<string>"}` object.
pub(crate) fn marker_envelope(map: &Map<String, Value>) -> Option<&str> {
    if map.len() != 1 {
        return None;
    }
    map.get(ENCRYPTED_FIELD).and_then(Value::as_str)
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ProviderOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Plaintext(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Serialize)]
struct EncryptedMarker<'a> {
    encrypted: &'a Envelope,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EncryptedMarkerOwned {
    encrypted: Envelope,
}

impl Serialize for ProviderOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Plaintext(map) => map.serialize(serializer),
            Self::Protected(envelope) => EncryptedMarker { encrypted: envelope }.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ProviderOptions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_map(map))
    }
}

/// A single secret string, such as the prediction API key.
///
/// Serialized as a bare JSON string or as `{"encrypted": "<envelope>"}`.
#[derive(Clone, Debug, PartialEq)]
pub enum SecureString {
    Plain(String),
    Protected(Envelope),
}

impl SecureString {
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected(_))
    }

    pub fn as_plain(&self) -> Option<&str> {
        match self {
            Self::Plain(text) => Some(text),
            Self::Protected(_) => None,
        }
    }
}

impl From<&str> for SecureString {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl Serialize for SecureString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Plain(text) => serializer.serialize_str(text),
            Self::Protected(envelope) => EncryptedMarker { encrypted: envelope }.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SecureString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(text) => Ok(Self::Plain(text)),
            value @ Value::Object(_) => {
                let marker: EncryptedMarkerOwned =
                    serde_json::from_value(value).map_err(de::Error::custom)?;
                Ok(Self::Protected(marker.encrypted))
            }
            other => Err(de::Error::custom(format!(
                "expected a string or an encrypted marker, got {other}"
            ))),
        }
    }
}

/// Storage connection a project lives in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub provider_type: String,
    #[serde(default)]
    pub provider_options: Option<ProviderOptions>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A labeling project as persisted in a `.fott` file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub version: String,
    /// Name of the security token in application settings.
    #[serde(default)]
    pub security_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<Value>,
    pub source_connection: Connection,
    #[serde(default)]
    pub api_uri_base: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<SecureString>,
    #[serde(default)]
    pub folder_path: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Whether any sensitive field is currently in protected form.
    pub fn has_protected_fields(&self) -> bool {
        let options = self
            .source_connection
            .provider_options
            .as_ref()
            .is_some_and(ProviderOptions::is_protected);
        let api_key = self.api_key.as_ref().is_some_and(SecureString::is_protected);
        options || api_key
    }
}
