use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::domain::Resource;

/// List response body. The server nests the items under `data.<collection>`,
/// but bare arrays and `{"data": [...]}` are accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListBody<T> {
    Bare(Vec<T>),
    Enveloped { data: ListData<T> },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ListData<T> {
    Bare(Vec<T>),
    Keyed(BTreeMap<String, Value>),
}

impl<T: DeserializeOwned> ListBody<T> {
    pub fn into_items(self, collection_key: &str) -> Result<Vec<T>, serde_json::Error> {
        match self {
            ListBody::Bare(items) | ListBody::Enveloped {
                data: ListData::Bare(items),
            } => Ok(items),
            ListBody::Enveloped {
                data: ListData::Keyed(mut map),
            } => match map.remove(collection_key) {
                Some(items) => serde_json::from_value(items),
                None => Err(serde::de::Error::custom(format!(
                    "response data has no `{collection_key}` collection"
                ))),
            },
        }
    }
}

/// Create/update response body. Some endpoints answer with only a message,
/// which still counts as success.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordBody {
    Enveloped { data: Resource },
    Bare(Resource),
    Other(Value),
}

impl RecordBody {
    pub fn into_record(self) -> Option<Resource> {
        match self {
            RecordBody::Enveloped { data } | RecordBody::Bare(data) => Some(data),
            RecordBody::Other(_) => None,
        }
    }
}
