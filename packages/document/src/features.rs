//! Feature maps: string-keyed attribute bags on documents and annotations.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;

/// A feature value: null, bool, number, string, array or nested object
pub type FeatureValue = Value;

/// String-keyed feature map with a stable key order
pub type FeatureMap = BTreeMap<String, FeatureValue>;

/// Build a feature map from host key/value pairs.
///
/// Host stores may key features by arbitrary values. Keys are converted to
/// their `Display` form; pairs without a key are dropped.
pub fn features_from_pairs<K, I>(pairs: I) -> FeatureMap
where
    K: Display,
    I: IntoIterator<Item = (Option<K>, FeatureValue)>,
{
    pairs
        .into_iter()
        .filter_map(|(key, value)| key.map(|k| (k.to_string(), value)))
        .collect()
}
