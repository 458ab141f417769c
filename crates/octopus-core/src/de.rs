//! Deserialization helpers for Octopus resource models.
//!
//! Octopus sends `null` for unset strings, lists and link maps. Fields that are
//! not modelled as `Option` decode those as their default value.

use serde::{Deserialize, Deserializer};

/// Decode `null` as `T::default()`.
///
/// Pair with `#[serde(default)]` so a missing key is accepted as well:
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// #[serde(rename_all = "PascalCase")]
/// struct Target {
///     #[serde(default, deserialize_with = "octopus_core::de::null_as_default")]
///     uri: String,
/// }
///
/// let target: Target = serde_json::from_str(r#"{"Uri": null}"#).unwrap();
/// assert!(target.uri.is_empty());
/// ```
///
/// # Errors
///
/// Returns the deserializer's error if the value is neither `null` nor a `T`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
