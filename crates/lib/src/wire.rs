//! Serde helpers shared by the webhook and bot reply wire types.

use serde::{Deserialize, Deserializer};

/// Decode an explicit JSON `null` the same way as a missing key: the field's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
