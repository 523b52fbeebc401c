//! Request and response bodies of the HTTP API

pub mod booking;
pub mod slot;

/// Serialize an `Option<Option<T>>` value.
/// Used for relations that may or may not have been loaded.
pub fn ser_includes<S, T>(
	value: &Option<Option<T>>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: serde::Serializer,
	T: serde::Serialize,
{
	match value {
		None => serializer.serialize_none(),
		Some(None) => serializer.serialize_some(&None::<T>),
		Some(Some(v)) => v.serialize(serializer),
	}
}
