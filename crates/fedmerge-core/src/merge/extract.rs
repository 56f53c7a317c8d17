//! Locates the representations array inside a subgraph request body.

use std::fmt;
use std::ops::Range;

use serde::de::{self, DeserializeSeed, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde_json::value::RawValue;

use super::types::ExtractError;

const REPRESENTATIONS_PATH: &[&str] = &["body", "variables", "representations"];

/// Walks a key path through nested JSON objects and borrows the value at its end.
///
/// Only objects are descended into. Any other non-null value on the way is a
/// type error, and `null` anywhere on the path resolves to `None`.
struct ObjectPath<'p> {
    keys: &'p [&'static str],
}

impl<'de> DeserializeSeed<'de> for ObjectPath<'_> {
    type Value = Option<&'de RawValue>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for ObjectPath<'_> {
    type Value = Option<&'de RawValue>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a JSON object with key {:?}", self.keys.first().copied().unwrap_or(""))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let Some((&key, rest)) = self.keys.split_first() else {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            return Ok(None);
        };

        let mut found = None;
        let mut seen = false;
        while let Some(matches) = map.next_key_seed(KeyIs(key))? {
            if !matches {
                map.next_value::<IgnoredAny>()?;
                continue;
            }
            if seen {
                return Err(de::Error::duplicate_field(key));
            }
            seen = true;
            found = if rest.is_empty() {
                map.next_value::<Option<&'de RawValue>>()?
            } else {
                map.next_value_seed(ObjectPath { keys: rest })?
            };
        }
        Ok(found)
    }
}

/// Compares an object key against `self.0` without allocating.
struct KeyIs(&'static str);

impl<'de> DeserializeSeed<'de> for KeyIs {
    type Value = bool;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<bool, D::Error> {
        deserializer.deserialize_str(self)
    }
}

impl<'de> Visitor<'de> for KeyIs {
    type Value = bool;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object key")
    }

    fn visit_str<E: de::Error>(self, key: &str) -> Result<bool, E> {
        Ok(key == self.0)
    }
}

/// Raw, unparsed representations array borrowed from a request body.
#[derive(Debug, Clone)]
pub struct Representations<'a> {
    raw: &'a RawValue,
    span: Range<usize>,
}

impl<'a> Representations<'a> {
    /// Raw bytes of the array, exactly as they appear in the document.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.raw.get().as_bytes()
    }

    /// Byte range of the array inside the source document.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    /// Array elements as raw spans, in array order.
    ///
    /// Fails with [`ExtractError::NotAnArray`] if the value is not a JSON array.
    pub fn elements(&self) -> Result<Vec<&'a RawValue>, ExtractError> {
        let raw: &'a str = self.raw.get();
        serde_json::from_str(raw).map_err(ExtractError::NotAnArray)
    }
}

/// Reads `body.variables.representations` from `document` without parsing it.
///
/// Fields outside the path are skipped. A `null` at the path counts as missing,
/// and an array or scalar where an object is expected is invalid JSON.
pub fn extract_representations(document: &[u8]) -> Result<Representations<'_>, ExtractError> {
    let mut deserializer = serde_json::Deserializer::from_slice(document);
    let raw = ObjectPath {
        keys: REPRESENTATIONS_PATH,
    }
    .deserialize(&mut deserializer)
    .and_then(|raw| deserializer.end().map(|()| raw))
    .map_err(ExtractError::InvalidJson)?
    .ok_or(ExtractError::MissingPath)?;

    // The raw value borrows from `document`, so its offset is a pointer difference.
    let start = (raw.get().as_ptr() as usize)
        .checked_sub(document.as_ptr() as usize)
        .ok_or(ExtractError::MissingPath)?;
    let span = start..start + raw.get().len();

    Ok(Representations { raw, span })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_raw_array_and_span() {
        let doc = br#"{"body":{"query":"q","variables":{"representations":[{"id":"1"}]}}}"#;
        let reps = extract_representations(doc).unwrap();

        assert_eq!(reps.as_bytes(), br#"[{"id":"1"}]"#);
        assert_eq!(&doc[reps.span()], reps.as_bytes());
    }

    #[test]
    fn test_span_excludes_surrounding_whitespace() {
        let doc = br#"{ "body" : { "variables" : { "representations" :  [ {"id": "1"} ]  } } }"#;
        let reps = extract_representations(doc).unwrap();

        assert_eq!(reps.as_bytes(), br#"[ {"id": "1"} ]"#);
        assert_eq!(&doc[reps.span()], reps.as_bytes());
    }

    #[test]
    fn test_elements_keep_their_raw_bytes() {
        let doc = br#"{"body":{"variables":{"representations":[ {"id": "1"} , {"__typename":"User","id":"2"}]}}}"#;
        let reps = extract_representations(doc).unwrap();
        let elements = reps.elements().unwrap();

        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].get(), r#"{"id": "1"}"#);
        assert_eq!(elements[1].get(), r#"{"__typename":"User","id":"2"}"#);
    }

    #[test]
    fn test_empty_array_has_no_elements() {
        let doc = br#"{"body":{"variables":{"representations":[]}}}"#;
        let reps = extract_representations(doc).unwrap();
        assert!(reps.elements().unwrap().is_empty());
    }

    #[test]
    fn test_missing_path_segments_are_rejected() {
        let cases: [&[u8]; 5] = [
            br#"{}"#,
            br#"{"body":{}}"#,
            br#"{"body":{"variables":{}}}"#,
            br#"{"body":{"variables":{"representations":null}}}"#,
            br#"{"body":{"variables":null}}"#,
        ];

        for doc in cases {
            let err = extract_representations(doc).unwrap_err();
            assert!(
                matches!(err, ExtractError::MissingPath),
                "expected MissingPath for {}, got {err:?}",
                String::from_utf8_lossy(doc)
            );
        }
    }

    #[test]
    fn test_arrays_in_place_of_objects_are_rejected() {
        let cases: [&[u8]; 3] = [
            br#"[[[[{"id":"1"}]]]]"#,
            br#"{"body":[[[{"id":"1"}]]]}"#,
            br#"{"body":{"variables":[[{"id":"1"}]]}}"#,
        ];

        for doc in cases {
            let err = extract_representations(doc).unwrap_err();
            assert!(
                matches!(err, ExtractError::InvalidJson(_)),
                "expected InvalidJson for {}, got {err:?}",
                String::from_utf8_lossy(doc)
            );
        }
    }

    #[test]
    fn test_duplicate_path_key_is_rejected() {
        let doc = br#"{"body":{"variables":{"representations":[1],"representations":[2]}}}"#;
        let err = extract_representations(doc).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidJson(_)));
    }

    #[test]
    fn test_escaped_keys_and_unrelated_fields_are_handled() {
        let doc = br#"{"query":{"variables":[]},"b\u006fdy":{"variables":{"other":[0],"representations":[{"id":"7"}]}}}"#;
        let reps = extract_representations(doc).unwrap();

        assert_eq!(reps.as_bytes(), br#"[{"id":"7"}]"#);
        assert_eq!(&doc[reps.span()], reps.as_bytes());
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let cases: [&[u8]; 5] = [
            b"",
            br#"{"body":{"variables":{"representations":[]}}} [2]"#,
            br#"{"body":{"variables":{"representations":[{"id":"1"}]}"#,
            br#"{"body":"not an object"}"#,
            b"\xff\xfe",
        ];

        for doc in cases {
            let err = extract_representations(doc).unwrap_err();
            assert!(
                matches!(err, ExtractError::InvalidJson(_)),
                "expected InvalidJson for {}, got {err:?}",
                String::from_utf8_lossy(doc)
            );
        }
    }

    #[test]
    fn test_non_array_value_fails_on_iteration() {
        let doc = br#"{"body":{"variables":{"representations":{"id":"1"}}}}"#;
        let reps = extract_representations(doc).unwrap();

        let err = reps.elements().unwrap_err();
        assert!(matches!(err, ExtractError::NotAnArray(_)));
    }
}
