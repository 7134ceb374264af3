//! Turns the open-schema tag set of a building into something a details panel can show.
//!
//! Tags are handled as an ordered list of pairs rather than a map, so the order of
//! `addressLine` and `extraInfo` is whatever order the caller (or the wire) supplied.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::Deserializer;
use serde_json::Value;

use crate::types::NormalizedAddress;

pub type Tags = Vec<(String, String)>;

const ADDRESS_PREFIX: &str = "addr:";

pub fn normalize<I, K, V>(tags: I) -> NormalizedAddress
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut address = Vec::new();
    let mut name = String::new();
    let mut extra_info = Vec::new();

    for (key, value) in tags {
        let (key, value) = (key.as_ref(), value.as_ref());
        if key.starts_with(ADDRESS_PREFIX) {
            address.push(value.to_string());
        } else if key == "name" {
            name = value.to_string();
        } else {
            // trailing " \n" is part of the rendered format
            extra_info.push(format!("{}: {} \n", key, value));
        }
    }

    NormalizedAddress {
        address_line: address.join(", "),
        name,
        extra_info,
    }
}

/// Reads a JSON object into [`Tags`] in document order. Non-string values are kept as their JSON text.
pub fn deserialize_tags<'de, D>(deserializer: D) -> Result<Tags, D::Error>
where
    D: Deserializer<'de>,
{
    struct TagsVisitor;

    impl<'de> Visitor<'de> for TagsVisitor {
        type Value = Tags;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object of tag key/value pairs")
        }

        fn visit_unit<E>(self) -> Result<Tags, E> {
            Ok(Tags::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Tags, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut tags = Tags::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((key, value)) = map.next_entry::<String, Value>()? {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                tags.push((key, value));
            }
            Ok(tags)
        }
    }

    deserializer.deserialize_any(TagsVisitor)
}

pub fn tags_from_json(json: &str) -> Result<Tags, serde_json::Error> {
    let mut deserializer = serde_json::Deserializer::from_str(json);
    let tags = deserialize_tags(&mut deserializer)?;
    deserializer.end()?;
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn splits_tags_into_address_name_and_info() {
        let address = normalize([
            ("addr:street", "Main St"),
            ("addr:city", "Springfield"),
            ("name", "Acme"),
            ("shop", "bakery"),
        ]);
        assert_eq!(address.address_line, "Main St, Springfield");
        assert_eq!(address.name, "Acme");
        assert_eq!(address.extra_info, vec!["shop: bakery \n".to_string()]);
    }

    #[test]
    fn empty_tags_give_empty_address() {
        let address = normalize(Vec::<(String, String)>::new());
        assert_eq!(address, NormalizedAddress::default());
        assert_eq!(address.address_line, "");
        assert!(address.extra_info.is_empty());
    }

    #[test]
    fn last_name_wins() {
        let address = normalize([("name", "Old"), ("building", "yes"), ("name", "New")]);
        assert_eq!(address.name, "New");
        assert_eq!(address.extra_info, vec!["building: yes \n".to_string()]);
    }

    #[test]
    fn only_the_exact_prefix_counts_as_address() {
        let address = normalize([("addr", "x"), ("address", "y"), ("addr:postcode", "8001")]);
        assert_eq!(address.address_line, "8001");
        assert_eq!(address.extra_info.len(), 2);
    }

    #[test]
    fn normalize_is_repeatable() {
        let tags: Tags = vec![
            ("addr:housenumber".into(), "12".into()),
            ("roof:shape".into(), "flat".into()),
        ];
        let first = normalize(tags.iter().map(|(k, v)| (k, v)));
        let second = normalize(tags.iter().map(|(k, v)| (k, v)));
        assert_eq!(first, second);
    }

    #[test]
    fn sorted_map_input_is_deterministic() {
        let mut tags = BTreeMap::new();
        tags.insert("addr:street", "Main St");
        tags.insert("addr:city", "Springfield");
        assert_eq!(normalize(&tags).address_line, "Springfield, Main St");
    }

    #[test]
    fn json_tags_keep_document_order() {
        let tags = tags_from_json(
            r#"{"addr:street":"Main St","levels":3,"addr:city":"Springfield","name":"Acme"}"#,
        )
        .unwrap();
        assert_eq!(
            tags,
            vec![
                ("addr:street".to_string(), "Main St".to_string()),
                ("levels".to_string(), "3".to_string()),
                ("addr:city".to_string(), "Springfield".to_string()),
                ("name".to_string(), "Acme".to_string()),
            ]
        );
        let address = normalize(tags.iter().map(|(k, v)| (k, v)));
        assert_eq!(address.address_line, "Main St, Springfield");
        assert_eq!(address.extra_info, vec!["levels: 3 \n".to_string()]);
    }

    #[test]
    fn non_object_tags_are_rejected() {
        assert!(tags_from_json("[1, 2]").is_err());
    }
}
