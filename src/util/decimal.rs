// Decimal serde helpers
// Big integers travel as base-10 strings in the JSON store

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

use crate::rsa::bigint::{parse_biguint, RsaBigInt};

pub fn serialize<S: Serializer>(value: &RsaBigInt, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_str_radix(10))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RsaBigInt, D::Error> {
    let text = String::deserialize(deserializer)?;
    parse_biguint(&text).map_err(D::Error::custom)
}

/// Same encoding for a list of values.
pub mod vec {
    use serde::de::Error as _;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::rsa::bigint::{parse_biguint, RsaBigInt};

    pub fn serialize<S: Serializer>(values: &[RsaBigInt], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for value in values {
            seq.serialize_element(&value.to_str_radix(10))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<RsaBigInt>, D::Error> {
        let texts = Vec::<String>::deserialize(deserializer)?;
        texts
            .iter()
            .map(|text| parse_biguint(text).map_err(D::Error::custom))
            .collect()
    }
}
