//! `application/yaml` bodies, bridged through the JSON data model.

use tether_define::{FieldPath, Schema, TypedValue};

use super::json;
use crate::error::CodecError;

pub(crate) fn encode(value: &TypedValue, schema: &Schema) -> Result<Vec<u8>, CodecError> {
    let document = json::encode(value, schema)?;
    Ok(serde_yaml::to_string(&document)?.into_bytes())
}

pub(crate) fn decode(bytes: &[u8], schema: &Schema) -> Result<TypedValue, CodecError> {
    let document: serde_json::Value = serde_yaml::from_slice(bytes)?;
    json::decode(&document, schema, &FieldPath::root())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether_define::{ObjectSchema, ObjectValue};

    fn storage() -> Schema {
        Schema::object(
            ObjectSchema::new()
                .field("blockstore_type", Schema::string())
                .field("pre_sign_support", Schema::boolean()),
        )
    }

    #[test]
    fn yaml_document_decodes() {
        let doc = b"blockstore_type: s3\npre_sign_support: true\n";
        let value = decode(doc, &storage()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.get("blockstore_type"), Some(&TypedValue::from("s3")));
        assert_eq!(object.get("pre_sign_support"), Some(&TypedValue::Bool(true)));
    }

    #[test]
    fn encoded_yaml_reads_back() {
        let value = TypedValue::object(
            ObjectValue::new()
                .with("blockstore_type", "local")
                .with("pre_sign_support", false),
        );
        let bytes = encode(&value, &storage()).unwrap();
        assert_eq!(decode(&bytes, &storage()).unwrap(), value);
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        assert!(matches!(
            decode(b"key: [unclosed", &storage()),
            Err(CodecError::YamlParse(_))
        ));
    }
}
