//! Configuration document model.
//!
//! Parses a YAML document into an immutable tree of three node kinds.
//! No semantic interpretation happens here; tags are preserved on scalars
//! so the binder can apply secret indirection later.

use serde_yaml::Value;
use thiserror::Error;

/// One parsed document node.
///
/// Mapping children keep document order; scalar values keep their literal
/// text (numbers and booleans are rendered back to text and coerced only
/// once the target attribute type is known).
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    Scalar {
        value: String,
        /// YAML tag without the leading `!`, e.g. `secret`.
        tag: Option<String>,
    },
    Sequence(Vec<ConfigNode>),
    Mapping(Vec<(String, ConfigNode)>),
}

impl ConfigNode {
    pub fn scalar(value: impl Into<String>) -> Self {
        ConfigNode::Scalar {
            value: value.into(),
            tag: None,
        }
    }

    /// Short node-kind name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigNode::Scalar { .. } => "scalar",
            ConfigNode::Sequence(_) => "sequence",
            ConfigNode::Mapping(_) => "mapping",
        }
    }
}

/// Error type for malformed configuration documents.
#[derive(Debug, Error)]
pub enum ConfigParseError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("top-level document must be a mapping")]
    RootNotMapping,
    #[error("mapping keys must be scalars")]
    NonScalarKey,
}

/// Parse one configuration file's text into a document tree.
///
/// The top level must be a mapping (component id -> body). Duplicate keys
/// are rejected by the YAML parser, which is what makes duplicate component
/// ids within one file a hard failure.
pub fn parse_document(text: &str) -> Result<ConfigNode, ConfigParseError> {
    let value: Value = serde_yaml::from_str(text)?;
    let node = convert(value)?;
    match node {
        ConfigNode::Mapping(_) => Ok(node),
        _ => Err(ConfigParseError::RootNotMapping),
    }
}

fn convert(value: Value) -> Result<ConfigNode, ConfigParseError> {
    Ok(match value {
        Value::Null => ConfigNode::scalar(""),
        Value::Bool(b) => ConfigNode::scalar(b.to_string()),
        Value::Number(n) => ConfigNode::scalar(n.to_string()),
        Value::String(s) => ConfigNode::scalar(s),
        Value::Sequence(items) => ConfigNode::Sequence(
            items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Value::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                entries.push((scalar_key(key)?, convert(value)?));
            }
            ConfigNode::Mapping(entries)
        }
        Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let tag = tag.trim_start_matches('!').to_string();
            match convert(tagged.value)? {
                ConfigNode::Scalar { value, .. } => ConfigNode::Scalar {
                    value,
                    tag: Some(tag),
                },
                // Tags carry no meaning on collections; keep the structure.
                other => other,
            }
        }
    })
}

fn scalar_key(key: Value) -> Result<String, ConfigParseError> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ConfigParseError::NonScalarKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_three_node_kinds() {
        let doc = parse_document(
            "app:\n  class: Light\n  zones:\n    - kitchen\n    - hall\n  limits:\n    max: 10\n",
        )
        .unwrap();

        let ConfigNode::Mapping(entries) = doc else {
            panic!("expected mapping root");
        };
        assert_eq!(entries.len(), 1);
        let (id, body) = &entries[0];
        assert_eq!(id, "app");

        let ConfigNode::Mapping(body) = body else {
            panic!("expected mapping body");
        };
        assert_eq!(body[0], ("class".to_string(), ConfigNode::scalar("Light")));
        assert_eq!(
            body[1].1,
            ConfigNode::Sequence(vec![
                ConfigNode::scalar("kitchen"),
                ConfigNode::scalar("hall"),
            ])
        );
        assert!(matches!(body[2].1, ConfigNode::Mapping(_)));
    }

    #[test]
    fn secret_tag_is_kept_on_scalars() {
        let doc = parse_document("app:\n  token: !secret api_token\n").unwrap();
        let ConfigNode::Mapping(entries) = doc else {
            panic!("expected mapping root");
        };
        let ConfigNode::Mapping(body) = &entries[0].1 else {
            panic!("expected mapping body");
        };
        assert_eq!(
            body[0].1,
            ConfigNode::Scalar {
                value: "api_token".to_string(),
                tag: Some("secret".to_string()),
            }
        );
    }

    #[test]
    fn numbers_and_booleans_keep_literal_text() {
        let doc = parse_document("app:\n  brightness: 50\n  enabled: true\n").unwrap();
        let ConfigNode::Mapping(entries) = doc else {
            panic!("expected mapping root");
        };
        let ConfigNode::Mapping(body) = &entries[0].1 else {
            panic!("expected mapping body");
        };
        assert_eq!(body[0].1, ConfigNode::scalar("50"));
        assert_eq!(body[1].1, ConfigNode::scalar("true"));
    }

    #[test]
    fn duplicate_ids_fail_the_parse() {
        let err = parse_document("app:\n  class: A\napp:\n  class: B\n").unwrap_err();
        assert!(matches!(err, ConfigParseError::Yaml(_)));
    }

    #[test]
    fn scalar_root_is_rejected() {
        let err = parse_document("just a string").unwrap_err();
        assert!(matches!(err, ConfigParseError::RootNotMapping));
    }
}
