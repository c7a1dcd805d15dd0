//! Schema-driven configuration binder.
//!
//! # Responsibilities
//! - Turn one untyped mapping entry into a typed component instance
//! - Coerce scalar text to declared attribute types
//! - Apply secret indirection before coercion
//! - Recurse through sequences and nested composites
//!
//! # Design Decisions
//! - Binding is recursive descent over node kind; the schema drives every
//!   step, so there is no runtime introspection anywhere
//! - Side-effect free except secrets table lookups; no I/O
//! - The reserved key `class` only selects the type and is never bound

use thiserror::Error;

use crate::config::document::ConfigNode;
use crate::config::secrets::SecretsTable;
use crate::registry::schema::{
    AppContext, AttrKind, AttrMap, AttrSchema, AttrValue, AutomationApp, ScalarKind, TypeSchema,
};

/// Reserved key selecting the component class; skipped during binding.
pub const CLASS_KEY: &str = "class";

/// Binder-level failure for one attribute of one entry.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("attribute `{attribute}` is not declared on class `{class}`")]
    UnknownAttribute { class: String, attribute: String },

    #[error("secret `{name}` not found in secrets.yaml")]
    SecretNotFound { name: String },

    #[error("attribute `{attribute}`: cannot interpret {value} as {expected}")]
    TypeCoercion {
        attribute: String,
        value: String,
        expected: String,
    },

    #[error("attribute `{attribute}` element {index}: {source}")]
    SequenceElement {
        attribute: String,
        index: usize,
        #[source]
        source: Box<BindError>,
    },
}

/// A bound, ready-to-run automation component.
///
/// Owned entirely by the connection generation that loaded it; discarded
/// and rebuilt on reconnect.
#[derive(Debug)]
pub struct ComponentInstance {
    pub id: String,
    pub class_name: String,
    pub attrs: AttrMap,
    pub app: Box<dyn AutomationApp>,
}

/// Bind one top-level entry body against a resolved class schema.
pub fn bind_component(
    id: &str,
    entries: &[(String, ConfigNode)],
    schema: &TypeSchema,
    secrets: &SecretsTable,
) -> Result<ComponentInstance, BindError> {
    let attrs = bind_attrs(entries, schema.class_name(), schema.attrs(), secrets)?;
    let app = schema.construct(AppContext {
        id: id.to_string(),
        class_name: schema.class_name().to_string(),
        attrs: attrs.clone(),
    });
    Ok(ComponentInstance {
        id: id.to_string(),
        class_name: schema.class_name().to_string(),
        attrs,
        app,
    })
}

fn bind_attrs(
    entries: &[(String, ConfigNode)],
    class: &str,
    schema: &AttrSchema,
    secrets: &SecretsTable,
) -> Result<AttrMap, BindError> {
    let mut out = AttrMap::new();
    for (key, node) in entries {
        if key.eq_ignore_ascii_case(CLASS_KEY) {
            continue;
        }
        let kind = schema.get(key).ok_or_else(|| BindError::UnknownAttribute {
            class: class.to_string(),
            attribute: key.clone(),
        })?;
        out.insert(key.clone(), bind_value(key, node, class, kind, secrets)?);
    }
    Ok(out)
}

fn bind_value(
    attribute: &str,
    node: &ConfigNode,
    class: &str,
    kind: &AttrKind,
    secrets: &SecretsTable,
) -> Result<AttrValue, BindError> {
    match node {
        ConfigNode::Scalar { value, tag } => {
            let text = resolve_secret(value, tag.as_deref(), secrets)?;
            let AttrKind::Scalar(scalar_kind) = kind else {
                return Err(coercion(attribute, "a scalar", kind));
            };
            coerce_scalar(attribute, text, scalar_kind)
        }
        ConfigNode::Sequence(children) => {
            let AttrKind::Sequence(inner) = kind else {
                return Err(coercion(attribute, "a sequence", kind));
            };
            let mut items = Vec::with_capacity(children.len());
            for (index, child) in children.iter().enumerate() {
                let item = bind_value(attribute, child, class, inner, secrets).map_err(
                    |source| BindError::SequenceElement {
                        attribute: attribute.to_string(),
                        index,
                        source: Box::new(source),
                    },
                )?;
                items.push(item);
            }
            Ok(AttrValue::Sequence(items))
        }
        ConfigNode::Mapping(entries) => {
            let AttrKind::Composite(nested) = kind else {
                return Err(coercion(attribute, "a mapping", kind));
            };
            Ok(AttrValue::Composite(bind_attrs(
                entries, class, nested, secrets,
            )?))
        }
    }
}

fn resolve_secret<'a>(
    value: &'a str,
    tag: Option<&str>,
    secrets: &'a SecretsTable,
) -> Result<&'a str, BindError> {
    match tag {
        Some("secret") => secrets.get(value).ok_or_else(|| BindError::SecretNotFound {
            name: value.to_string(),
        }),
        _ => Ok(value),
    }
}

fn coerce_scalar(attribute: &str, text: &str, kind: &ScalarKind) -> Result<AttrValue, BindError> {
    let fail = || BindError::TypeCoercion {
        attribute: attribute.to_string(),
        value: format!("`{text}`"),
        expected: kind.to_string(),
    };
    match kind {
        ScalarKind::String => Ok(AttrValue::String(text.to_string())),
        ScalarKind::Integer => text.parse::<i64>().map(AttrValue::Integer).map_err(|_| fail()),
        ScalarKind::Float => text.parse::<f64>().map(AttrValue::Float).map_err(|_| fail()),
        ScalarKind::Boolean => parse_bool(text).map(AttrValue::Boolean).ok_or_else(fail),
        ScalarKind::Enum(variants) => variants
            .iter()
            .find(|v| v.eq_ignore_ascii_case(text))
            .map(|v| AttrValue::String(v.clone()))
            .ok_or_else(fail),
    }
}

// YAML 1.1 boolean spellings, as users write them in automation configs.
fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn coercion(attribute: &str, got: &str, kind: &AttrKind) -> BindError {
    BindError::TypeCoercion {
        attribute: attribute.to_string(),
        value: got.to_string(),
        expected: kind.describe(),
    }
}
