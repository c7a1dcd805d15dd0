//! Build-time component schemas.
//!
//! Every registrable component class carries an explicit schema describing
//! its named attributes, so the binder never needs runtime introspection:
//! the schema says what each attribute is, the constructor says how the
//! bound values become a running object.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// The shape a single scalar attribute coerces to.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarKind {
    String,
    Integer,
    Float,
    Boolean,
    /// A closed set of allowed values; coercion is case-insensitive and
    /// yields the canonical variant spelling.
    Enum(Vec<String>),
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarKind::String => write!(f, "string"),
            ScalarKind::Integer => write!(f, "integer"),
            ScalarKind::Float => write!(f, "float"),
            ScalarKind::Boolean => write!(f, "boolean"),
            ScalarKind::Enum(variants) => write!(f, "one of {:?}", variants),
        }
    }
}

/// Declared type of one attribute: a scalar, a homogeneous sequence, or a
/// nested composite with its own attribute set.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrKind {
    Scalar(ScalarKind),
    Sequence(Box<AttrKind>),
    Composite(AttrSchema),
}

impl AttrKind {
    pub fn string() -> Self {
        AttrKind::Scalar(ScalarKind::String)
    }

    pub fn integer() -> Self {
        AttrKind::Scalar(ScalarKind::Integer)
    }

    pub fn float() -> Self {
        AttrKind::Scalar(ScalarKind::Float)
    }

    pub fn boolean() -> Self {
        AttrKind::Scalar(ScalarKind::Boolean)
    }

    pub fn sequence_of(inner: AttrKind) -> Self {
        AttrKind::Sequence(Box::new(inner))
    }

    /// Human-readable description used in coercion diagnostics.
    pub fn describe(&self) -> String {
        match self {
            AttrKind::Scalar(kind) => kind.to_string(),
            AttrKind::Sequence(inner) => format!("a sequence of {}", inner.describe()),
            AttrKind::Composite(_) => "a nested mapping".to_string(),
        }
    }
}

/// The named, typed attribute set of a class or nested composite.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrSchema {
    attrs: BTreeMap<String, AttrKind>,
}

impl AttrSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, kind: AttrKind) -> Self {
        self.attrs.insert(name.into(), kind);
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttrKind> {
        self.attrs.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }
}

/// A bound attribute value. Structurally comparable so two binding passes
/// over the same document can be checked for equality.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Sequence(Vec<AttrValue>),
    Composite(AttrMap),
}

/// Attribute name to bound value, ordered by name.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// Everything a constructor gets to build the backing object.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub id: String,
    pub class_name: String,
    pub attrs: AttrMap,
}

/// A running automation component's backing object.
///
/// The automation semantics live entirely in implementations; the host only
/// constructs, hands over, and drops these.
pub trait AutomationApp: Send + fmt::Debug {
    /// Class name this object was constructed for.
    fn class_name(&self) -> &str;
}

pub type Constructor = Arc<dyn Fn(AppContext) -> Box<dyn AutomationApp> + Send + Sync>;

/// Schema for one registrable component class: name, attribute set, and the
/// constructor producing the backing object from bound attributes.
#[derive(Clone)]
pub struct TypeSchema {
    class_name: String,
    attrs: AttrSchema,
    constructor: Constructor,
}

impl TypeSchema {
    /// Schema backed by the generic [`ConfiguredApp`] object.
    pub fn new(class_name: impl Into<String>, attrs: AttrSchema) -> Self {
        Self::with_constructor(class_name, attrs, Arc::new(|ctx| {
            Box::new(ConfiguredApp::from(ctx)) as Box<dyn AutomationApp>
        }))
    }

    pub fn with_constructor(
        class_name: impl Into<String>,
        attrs: AttrSchema,
        constructor: Constructor,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            attrs,
            constructor,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn attrs(&self) -> &AttrSchema {
        &self.attrs
    }

    pub fn construct(&self, ctx: AppContext) -> Box<dyn AutomationApp> {
        (self.constructor)(ctx)
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("class_name", &self.class_name)
            .field("attrs", &self.attrs)
            .finish_non_exhaustive()
    }
}

/// Generic backing object for classes that carry no behavior of their own:
/// it simply holds the bound configuration.
#[derive(Debug)]
pub struct ConfiguredApp {
    id: String,
    class_name: String,
    attrs: AttrMap,
}

impl ConfiguredApp {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }
}

impl From<AppContext> for ConfiguredApp {
    fn from(ctx: AppContext) -> Self {
        Self {
            id: ctx.id,
            class_name: ctx.class_name,
            attrs: ctx.attrs,
        }
    }
}

impl AutomationApp for ConfiguredApp {
    fn class_name(&self) -> &str {
        &self.class_name
    }
}
