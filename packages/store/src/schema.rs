//! Per-type metadata: attributes, relations and naming overrides.

/// A named attribute on a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDef {
    /// Attribute name as used in application code (camelCase).
    pub name: String,

    /// Name of the transform that converts this attribute (e.g. "string", "array").
    pub kind: String,

    /// Read-only attributes are loaded from the backend but never written back.
    pub read_only: bool,
}

impl AttributeDef {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            read_only: false,
        }
    }

    /// Mark this attribute as read-only.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    BelongsTo,
    HasMany,
}

/// A relation from one record type to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub name: String,
    pub kind: RelationKind,
    /// Fully-qualified name of the related type.
    pub target: String,
}

/// Static description of a record type.
///
/// Descriptors are built once by the application and only ever read by the
/// adapter.
///
/// # Example
///
/// ```
/// use restmap_store::{AttributeDef, TypeDescriptor};
///
/// let widget = TypeDescriptor::new("App.Widget")
///     .attribute(AttributeDef::new("name", "string"))
///     .attribute(AttributeDef::new("created", "string").read_only())
///     .attribute(AttributeDef::new("tags", "array"))
///     .belongs_to("owner", "App.User");
///
/// assert_eq!(widget.short_name(), "Widget");
/// assert!(widget.is_read_only("created"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    name: String,
    url: Option<String>,
    default_url: Option<String>,
    attributes: Vec<AttributeDef>,
    relations: Vec<RelationDef>,
}

impl TypeDescriptor {
    /// Create a descriptor from a fully-qualified, dot-separated type name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: None,
            default_url: None,
            attributes: Vec::new(),
            relations: Vec::new(),
        }
    }

    /// Resource path set on the type itself.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Resource path shared by every instance of the type unless an instance
    /// sets its own.
    pub fn with_default_url(mut self, url: impl Into<String>) -> Self {
        self.default_url = Some(url.into());
        self
    }

    pub fn attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn belongs_to(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(RelationDef {
            name: name.into(),
            kind: RelationKind::BelongsTo,
            target: target.into(),
        });
        self
    }

    pub fn has_many(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(RelationDef {
            name: name.into(),
            kind: RelationKind::HasMany,
            target: target.into(),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last dot-separated segment of the type name.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn default_url(&self) -> Option<&str> {
        self.default_url.as_deref()
    }

    pub fn attributes(&self) -> &[AttributeDef] {
        &self.attributes
    }

    pub fn attribute_def(&self, name: &str) -> Option<&AttributeDef> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn is_read_only(&self, name: &str) -> bool {
        self.attribute_def(name).is_some_and(|a| a.read_only)
    }

    pub fn relations(&self) -> &[RelationDef] {
        &self.relations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_is_last_segment() {
        assert_eq!(TypeDescriptor::new("App.models.Widget").short_name(), "Widget");
        assert_eq!(TypeDescriptor::new("Widget").short_name(), "Widget");
    }

    #[test]
    fn read_only_lookup() {
        let ty = TypeDescriptor::new("App.Post")
            .attribute(AttributeDef::new("title", "string"))
            .attribute(AttributeDef::new("slug", "string").read_only());

        assert!(!ty.is_read_only("title"));
        assert!(ty.is_read_only("slug"));
        assert!(!ty.is_read_only("missing"));
    }

    #[test]
    fn relations_keep_declaration_order() {
        let ty = TypeDescriptor::new("App.Post")
            .belongs_to("author", "App.User")
            .has_many("comments", "App.Comment");

        let kinds: Vec<_> = ty.relations().iter().map(|r| r.kind).collect();
        assert_eq!(kinds, vec![RelationKind::BelongsTo, RelationKind::HasMany]);
    }
}
