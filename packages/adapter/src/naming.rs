//! Resource names and URLs.
//!
//! A record type maps to a root name (`widget`), which is pluralized
//! (`widgets`) and joined with the host and namespace into a URL. Collection
//! URLs end with `/`; per-resource URLs do not get one added.

use std::collections::BTreeMap;

use restmap_store::{Record, TypeDescriptor};

/// Root name for a type.
///
/// The first of these that is set wins: the record's own `url`, the type's
/// `url`, the type's default-instance `url`. Otherwise the last segment of the
/// type name, lower-cased (`App.Widget` becomes `widget`).
pub fn root_for_type(type_: &TypeDescriptor, record: Option<&Record>) -> String {
    record
        .and_then(Record::url)
        .or_else(|| type_.url())
        .or_else(|| type_.default_url())
        .map(str::to_owned)
        .unwrap_or_else(|| type_.short_name().to_lowercase())
}

/// Plural forms, with an explicit override table.
///
/// Without an override a name ending in `s` is left alone and anything else
/// gets an `s` appended. There is no irregular-plural table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pluralizer {
    overrides: BTreeMap<String, String>,
}

impl Pluralizer {
    pub fn new(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }

    pub fn pluralize(&self, name: &str) -> String {
        if let Some(plural) = self.overrides.get(name) {
            plural.clone()
        } else if name.ends_with('s') {
            name.to_string()
        } else {
            format!("{}s", name)
        }
    }
}

/// Builds request paths from root names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlBuilder {
    host: String,
    namespace: Option<String>,
    pluralizer: Pluralizer,
}

impl UrlBuilder {
    pub fn new(host: impl Into<String>, namespace: Option<String>, pluralizer: Pluralizer) -> Self {
        Self {
            host: host.into(),
            namespace,
            pluralizer,
        }
    }

    pub fn pluralizer(&self) -> &Pluralizer {
        &self.pluralizer
    }

    /// `host/namespace/plural/suffix`, joined with `/`. An empty host yields a
    /// path rooted at `/`.
    pub fn base_url(&self, root: &str, suffix: Option<&str>) -> String {
        let plural = self.pluralizer.pluralize(root);
        let mut parts = vec![self.host.as_str()];
        if let Some(namespace) = &self.namespace {
            parts.push(namespace);
        }
        parts.push(&plural);
        if let Some(suffix) = suffix {
            parts.push(suffix);
        }
        parts.join("/")
    }

    /// Like [`base_url`](Self::base_url), but a collection URL (no suffix)
    /// always ends in exactly one `/`.
    pub fn build_url(&self, root: &str, suffix: Option<&str>) -> String {
        let mut url = self.base_url(root, suffix);
        if suffix.is_none() && !url.ends_with('/') {
            url.push('/');
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restmap_store::ClientId;

    #[test]
    fn instance_url_wins() {
        let ty = TypeDescriptor::new("App.Widget")
            .with_url("typeurl/")
            .with_default_url("protourl/");
        let mut record = Record::new(ClientId(1), "App.Widget");
        record.set_url("custom/");

        assert_eq!(root_for_type(&ty, Some(&record)), "custom/");
    }

    #[test]
    fn type_url_then_default_url() {
        let record = Record::new(ClientId(1), "App.Widget");

        let ty = TypeDescriptor::new("App.Widget")
            .with_url("typeurl/")
            .with_default_url("protourl/");
        assert_eq!(root_for_type(&ty, Some(&record)), "typeurl/");

        let ty = TypeDescriptor::new("App.Widget").with_default_url("protourl/");
        assert_eq!(root_for_type(&ty, None), "protourl/");
    }

    #[test]
    fn falls_back_to_lowercased_last_segment() {
        let ty = TypeDescriptor::new("App.models.BlogPost");
        assert_eq!(root_for_type(&ty, None), "blogpost");
    }

    #[test]
    fn pluralize_rules() {
        let mut overrides = BTreeMap::new();
        overrides.insert("person".to_string(), "people".to_string());
        let pluralizer = Pluralizer::new(overrides);

        assert_eq!(pluralizer.pluralize("person"), "people");
        assert_eq!(pluralizer.pluralize("bus"), "bus");
        assert_eq!(pluralizer.pluralize("class"), "class");
        assert_eq!(pluralizer.pluralize("widget"), "widgets");
        assert_eq!(pluralizer.pluralize("category"), "categorys");
    }

    #[test]
    fn collection_urls_get_trailing_slash() {
        let urls = UrlBuilder::new("", Some("api".to_string()), Pluralizer::default());
        assert_eq!(urls.build_url("widget", None), "/api/widgets/");
        assert_eq!(urls.build_url("widget", Some("7")), "/api/widgets/7");
    }

    #[test]
    fn trailing_slash_is_never_doubled() {
        let mut overrides = BTreeMap::new();
        overrides.insert("widget".to_string(), "widgets/".to_string());
        let urls = UrlBuilder::new("https://api.example.com", None, Pluralizer::new(overrides));

        assert_eq!(urls.build_url("widget", None), "https://api.example.com/widgets/");
    }

    #[test]
    fn base_url_without_namespace() {
        let urls = UrlBuilder::default();
        assert_eq!(urls.base_url("widget", None), "/widgets");
        assert_eq!(urls.build_url("widget", None), "/widgets/");
    }
}
