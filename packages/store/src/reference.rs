//! References: (type, id) handles produced by extraction.

use std::fmt;

use crate::ClientId;

/// A pointer to a record the store materialized or updated.
///
/// References carry no attribute data. They are how a result set names its
/// members, in order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Fully-qualified type name.
    pub type_name: String,

    /// Server id, if the representation carried one.
    pub id: Option<String>,

    /// The store-local record this reference resolves to.
    pub client_id: ClientId,
}

impl Reference {
    pub fn new(type_name: impl Into<String>, id: Option<String>, client_id: ClientId) -> Self {
        Self {
            type_name: type_name.into(),
            id,
            client_id,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{}", self.type_name, id),
            None => write!(f, "{}:{}", self.type_name, self.client_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefers_server_id() {
        let r = Reference::new("App.Widget", Some("5".to_string()), ClientId(1));
        assert_eq!(r.to_string(), "App.Widget:5");

        let r = Reference::new("App.Widget", None, ClientId(1));
        assert_eq!(r.to_string(), "App.Widget:#1");
    }
}
