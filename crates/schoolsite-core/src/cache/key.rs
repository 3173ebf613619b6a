use std::borrow::Cow;
use std::fmt;

/// Name of a cacheable backend resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey(Cow<'static, str>);

impl ResourceKey {
    /// The whole school document served from the API root.
    pub const SCHOOL: ResourceKey = ResourceKey(Cow::Borrowed("school"));

    pub fn new(name: impl Into<String>) -> Self {
        ResourceKey(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ResourceKey {
    fn from(name: &'static str) -> Self {
        ResourceKey(Cow::Borrowed(name))
    }
}

impl From<String> for ResourceKey {
    fn from(name: String) -> Self {
        ResourceKey(Cow::Owned(name))
    }
}
