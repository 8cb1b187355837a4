use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of foreign records a device points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    Addressable,
    DeviceService,
    DeviceProfile,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Addressable => "addressable",
            ReferenceKind::DeviceService => "device service",
            ReferenceKind::DeviceProfile => "device profile",
        };
        f.write_str(name)
    }
}

/// Caller-supplied handle on a foreign record: primary key and/or unique name.
/// Either side may be empty; an empty side is never looked up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceHint {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl ReferenceHint {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
        }
    }

    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_empty() && self.name.is_empty()
    }
}

/// Locates a device by exactly one of its unique keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceLocator {
    Id(String),
    Name(String),
}

impl DeviceLocator {
    pub fn value(&self) -> &str {
        match self {
            DeviceLocator::Id(id) => id,
            DeviceLocator::Name(name) => name,
        }
    }
}

impl fmt::Display for DeviceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceLocator::Id(id) => write!(f, "id {}", id),
            DeviceLocator::Name(name) => write!(f, "name {}", name),
        }
    }
}
