// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reflection catalogs describing component layouts.
//!
//! A catalog answers three questions about a component type: how many fields
//! it has, what field `i` is called and what type field `i` declares. The
//! [`SchemaCatalog`] is an in-memory implementation that can be loaded from a
//! RON schema file.

use crate::field::{FieldDescriptor, FieldType};
use crate::id::ComponentTypeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current schema file format version
pub const SCHEMA_FORMAT_VERSION: u32 = 1;

/// Query surface of a reflection provider.
///
/// Implementations must be free of side effects. Indices passed in are always
/// below `field_count` for the same type.
pub trait ReflectionCatalog {
    /// Number of fields of a component type, `0` if the type is unknown
    fn field_count(&self, type_id: ComponentTypeId) -> u32;

    /// UTF-8 name of field `index`. Not NUL terminated.
    fn field_name(&self, type_id: ComponentTypeId, index: u32) -> Option<&[u8]>;

    /// Declared type of field `index`
    fn field_type(&self, type_id: ComponentTypeId, index: u32) -> Option<FieldType>;

    /// Display name of a component type, if the provider has one
    fn component_name(&self, _type_id: ComponentTypeId) -> Option<&str> {
        None
    }

    /// Full descriptor of field `index`, if both name and type are available
    fn field(&self, type_id: ComponentTypeId, index: u32) -> Option<FieldDescriptor> {
        let name = String::from_utf8_lossy(self.field_name(type_id, index)?).into_owned();
        let field_type = self.field_type(type_id, index)?;
        Some(FieldDescriptor {
            index,
            name,
            field_type,
        })
    }
}

impl<C: ReflectionCatalog + ?Sized> ReflectionCatalog for &C {
    fn field_count(&self, type_id: ComponentTypeId) -> u32 {
        (**self).field_count(type_id)
    }

    fn field_name(&self, type_id: ComponentTypeId, index: u32) -> Option<&[u8]> {
        (**self).field_name(type_id, index)
    }

    fn field_type(&self, type_id: ComponentTypeId, index: u32) -> Option<FieldType> {
        (**self).field_type(type_id, index)
    }

    fn component_name(&self, type_id: ComponentTypeId) -> Option<&str> {
        (**self).component_name(type_id)
    }
}

/// A field entry in a component schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Field name
    pub name: String,
    /// Declared type
    pub field_type: FieldType,
}

impl FieldSchema {
    /// Create a field entry
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Layout of one component type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSchema {
    /// Component type id
    pub id: ComponentTypeId,
    /// Display name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldSchema>,
}

impl ComponentSchema {
    /// Create an empty schema
    pub fn new(id: ComponentTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.push(FieldSchema::new(name, field_type));
        self
    }
}

/// On-disk form of a schema catalog
#[derive(Debug, Serialize, Deserialize)]
struct SchemaFile {
    version: u32,
    components: Vec<ComponentSchema>,
}

/// In-memory reflection catalog keyed by component type id
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    components: IndexMap<ComponentTypeId, ComponentSchema>,
}

impl SchemaCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component schema, replacing any previous one with the same id
    pub fn register(&mut self, schema: ComponentSchema) -> Option<ComponentSchema> {
        self.components.insert(schema.id, schema)
    }

    /// Builder-style [`register`](Self::register)
    pub fn with_component(mut self, schema: ComponentSchema) -> Self {
        self.register(schema);
        self
    }

    /// Get a component schema
    pub fn component(&self, type_id: ComponentTypeId) -> Option<&ComponentSchema> {
        self.components.get(&type_id)
    }

    /// All registered components, in registration order
    pub fn components(&self) -> impl Iterator<Item = &ComponentSchema> {
        self.components.values()
    }

    /// Number of registered components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, CatalogError> {
        let file = SchemaFile {
            version: SCHEMA_FORMAT_VERSION,
            components: self.components.values().cloned().collect(),
        };
        let config = ron::ser::PrettyConfig::default().struct_names(false);
        Ok(ron::ser::to_string_pretty(&file, config)?)
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, CatalogError> {
        let file: SchemaFile = ron::from_str(s)?;
        if file.version > SCHEMA_FORMAT_VERSION {
            return Err(CatalogError::UnsupportedVersion {
                found: file.version,
                supported: SCHEMA_FORMAT_VERSION,
            });
        }

        let mut catalog = Self::new();
        for schema in file.components {
            let id = schema.id;
            if catalog.register(schema).is_some() {
                return Err(CatalogError::DuplicateComponent(id));
            }
        }
        tracing::debug!("Loaded reflection catalog with {} components", catalog.len());
        Ok(catalog)
    }

    /// Load a catalog from a schema file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save the catalog to a schema file
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

impl ReflectionCatalog for SchemaCatalog {
    fn field_count(&self, type_id: ComponentTypeId) -> u32 {
        self.component(type_id)
            .map_or(0, |c| u32::try_from(c.fields.len()).unwrap_or(u32::MAX))
    }

    fn field_name(&self, type_id: ComponentTypeId, index: u32) -> Option<&[u8]> {
        let field = self.component(type_id)?.fields.get(index as usize)?;
        Some(field.name.as_bytes())
    }

    fn field_type(&self, type_id: ComponentTypeId, index: u32) -> Option<FieldType> {
        let field = self.component(type_id)?.fields.get(index as usize)?;
        Some(field.field_type)
    }

    fn component_name(&self, type_id: ComponentTypeId) -> Option<&str> {
        self.component(type_id).map(|c| c.name.as_str())
    }
}

/// Error loading or saving a schema catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema file is not valid RON
    #[error("Invalid schema file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Catalog could not be serialized
    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[from] ron::Error),

    /// Schema file was written by a newer version
    #[error("Schema version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Highest supported version
        supported: u32,
    },

    /// Two schemas share one component id
    #[error("Duplicate component id: {0}")]
    DuplicateComponent(ComponentTypeId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn transform_id() -> ComponentTypeId {
        ComponentTypeId(Uuid::from_u128(0x7f1a_0000_0000_0000_0000_0000_0000_0001))
    }

    fn sample_catalog() -> SchemaCatalog {
        SchemaCatalog::new().with_component(
            ComponentSchema::new(transform_id(), "Transform")
                .with_field("position", FieldType::Vector3)
                .with_field("rotation", FieldType::Quaternion)
                .with_field("visible", FieldType::Bool),
        )
    }

    #[test]
    fn test_field_queries() {
        let catalog = sample_catalog();
        assert_eq!(catalog.field_count(transform_id()), 3);
        assert_eq!(catalog.field_name(transform_id(), 1), Some(&b"rotation"[..]));
        assert_eq!(catalog.field_type(transform_id(), 2), Some(FieldType::Bool));
        assert_eq!(catalog.field_name(transform_id(), 3), None);
    }

    #[test]
    fn test_unknown_type_has_no_fields() {
        let catalog = sample_catalog();
        let unknown = ComponentTypeId(Uuid::from_u128(99));
        assert_eq!(catalog.field_count(unknown), 0);
        assert_eq!(catalog.field_name(unknown, 0), None);
        assert_eq!(catalog.field_type(unknown, 0), None);
    }

    #[test]
    fn test_field_descriptor() {
        let catalog = sample_catalog();
        let field = catalog.field(transform_id(), 0).unwrap();
        assert_eq!(field.index, 0);
        assert_eq!(field.name, "position");
        assert_eq!(field.field_type, FieldType::Vector3);
    }

    #[test]
    fn test_catalog_serialization() {
        let catalog = sample_catalog();
        let ron = catalog.to_ron().unwrap();
        let loaded = SchemaCatalog::from_ron(&ron).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.component(transform_id()), catalog.component(transform_id()));
    }

    #[test]
    fn test_rejects_newer_version() {
        let ron = "(version: 99, components: [])";
        let err = SchemaCatalog::from_ron(ron).unwrap_err();
        assert!(matches!(err, CatalogError::UnsupportedVersion { found: 99, .. }));
    }

    #[test]
    fn test_rejects_duplicate_component() {
        let schema = ComponentSchema::new(transform_id(), "Transform");
        let file = SchemaFile {
            version: SCHEMA_FORMAT_VERSION,
            components: vec![schema.clone(), schema],
        };
        let ron = ron::ser::to_string(&file).unwrap();
        let err = SchemaCatalog::from_ron(&ron).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateComponent(id) if id == transform_id()));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("components.ron");
        sample_catalog().save(&path).unwrap();
        let loaded = SchemaCatalog::load(&path).unwrap();
        assert_eq!(loaded.component_name(transform_id()), Some("Transform"));
        assert_eq!(loaded.field_count(transform_id()), 3);
    }
}
