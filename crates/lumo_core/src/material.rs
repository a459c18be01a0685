//! Materials as named property bags.

use std::collections::BTreeMap;

use lumo_math::Vec4;

use crate::error::{SceneError, SceneResult};

/// Property name of the diffuse color used by the shading kernel.
pub const DIFFUSE: &str = "diffuse";

/// A material: a name plus 4-component properties looked up by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Material {
    /// Material name (used in error messages and logs)
    pub name: String,

    properties: BTreeMap<String, Vec4>,
}

impl Material {
    /// Create an empty material.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Create a material with just a diffuse color.
    pub fn diffuse(name: impl Into<String>, color: Vec4) -> Self {
        Self::new(name).with_property(DIFFUSE, color)
    }

    /// Builder-style property setter.
    pub fn with_property(mut self, name: impl Into<String>, value: Vec4) -> Self {
        self.set_property(name, value);
        self
    }

    /// Set or replace a property.
    pub fn set_property(&mut self, name: impl Into<String>, value: Vec4) {
        self.properties.insert(name.into(), value);
    }

    /// Look up a property by name.
    pub fn property(&self, name: &str) -> SceneResult<Vec4> {
        self.properties
            .get(name)
            .copied()
            .ok_or_else(|| SceneError::MissingProperty {
                material: self.name.clone(),
                property: name.to_string(),
            })
    }

    /// Check if a property is defined.
    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Iterate over all properties in name order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, Vec4)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_lookup() {
        let material = Material::diffuse("orange", Vec4::new(1.0, 0.5, 0.25, 1.0));

        assert!(material.has_property(DIFFUSE));
        assert_eq!(
            material.property(DIFFUSE).unwrap(),
            Vec4::new(1.0, 0.5, 0.25, 1.0)
        );
    }

    #[test]
    fn test_missing_property_fails() {
        let material = Material::new("bare");

        let err = material.property(DIFFUSE).unwrap_err();
        assert_eq!(
            err,
            SceneError::MissingProperty {
                material: "bare".to_string(),
                property: "diffuse".to_string(),
            }
        );
        assert!(err.to_string().contains("bare"));
    }

    #[test]
    fn test_set_property_replaces() {
        let mut material = Material::diffuse("m", Vec4::ONE);
        material.set_property(DIFFUSE, Vec4::ZERO);
        material.set_property("specular", Vec4::splat(0.5));

        assert_eq!(material.property(DIFFUSE).unwrap(), Vec4::ZERO);
        let names: Vec<&str> = material.properties().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["diffuse", "specular"]);
    }
}
