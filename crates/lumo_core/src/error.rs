//! Errors raised by scene graph and material access.

use thiserror::Error;

/// Errors that can occur while querying or editing a scene.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("material `{material}` has no property `{property}`")]
    MissingProperty { material: String, property: String },

    #[error("scene node `{0}` not found")]
    NodeNotFound(String),
}

pub type SceneResult<T> = Result<T, SceneError>;
