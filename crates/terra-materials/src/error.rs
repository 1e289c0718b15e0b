//! Shader template error types.

/// Errors raised while building a material's shader.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ShaderError {
    /// A hook tried to edit an insertion point the template does not contain.
    #[error("template '{template}' has no insertion point '{point}'")]
    MissingInsertionPoint { template: String, point: String },

    /// An include that nothing in the chunk library can expand.
    #[error("template '{template}' includes unknown chunk '{chunk}'")]
    UnknownChunk { template: String, chunk: String },

    /// A custom uniform was declared twice.
    #[error("uniform '{0}' is already declared")]
    DuplicateUniform(String),

    /// A write to a uniform that does not exist or has a different type.
    #[error("no {expected} uniform named '{name}'")]
    UnknownUniform { name: String, expected: &'static str },
}
