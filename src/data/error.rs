use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

/// Failures raised by the data core. Empty filter results are not errors.
#[derive(Debug, Error)]
pub enum DataError {
    /// The source is missing, unreadable, malformed or too short.
    #[error("failed to load data: {context}")]
    Load {
        context: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },

    /// A fixed-shape operation needs more rows than are available.
    #[error("insufficient rows: {required} required, {available} available")]
    InsufficientRows { required: usize, available: usize },

    /// Too few data points for a statistical operation.
    #[error("insufficient data: {required} data points required, {available} available")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DataError {
    pub fn load(context: impl Into<String>) -> Self {
        DataError::Load {
            context: context.into(),
            source: None,
        }
    }

    pub fn load_with<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        DataError::Load {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Attach load context to foreign errors, mirroring `anyhow::Context`.
pub(crate) trait LoadContext<T> {
    fn load_context(self, context: impl FnOnce() -> String) -> Result<T>;
}

impl<T, E> LoadContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn load_context(self, context: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| DataError::load_with(context(), e))
    }
}
