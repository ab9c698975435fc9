use thiserror::Error;

/// Pipeline error taxonomy.
///
/// The set is deliberately small and carries no message payloads: callers
/// branch on the variant, they never format it for diagnosis beyond the
/// fixed description.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineError {
    /// Transport or coprocessor failure, propagated unchanged from the
    /// producer side.
    #[error("coprocessor hardware failure")]
    Hardware,

    /// A configuration or lifecycle request the coprocessor refuses in its
    /// current state.
    #[error("operation not allowed in current state")]
    NotAllowed,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
