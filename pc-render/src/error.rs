use pc_format::PointCloudError;

/// Errors aborting the rendering of a cloud or segment.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    PointCloud(#[from] PointCloudError),

    /// Rejected configuration, every violation is listed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The external renderer could not be spawned or reported a failure
    #[error("external renderer failed: {0}")]
    ExternalRenderFailure(String),

    #[error("io error")]
    Io(#[from] std::io::Error),
}
