use thiserror::Error;
#[derive(Debug, Error)]
pub enum ScopeError {
    #[error("Must Select A Port To Connect To")]
    NoPortSelected,
    #[error("Chosen Port No Longer Available")]
    PortUnavailable(String),
    #[error("Port Already In Use")]
    PortInUse { port: String, reason: String },
    #[error("invalid baud rate `{0}`: expected a whole number between 1 and 999999")]
    InvalidBaud(String),
    #[error("serial i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),
    #[error("failed to render plot: {0}")]
    Plot(String),
}
impl<E: std::error::Error + Send + Sync + 'static> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for ScopeError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        ScopeError::Plot(format!("{value:?}"))
    }
}
impl From<image::ImageError> for ScopeError {
    fn from(value: image::ImageError) -> Self {
        ScopeError::Plot(value.to_string())
    }
}
