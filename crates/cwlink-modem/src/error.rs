use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModemError {
    #[error("no input device matched regex")]
    NoInputDevice,

    #[error("no output device matched regex")]
    NoOutputDevice,

    #[error("unsupported sample format (expected f32)")]
    UnsupportedFormat,

    #[error("invalid device regex: {0}")]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Devices(#[from] cpal::DevicesError),

    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),
}
