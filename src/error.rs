use crate::fetch::error::FetchError;
use crate::frame::error::FrameError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HumidityError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("Failed to start the background runtime")]
    Runtime(#[source] std::io::Error),

    #[error("Display window failed")]
    Window(#[from] eframe::Error),
}
