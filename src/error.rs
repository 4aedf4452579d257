//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("comms error: {0}")]
    Comms(String),

    #[error("dialog error: {0}")]
    Dialog(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("TG_BOT_TOKEN is not set".into());
        assert!(e.to_string().starts_with("config error"));
        assert!(e.to_string().contains("TG_BOT_TOKEN"));
    }

    #[test]
    fn dialog_error_display() {
        let e = AppError::Dialog("conversation lock poisoned".into());
        assert!(e.to_string().contains("lock poisoned"));
    }

    #[test]
    fn comms_error_display() {
        let e = AppError::Comms("component panicked".into());
        assert!(e.to_string().contains("component panicked"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let e: AppError = io_err.into();
        assert!(e.to_string().contains("io error"));
        let _: &dyn Error = &e;
    }
}
