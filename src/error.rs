use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("window could not be created: {0}")]
    Window(String),

    #[error("frame could not be presented: {0}")]
    Present(String),

    #[error("could not {} fullscreen: {reason}", direction(.entering))]
    Fullscreen { entering: bool, reason: String },

    #[error("canvas unavailable: {0}")]
    Canvas(String),

    #[error("invalid window configuration: {0}")]
    InvalidConfig(String),
}

fn direction(entering: &bool) -> &'static str {
    if *entering { "enter" } else { "leave" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullscreen_names_direction() {
        let err = PlatformError::Fullscreen {
            entering: true,
            reason: "no display".into(),
        };
        assert_eq!(err.to_string(), "could not enter fullscreen: no display");

        let err = PlatformError::Fullscreen {
            entering: false,
            reason: "gone".into(),
        };
        assert_eq!(err.to_string(), "could not leave fullscreen: gone");
    }

    #[test]
    fn window_includes_reason() {
        let msg = PlatformError::Window("no X server".into()).to_string();
        assert!(msg.contains("no X server"), "got: {msg}");
    }

    #[test]
    fn is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync + std::error::Error>() {}
        assert_send_sync::<PlatformError>();
    }
}
