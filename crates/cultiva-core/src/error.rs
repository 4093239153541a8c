use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown actuator '{0}': expected one of irrigator, heater, lighting, uv, shading")]
    UnknownActuator(String),

    #[error("invalid mode '{0}': expected off, auto or on")]
    InvalidMode(String),

    #[error("state is missing actuator '{0}'")]
    MissingActuator(String),

    #[error("invalid assignment '{0}': expected <actuator>=<mode>")]
    InvalidAssignment(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
