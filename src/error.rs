use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Pivotal Tracker API Token and Project ID are required")]
    MissingCredentials,

    #[error("Pivotal Tracker full name is required (--full-name or bushy-pivotal.full-name)")]
    MissingFullName,

    #[error("Pivotal Tracker project id must be numeric, got '{0}'")]
    InvalidProjectId(String),

    #[error("invalid boolean '{value}' for {key}")]
    InvalidBool { key: String, value: String },

    #[error(
        "the platform {0} is not supported, please update your configuration with one of the following platforms: pivotal"
    )]
    UnsupportedPlatform(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid integer in <{field}>: '{value}'")]
    Integer { field: String, value: String },

    #[error("invalid timestamp in <{field}>: '{value}'")]
    Timestamp { field: String, value: String },

    #[error("malformed XML: {0}")]
    Xml(String),
}
