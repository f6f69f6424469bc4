use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq)]
pub enum RdfsError {
    IOError(String),
    RPCError(String),
    // malformed endpoint URI, as opposed to a live endpoint we cannot reach
    EndpointError(String),
    UnreachableError(String),
    SessionClosed,
    InvalidPathError(String),
    AlreadyExistsError(String),
    NotFoundError(String),
    TransferError(String),
    ConfigError(String),
    ArgMissingError(String),
}

impl Display for RdfsError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for RdfsError {}

impl From<std::io::Error> for RdfsError {
    fn from(error: std::io::Error) -> Self {
        RdfsError::IOError(error.to_string())
    }
}

impl From<tonic::transport::Error> for RdfsError {
    fn from(error: tonic::transport::Error) -> Self {
        RdfsError::RPCError(error.to_string())
    }
}

impl From<toml::de::Error> for RdfsError {
    fn from(error: toml::de::Error) -> Self {
        RdfsError::ConfigError(error.to_string())
    }
}

impl From<tonic::Status> for RdfsError {
    fn from(status: tonic::Status) -> Self {
        let message = status.message().to_owned();
        match status.code() {
            tonic::Code::NotFound => RdfsError::NotFoundError(message),
            tonic::Code::AlreadyExists => RdfsError::AlreadyExistsError(message),
            tonic::Code::InvalidArgument => RdfsError::InvalidPathError(message),
            _ => RdfsError::RPCError(status.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, RdfsError>;
