// SPDX-License-Identifier: MPL-2.0

//! Crate-wide error type

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("counter read failed: {0}")]
    Counters(String),

    #[error("interface {0} not found")]
    InterfaceMissing(String),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bad address: {0}")]
    MalformedAddress(String),

    #[error("display: {0}")]
    Display(String),

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
