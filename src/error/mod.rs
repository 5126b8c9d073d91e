use std::{io, path::PathBuf};

use thiserror::Error;

/// Fatal conditions of a run. Skipped flow-log lines and unknown
/// protocols are routine and never show up here.
#[derive(Error, Debug)]
pub enum Error {
    /// Input file could not be opened
    #[error("cannot open {}: {source}", .path.display())]
    ResourceNotFound {
        path:   PathBuf,
        source: io::Error,
    },

    /// Bad row in the lookup table
    #[error("{}:{line}: malformed lookup row: {reason}", .path.display())]
    LookupFormat {
        path:   PathBuf,
        line:   u64,
        reason: String,
    },

    /// Eligible flow record with a corrupt numeric field
    #[error("{}:{line}: malformed flow record: {reason}", .path.display())]
    FlowFormat {
        path:   PathBuf,
        line:   u64,
        reason: String,
    },

    /// The CSV reader gave up on the lookup table
    #[error("{}: {source}", .path.display())]
    Csv {
        path:   PathBuf,
        source: csv::Error,
    },

    /// Read or write failure after the file was opened
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path:   PathBuf,
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Process exit status for this error. 2 is left to clap for
    /// command-line usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ResourceNotFound { .. } => 4,
            Error::LookupFormat { .. } | Error::FlowFormat { .. } | Error::Csv { .. } => 3,
            Error::Io { .. } => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_non_zero() {
        let errors = [
            Error::ResourceNotFound {
                path:   "a".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            },
            Error::LookupFormat { path: "a".into(), line: 2, reason: "x".into() },
            Error::FlowFormat { path: "a".into(), line: 2, reason: "x".into() },
            Error::Csv {
                path:   "a".into(),
                source: csv::Error::from(io::Error::from(io::ErrorKind::InvalidData)),
            },
            Error::Io { path: "a".into(), source: io::Error::from(io::ErrorKind::Other) },
        ];
        let codes: Vec<i32> = errors.iter().map(Error::exit_code).collect();
        assert_eq!(codes, vec![4, 3, 3, 3, 1]);
    }

    #[test]
    fn test_message_carries_path_and_line() {
        let err = Error::FlowFormat {
            path:   "flow_logs.txt".into(),
            line:   7,
            reason: "destination port \"abc\" is not a number".into(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("flow_logs.txt:7:"));
        assert!(msg.contains("abc"));
    }
}
