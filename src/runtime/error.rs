use thiserror::Error;

///////////////////////////////
/// Fatal conditions. Anything recoverable is counted in a RunSummary instead
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input at {:?} not found.", path)]
    InputNotFound { path: std::path::PathBuf },

    #[error("Input at {:?} is invalid{}.", path, Error::format_msg_as_detail(msg))]
    InputNotValid {
        path: std::path::PathBuf,
        msg: Option<String>,
    },

    #[error("Table at {:?} lacks the required column '{}'", path, column)]
    SchemaMismatch {
        path: std::path::PathBuf,
        column: String,
    },

    #[error("Failed parsing {}{}", context, Error::format_msg_as_detail(msg))]
    ParseError {
        context: String,
        msg: Option<String>,
    },

    #[error("I/O error on {:?}: {}", path, source)]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    #[cold]
    pub fn input_not_found<P: AsRef<std::path::Path>>(path: P) -> Self {
        Error::InputNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[cold]
    pub fn input_not_valid<P: AsRef<std::path::Path>, M: Into<String>>(
        path: P,
        msg: Option<M>,
    ) -> Self {
        Error::InputNotValid {
            path: path.as_ref().to_path_buf(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn schema_mismatch<P: AsRef<std::path::Path>, C: Into<String>>(path: P, column: C) -> Self {
        Error::SchemaMismatch {
            path: path.as_ref().to_path_buf(),
            column: column.into(),
        }
    }

    #[cold]
    pub fn parse_error<C: Into<String>, M: Into<String>>(context: C, msg: Option<M>) -> Self {
        Error::ParseError {
            context: context.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn io<P: AsRef<std::path::Path>>(path: P, source: std::io::Error) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn format_msg_as_detail(msg: &Option<String>) -> String {
        match msg {
            Some(m) => format!(" ({})", m),
            None => String::new(),
        }
    }
}

///////////////////////////////
/// Check that an input file exists before a stage starts reading it
pub fn require_input<P: AsRef<std::path::Path>>(path: P) -> Result<(), Error> {
    let path = path.as_ref();
    if path.is_file() {
        Ok(())
    } else {
        Err(Error::input_not_found(path))
    }
}
