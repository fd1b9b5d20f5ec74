//! File uploads for `multipart/form-data` requests.
//!
//! Paths are opened when a `post_file` call starts and every handle is an
//! owned value, so whichever way the call ends (success, transport failure,
//! a later path failing to open) the handles are dropped and closed before
//! the call returns. The transport turns a `Multipart` into ureq's multipart
//! form and streams each reader into the body.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use crate::error::ClientError;

/// One file to upload: a path to open, or something already open.
pub enum Upload {
    Path(PathBuf),
    Reader {
        file_name: String,
        reader: Box<dyn Read + Send>,
    },
}

impl Upload {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Upload::Path(path.into())
    }

    pub fn reader(file_name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Upload::Reader {
            file_name: file_name.into(),
            reader: Box::new(reader),
        }
    }
}

impl fmt::Debug for Upload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upload::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Upload::Reader { file_name, .. } => f.debug_struct("Reader").field("file_name", file_name).finish(),
        }
    }
}

/// An opened upload bound to its form field.
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    reader: Box<dyn Read + Send>,
}

impl FilePart {
    /// Split into field name, file name and the open reader.
    pub fn into_parts(self) -> (String, String, Box<dyn Read + Send>) {
        (self.field, self.file_name, self.reader)
    }
}

impl fmt::Debug for FilePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilePart")
            .field("field", &self.field)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Open every upload. Stops at the first path that cannot be opened; the
/// parts opened before it are dropped on the way out.
pub fn open_all<I, K>(files: I) -> Result<Vec<FilePart>, ClientError>
where
    I: IntoIterator<Item = (K, Upload)>,
    K: Into<String>,
{
    let mut parts = Vec::new();
    for (field, upload) in files {
        let field = field.into();
        let part = match upload {
            Upload::Path(path) => {
                let file = File::open(&path).map_err(|source| ClientError::FileAccess {
                    path: path.clone(),
                    source,
                })?;
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| field.clone());
                FilePart {
                    field,
                    file_name,
                    reader: Box::new(file),
                }
            }
            Upload::Reader { file_name, reader } => FilePart {
                field,
                file_name,
                reader,
            },
        };
        parts.push(part);
    }
    Ok(parts)
}

/// Plain form fields plus file parts. The transport streams the parts into
/// the request body; nothing here renders wire bytes.
#[derive(Debug, Default)]
pub struct Multipart {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    #[test]
    fn missing_path_reports_file_access() {
        let err = open_all([("doc", Upload::path("/definitely/not/here.bin"))]).unwrap_err();
        match err {
            ClientError::FileAccess { path, .. } => assert_eq!(path, PathBuf::from("/definitely/not/here.bin")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn path_uploads_use_the_file_name() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"payload").unwrap();
        let parts = open_all([("doc", Upload::path(file.path()))]).unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].field, "doc");
        assert_eq!(
            parts[0].file_name,
            file.path().file_name().unwrap().to_string_lossy()
        );
    }

    #[test]
    fn reader_uploads_hand_back_their_stream() {
        let parts = open_all([("doc", Upload::reader("a.txt", Cursor::new(b"abc".to_vec())))]).unwrap();
        let (field, file_name, mut reader) = parts.into_iter().next().unwrap().into_parts();
        assert_eq!(field, "doc");
        assert_eq!(file_name, "a.txt");
        let mut contents = String::new();
        reader.read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "abc");
    }
}
