use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use crate::{ByteSink, StreamError};

const CHUNK_SIZE: usize = 64 * 1024;

/// An open replay file that we keep reading from as it grows.
#[derive(Debug)]
pub(crate) struct TailSession {
    path: PathBuf,
    file: File,
    forwarded: u64,
    buffer: Vec<u8>,
}

impl TailSession {
    pub fn open(path: &Path) -> Result<Self, StreamError> {
        let file = File::open(path).map_err(|source| StreamError::TailRead {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            forwarded: 0,
            buffer: vec![0; CHUNK_SIZE],
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forwards everything appended since the last pump. Returns the number of bytes read.
    pub fn pump<S: ByteSink>(&mut self, sink: &mut S) -> Result<usize, StreamError> {
        let mut total = 0;

        loop {
            let read = match self.file.read(&mut self.buffer) {
                Ok(0) => break,
                Ok(read) => read,
                Err(error) if error.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(StreamError::TailRead {
                        path: self.path.clone(),
                        source,
                    });
                },
            };

            sink.write_chunk(&self.buffer[..read]);
            total += read;
        }

        self.forwarded += total as u64;
        Ok(total)
    }

    /// Drains whatever is left and closes the file.
    pub fn finish<S: ByteSink>(mut self, sink: &mut S) -> Result<u64, StreamError> {
        self.pump(sink)?;
        Ok(self.forwarded)
    }
}
