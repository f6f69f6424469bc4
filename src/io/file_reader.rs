use crate::error::{Result, RdfsError};
use crate::fs::Session;
use crate::proto;

use tonic::Streaming;

/// Reads a remote file as a sequence of chunks streamed by the service.
///
/// The file length reported at open time is checked against the bytes
/// actually received, so a stream that ends early surfaces as a transfer
/// error instead of silent truncation.
pub struct RemoteFileReader {
    path: String,
    stream: Streaming<proto::FileChunk>,
    expected_len: u64,
    bytes_read: u64,
    // buffers the last received chunk
    buffer: Vec<u8>,
    buffer_pos: usize,
}

impl RemoteFileReader {
    pub async fn open(session: &Session, path: impl Into<String>) -> Result<Self> {
        let mut client = session.client()?;
        let path = path.into();

        let response = client
            .get_file_info(proto::FileInfoRequest { path: path.clone() })
            .await?;
        let proto::FileInfoResponse {
            exists,
            is_dir,
            len,
        } = response.into_inner();

        if !exists {
            return Err(RdfsError::NotFoundError(path));
        }
        if is_dir {
            return Err(RdfsError::InvalidPathError(format!(
                "{} is a directory",
                path
            )));
        }

        let stream = client
            .read_file(proto::ReadFileRequest { path: path.clone() })
            .await?
            .into_inner();

        Ok(Self {
            path,
            stream,
            expected_len: len,
            bytes_read: 0,
            buffer: Vec::new(),
            buffer_pos: 0,
        })
    }

    /// Copies up to `buf.len()` bytes into `buf` and returns the number of
    /// bytes copied. A return of 0 means the whole file was read.
    pub async fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        while self.buffer_pos == self.buffer.len() {
            match self.stream.message().await? {
                Some(chunk) => {
                    self.buffer = chunk.data;
                    self.buffer_pos = 0;
                }
                None => {
                    if self.bytes_read != self.expected_len {
                        return Err(RdfsError::TransferError(format!(
                            "Expected {} bytes from {}, received {}",
                            self.expected_len, self.path, self.bytes_read
                        )));
                    }
                    return Ok(0);
                }
            }
        }

        let available = self.buffer.len() - self.buffer_pos;
        let bytes_read = std::cmp::min(available, buf.len());
        buf[..bytes_read].copy_from_slice(&self.buffer[self.buffer_pos..self.buffer_pos + bytes_read]);
        self.buffer_pos += bytes_read;
        self.bytes_read += bytes_read as u64;

        Ok(bytes_read)
    }
}
