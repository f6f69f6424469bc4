use crate::config::Config;
use crate::error::{Result, RdfsError};
use crate::fs::Session;
use crate::proto;
use crate::proto::write_file_request::Content;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use tokio_stream::wrappers::ReceiverStream;

/// Writes a remote file through the service's client-streaming RPC.
///
/// Bytes are buffered locally and shipped in fixed-size chunks. The service
/// acknowledges the total byte count on shutdown; a mismatch against the
/// bytes sent surfaces as a transfer error.
pub struct RemoteFileWriter {
    path: String,
    sender: mpsc::Sender<proto::WriteFileRequest>,
    response: JoinHandle<Result<proto::WriteFileResponse>>,
    chunk_size: usize,
    buffer: Vec<u8>,
    bytes_sent: u64,
}

impl RemoteFileWriter {
    pub async fn create(
        session: &Session,
        path: impl Into<String>,
        config: &Config,
    ) -> Result<Self> {
        let mut client = session.client()?;
        let path = path.into();

        let (sender, receiver) = mpsc::channel(8);
        sender
            .send(proto::WriteFileRequest {
                content: Some(Content::Path(path.clone())),
            })
            .await
            .map_err(|_| RdfsError::TransferError(format!("Could not open {} for write", path)))?;

        let response = tokio::spawn(async move {
            let response = client.write_file(ReceiverStream::new(receiver)).await?;
            Ok(response.into_inner())
        });

        Ok(Self {
            path,
            sender,
            response,
            chunk_size: config.transfer.chunk_bytes(),
            buffer: Vec::new(),
            bytes_sent: 0,
        })
    }

    pub async fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(buf);
        while self.buffer.len() >= self.chunk_size {
            let rest = self.buffer.split_off(self.chunk_size);
            let chunk = std::mem::replace(&mut self.buffer, rest);
            self.send_chunk(chunk).await?;
        }
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<()> {
        if !self.buffer.is_empty() {
            let chunk = std::mem::take(&mut self.buffer);
            self.send_chunk(chunk).await?;
        }
        Ok(())
    }

    /// Sends any buffered bytes, completes the RPC and verifies the service
    /// acknowledged every byte written.
    pub async fn shutdown(mut self) -> Result<()> {
        self.flush().await?;
        drop(self.sender);

        let response = self
            .response
            .await
            .map_err(|err| RdfsError::RPCError(err.to_string()))??;

        if response.bytes_received != self.bytes_sent {
            return Err(RdfsError::TransferError(format!(
                "Sent {} bytes to {}, service acknowledged {}",
                self.bytes_sent, self.path, response.bytes_received
            )));
        }

        Ok(())
    }

    async fn send_chunk(&mut self, chunk: Vec<u8>) -> Result<()> {
        let len = chunk.len() as u64;
        let request = proto::WriteFileRequest {
            content: Some(Content::Data(chunk)),
        };
        if self.sender.send(request).await.is_err() {
            // receiver gone, the RPC already failed; surface its error
            let result = (&mut self.response)
                .await
                .map_err(|err| RdfsError::RPCError(err.to_string()))?;
            return match result {
                Ok(_) => Err(RdfsError::TransferError(format!(
                    "Write stream for {} closed early",
                    self.path
                ))),
                Err(err) => Err(err),
            };
        }
        self.bytes_sent += len;
        Ok(())
    }
}
