use crate::config::Config;
use crate::entry::{DirEntry, EntryKind};
use crate::error::Result;
use crate::fs::Session;
use crate::io::{RemoteFileReader, RemoteFileWriter};
use crate::proto;

use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use tracing::debug;

pub struct RdfsClient<'a> {
    session: &'a Session,
    config: &'a Config,
}

impl<'a> RdfsClient<'a> {
    pub fn new(session: &'a Session, config: &'a Config) -> Self {
        Self { session, config }
    }

    /// Creates `path` and all of its missing ancestors. Succeeds silently if
    /// the directory already exists.
    pub async fn mkdir(&self, path: impl Into<String>) -> Result<()> {
        let mut client = self.session.client()?;
        let path = path.into();
        debug!("Creating directory {}", path);
        client.mkdir(proto::MkdirRequest { path }).await?;
        Ok(())
    }

    /// Reports whether `path` exists and what kind of object it names.
    /// Never creates anything.
    pub async fn exists(&self, path: impl Into<String>) -> Result<Option<EntryKind>> {
        let mut client = self.session.client()?;
        let response = client
            .get_file_info(proto::FileInfoRequest { path: path.into() })
            .await?;
        let proto::FileInfoResponse {
            exists,
            is_dir,
            len: _,
        } = response.into_inner();

        if !exists {
            Ok(None)
        } else if is_dir {
            Ok(Some(EntryKind::Directory))
        } else {
            Ok(Some(EntryKind::File))
        }
    }

    /// Moves `src` to `dst`. Fails with `AlreadyExistsError` when `dst`
    /// exists; neither path is changed in that case.
    pub async fn rename(&self, src: impl Into<String>, dst: impl Into<String>) -> Result<()> {
        let mut client = self.session.client()?;
        let (src, dst) = (src.into(), dst.into());
        debug!("Renaming {} to {}", src, dst);
        client.rename(proto::RenameRequest { src, dst }).await?;
        Ok(())
    }

    /// Removes a file, or a whole directory tree when `recursive` is set.
    /// Returns whether anything was removed; a missing path is not an error.
    pub async fn delete(&self, path: impl Into<String>, recursive: bool) -> Result<bool> {
        let mut client = self.session.client()?;
        let path = path.into();
        debug!("Deleting {} (recursive: {})", path, recursive);
        let response = client.delete(proto::DeleteRequest { path, recursive }).await?;
        let proto::DeleteResponse { removed } = response.into_inner();
        Ok(removed)
    }

    /// Lists the immediate children of a directory, in the order the remote
    /// service returned them, each annotated with a 1-based index.
    pub async fn ls(&self, path: impl Into<String>) -> Result<Vec<DirEntry>> {
        let mut client = self.session.client()?;
        let response = client
            .list_directory(proto::ListRequest { path: path.into() })
            .await?;
        let proto::ListResponse { entries } = response.into_inner();

        Ok(entries
            .into_iter()
            .enumerate()
            .map(|(position, status)| DirEntry::from_status(position + 1, status))
            .collect())
    }

    /// Uploads a local file to `dst` on the remote filesystem.
    pub async fn put(&self, src: &str, dst: impl Into<String>) -> Result<()> {
        let mut reader = BufReader::new(File::open(src).await?);
        let mut writer = RemoteFileWriter::create(self.session, dst, self.config).await?;

        let mut buf = vec![0; self.config.transfer.chunk_bytes()];
        loop {
            let read = reader.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            writer.write(&buf[..read]).await?;
        }
        writer.shutdown().await?;

        Ok(())
    }

    /// Downloads the remote file `src` to a local destination.
    pub async fn get(&self, src: impl Into<String>, dst: &str) -> Result<()> {
        let mut writer = BufWriter::new(File::create(dst).await?);
        let result = self.read_into(src, &mut writer).await;
        writer.shutdown().await?;
        result
    }

    /// Streams the contents of a remote file into an arbitrary byte sink.
    pub async fn read_into(
        &self,
        src: impl Into<String>,
        sink: &mut (impl AsyncWrite + Unpin),
    ) -> Result<()> {
        let mut reader = RemoteFileReader::open(self.session, src).await?;

        let mut buf = vec![0; self.config.transfer.chunk_bytes()];
        loop {
            let read = reader.read(&mut buf).await?;
            if read == 0 {
                break;
            }
            sink.write_all(&buf[..read]).await?;
        }
        sink.flush().await?;

        Ok(())
    }
}
