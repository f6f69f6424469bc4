use crate::config::Config;
use crate::entry::{DirEntry, EntryKind};
use crate::error::Result;
use crate::fs::client::RdfsClient;
use crate::fs::Session;

use tokio::io::AsyncWrite;

/// High-level facade over a connected session, mirroring the operations the
/// remote filesystem service exposes.
pub struct RemoteFileSystem<'a> {
    client: RdfsClient<'a>,
}

impl<'a> RemoteFileSystem<'a> {
    pub fn new(session: &'a Session, config: &'a Config) -> Self {
        let client = RdfsClient::new(session, config);
        Self { client }
    }

    pub async fn mkdir(&self, path: impl Into<String>) -> Result<()> {
        self.client.mkdir(path).await
    }

    pub async fn exists(&self, path: impl Into<String>) -> Result<Option<EntryKind>> {
        self.client.exists(path).await
    }

    pub async fn rename(&self, src: impl Into<String>, dst: impl Into<String>) -> Result<()> {
        self.client.rename(src, dst).await
    }

    pub async fn delete(&self, path: impl Into<String>, recursive: bool) -> Result<bool> {
        self.client.delete(path, recursive).await
    }

    pub async fn ls(&self, path: impl Into<String>) -> Result<Vec<DirEntry>> {
        self.client.ls(path).await
    }

    pub async fn put(&self, src: &str, dst: impl Into<String>) -> Result<()> {
        self.client.put(src, dst).await
    }

    pub async fn get(&self, src: impl Into<String>, dst: &str) -> Result<()> {
        self.client.get(src, dst).await
    }

    pub async fn read_into(
        &self,
        src: impl Into<String>,
        sink: &mut (impl AsyncWrite + Unpin),
    ) -> Result<()> {
        self.client.read_into(src, sink).await
    }
}
