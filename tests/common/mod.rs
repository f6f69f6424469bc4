//! In-process stand-in for the remote filesystem service, implementing the
//! same protobuf contract the real service speaks.

#![allow(dead_code)]

use rdfs::proto;
use rdfs::proto::client_protocol_server::{ClientProtocol, ClientProtocolServer};
use rdfs::proto::write_file_request::Content;

use std::collections::BTreeMap;
use std::sync::Mutex;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, Duration};

use tokio_stream::wrappers::ReceiverStream;

use tonic::transport::Server;
use tonic::{Request, Response, Status, Streaming};

static MODIFICATION_TIME: u64 = 1_600_000_000_000;

enum Node {
    Directory,
    File(Vec<u8>),
}

/// Ways the mock service can misbehave, for exercising the client's byte
/// accounting.
#[derive(Clone, Copy, Default)]
pub struct Faults {
    /// Extra bytes added to every reported file length.
    pub inflate_read_len: u64,
    /// Bytes subtracted from the acknowledged write count.
    pub deflate_write_ack: u64,
}

#[derive(Default)]
pub struct MockDfs {
    // keyed by normalized absolute path; "/" is an implicit directory
    nodes: Mutex<BTreeMap<String, Node>>,
    faults: Faults,
}

impl MockDfs {
    pub fn with_faults(faults: Faults) -> Self {
        Self {
            nodes: Mutex::default(),
            faults,
        }
    }
}

fn normalize(path: &str) -> String {
    if path.len() > 1 {
        path.trim_end_matches('/').to_owned()
    } else {
        path.to_owned()
    }
}

fn parent_of(path: &str) -> String {
    match path.rfind('/') {
        Some(0) | None => String::from("/"),
        Some(idx) => path[..idx].to_owned(),
    }
}

fn ancestors(path: &str) -> Vec<String> {
    let mut result = vec![];
    let mut current = String::new();
    for component in path.split('/').filter(|component| !component.is_empty()) {
        current.push('/');
        current.push_str(component);
        result.push(current.clone());
    }
    result
}

#[tonic::async_trait]
impl ClientProtocol for MockDfs {
    async fn mkdir(
        &self,
        request: Request<proto::MkdirRequest>,
    ) -> std::result::Result<Response<proto::EmptyMessage>, Status> {
        let path = normalize(&request.into_inner().path);
        let mut nodes = self.nodes.lock().unwrap();
        for ancestor in ancestors(&path) {
            match nodes.get(&ancestor) {
                Some(Node::File(_)) => {
                    return Err(Status::invalid_argument(format!(
                        "{} is a file",
                        ancestor
                    )))
                }
                Some(Node::Directory) => {}
                None => {
                    nodes.insert(ancestor, Node::Directory);
                }
            }
        }
        Ok(Response::new(proto::EmptyMessage {}))
    }

    async fn get_file_info(
        &self,
        request: Request<proto::FileInfoRequest>,
    ) -> std::result::Result<Response<proto::FileInfoResponse>, Status> {
        let path = normalize(&request.into_inner().path);
        let nodes = self.nodes.lock().unwrap();
        let response = if path == "/" {
            proto::FileInfoResponse {
                exists: true,
                is_dir: true,
                len: 0,
            }
        } else {
            match nodes.get(&path) {
                Some(Node::Directory) => proto::FileInfoResponse {
                    exists: true,
                    is_dir: true,
                    len: 0,
                },
                Some(Node::File(data)) => proto::FileInfoResponse {
                    exists: true,
                    is_dir: false,
                    len: data.len() as u64 + self.faults.inflate_read_len,
                },
                None => proto::FileInfoResponse {
                    exists: false,
                    is_dir: false,
                    len: 0,
                },
            }
        };
        Ok(Response::new(response))
    }

    async fn rename(
        &self,
        request: Request<proto::RenameRequest>,
    ) -> std::result::Result<Response<proto::EmptyMessage>, Status> {
        let proto::RenameRequest { src, dst } = request.into_inner();
        let (src, dst) = (normalize(&src), normalize(&dst));
        let mut nodes = self.nodes.lock().unwrap();

        if dst == "/" || nodes.contains_key(&dst) {
            return Err(Status::already_exists(dst));
        }
        if !nodes.contains_key(&src) {
            return Err(Status::not_found(src));
        }

        let prefix = format!("{}/", src);
        let moved = nodes
            .keys()
            .filter(|key| **key == src || key.starts_with(&prefix))
            .cloned()
            .collect::<Vec<_>>();
        for key in moved {
            let node = nodes.remove(&key).unwrap();
            let new_key = format!("{}{}", dst, &key[src.len()..]);
            nodes.insert(new_key, node);
        }

        Ok(Response::new(proto::EmptyMessage {}))
    }

    async fn delete(
        &self,
        request: Request<proto::DeleteRequest>,
    ) -> std::result::Result<Response<proto::DeleteResponse>, Status> {
        let proto::DeleteRequest { path, recursive } = request.into_inner();
        let path = normalize(&path);
        let mut nodes = self.nodes.lock().unwrap();

        match nodes.get(&path) {
            None => Ok(Response::new(proto::DeleteResponse { removed: false })),
            Some(Node::File(_)) => {
                nodes.remove(&path);
                Ok(Response::new(proto::DeleteResponse { removed: true }))
            }
            Some(Node::Directory) => {
                let prefix = format!("{}/", path);
                let children = nodes
                    .keys()
                    .filter(|key| key.starts_with(&prefix))
                    .cloned()
                    .collect::<Vec<_>>();
                if !children.is_empty() && !recursive {
                    return Err(Status::invalid_argument(format!(
                        "{} is a non-empty directory",
                        path
                    )));
                }
                for child in children {
                    nodes.remove(&child);
                }
                nodes.remove(&path);
                Ok(Response::new(proto::DeleteResponse { removed: true }))
            }
        }
    }

    async fn list_directory(
        &self,
        request: Request<proto::ListRequest>,
    ) -> std::result::Result<Response<proto::ListResponse>, Status> {
        let path = normalize(&request.into_inner().path);
        let nodes = self.nodes.lock().unwrap();

        if path != "/" {
            match nodes.get(&path) {
                Some(Node::Directory) => {}
                Some(Node::File(_)) => {
                    return Err(Status::invalid_argument(format!("{} is a file", path)))
                }
                None => return Err(Status::not_found(path)),
            }
        }

        let entries = nodes
            .iter()
            .filter(|(key, _)| parent_of(key) == path)
            .map(|(key, node)| {
                let (len, is_dir) = match node {
                    Node::Directory => (0, true),
                    Node::File(data) => (data.len() as u64, false),
                };
                proto::EntryStatus {
                    path: key.clone(),
                    len,
                    owner: String::from("test"),
                    group: String::from("test"),
                    modification_time: MODIFICATION_TIME,
                    is_dir,
                }
            })
            .collect();

        Ok(Response::new(proto::ListResponse { entries }))
    }

    type ReadFileStream = ReceiverStream<std::result::Result<proto::FileChunk, Status>>;

    async fn read_file(
        &self,
        request: Request<proto::ReadFileRequest>,
    ) -> std::result::Result<Response<Self::ReadFileStream>, Status> {
        let path = normalize(&request.into_inner().path);
        let data = {
            let nodes = self.nodes.lock().unwrap();
            match nodes.get(&path) {
                Some(Node::File(data)) => data.clone(),
                Some(Node::Directory) => {
                    return Err(Status::invalid_argument(format!(
                        "{} is a directory",
                        path
                    )))
                }
                None => return Err(Status::not_found(path)),
            }
        };

        let (sender, receiver) = mpsc::channel(16);
        tokio::spawn(async move {
            for chunk in data.chunks(1024) {
                let chunk = proto::FileChunk {
                    data: chunk.to_vec(),
                };
                if sender.send(Ok(chunk)).await.is_err() {
                    break;
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(receiver)))
    }

    async fn write_file(
        &self,
        request: Request<Streaming<proto::WriteFileRequest>>,
    ) -> std::result::Result<Response<proto::WriteFileResponse>, Status> {
        let mut stream = request.into_inner();

        let path = match stream.message().await? {
            Some(proto::WriteFileRequest {
                content: Some(Content::Path(path)),
            }) => normalize(&path),
            _ => {
                return Err(Status::invalid_argument(
                    "write stream must start with a path",
                ))
            }
        };

        let mut data = vec![];
        while let Some(message) = stream.message().await? {
            match message.content {
                Some(Content::Data(chunk)) => data.extend_from_slice(&chunk),
                _ => return Err(Status::invalid_argument("unexpected path mid-stream")),
            }
        }

        let mut nodes = self.nodes.lock().unwrap();
        if let Some(Node::Directory) = nodes.get(&path) {
            return Err(Status::invalid_argument(format!(
                "{} is a directory",
                path
            )));
        }
        for ancestor in ancestors(&parent_of(&path)) {
            nodes.entry(ancestor).or_insert(Node::Directory);
        }
        let bytes_received = (data.len() as u64).saturating_sub(self.faults.deflate_write_ack);
        nodes.insert(path, Node::File(data));

        Ok(Response::new(proto::WriteFileResponse { bytes_received }))
    }
}

/// Spawns the mock service on the given port and returns its shutdown handle.
pub async fn serve(port: u16) -> oneshot::Sender<()> {
    serve_with(port, MockDfs::default()).await
}

pub async fn serve_with(port: u16, mock: MockDfs) -> oneshot::Sender<()> {
    let address = format!("127.0.0.1:{}", port).parse().unwrap();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        Server::builder()
            .add_service(ClientProtocolServer::new(mock))
            .serve_with_shutdown(address, async {
                shutdown_rx.await.ok();
            })
            .await
            .unwrap();
    });

    // allow the service to bind
    sleep(Duration::from_millis(50)).await;

    shutdown_tx
}

pub fn endpoint(port: u16) -> String {
    format!("http://127.0.0.1:{}", port)
}
