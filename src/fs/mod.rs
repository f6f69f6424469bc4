pub mod client;
mod remote_filesystem;
mod session;

pub use remote_filesystem::RemoteFileSystem;
pub use session::Session;
