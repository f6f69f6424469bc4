pub mod config;
pub mod entry;
pub mod error;
pub mod fs;
pub mod io;

pub mod proto {
    tonic::include_proto!("rdfs.proto");
}
