mod file_reader;
mod file_writer;

pub use file_reader::RemoteFileReader;
pub use file_writer::RemoteFileWriter;
