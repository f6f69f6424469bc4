use crate::proto;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One immediate child of a listed directory, as reported by the remote
/// filesystem service. Indices are 1-based and assigned in the order the
/// service returned the entries.
#[derive(Clone, Debug, PartialEq)]
pub struct DirEntry {
    pub index: usize,
    pub path: String,
    pub len: u64,
    pub owner: String,
    pub group: String,
    /// Milliseconds since the unix epoch.
    pub modification_time: u64,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn from_status(index: usize, status: proto::EntryStatus) -> Self {
        let proto::EntryStatus {
            path,
            len,
            owner,
            group,
            modification_time,
            is_dir,
        } = status;
        let kind = if is_dir {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        Self {
            index,
            path,
            len,
            owner,
            group,
            modification_time,
            kind,
        }
    }

    /// Last component of the entry's path.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    pub fn print_size(&self) -> String {
        display_size(self.len)
    }
}

/// Renders a byte count with a unit suffix, e.g. `1.5 kB`.
pub fn display_size(len: u64) -> String {
    static UNITS: [&str; 4] = ["B", "kB", "MB", "GB"];

    let mut size = len as f64;
    let mut unit = 0;
    while size >= 1000.0 && unit < UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", len, UNITS[unit])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
