use serde::{Deserialize, Serialize};

// ─── Core types ───────────────────────────────────────────────────────────────

/// Outcome reported by a verification pass for one entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    /// Entry and its backing file agree
    Ok,
    /// Node and all of its descendants are present
    Complete,
    /// Backing file content no longer matches the entry
    FileChanged,
    /// Backing file is gone
    FileMissing,
    /// Backing file could not be read
    FileError,
    /// Some descendants are missing
    Incomplete,
    /// Not reachable from any root
    Orphan,
}

impl Status {
    /// Every status, in declaration order
    pub const ALL: [Status; 7] = [
        Status::Ok,
        Status::Complete,
        Status::FileChanged,
        Status::FileMissing,
        Status::FileError,
        Status::Incomplete,
        Status::Orphan,
    ];

    /// Whether this status describes an entry that is still usable
    pub fn is_healthy(&self) -> bool {
        matches!(self, Status::Ok | Status::Complete)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Ok => write!(f, "ok"),
            Status::Complete => write!(f, "complete"),
            Status::FileChanged => write!(f, "changed"),
            Status::FileMissing => write!(f, "no-file"),
            Status::FileError => write!(f, "error"),
            Status::Incomplete => write!(f, "incomplete"),
            Status::Orphan => write!(f, "orphan"),
        }
    }
}

/// Raw content identifier of a filestore entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(Vec<u8>);

impl Key {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Key(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Key(bytes)
    }
}

impl From<&[u8]> for Key {
    fn from(bytes: &[u8]) -> Self {
        Key(bytes.to_vec())
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// A single entry reported by a verification pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRes {
    pub key: Key,
    pub status: Status,
}

impl ListRes {
    pub fn new(key: impl Into<Key>, status: Status) -> Self {
        Self {
            key: key.into(),
            status,
        }
    }

    /// Identifier bytes as stored
    pub fn raw_key(&self) -> &[u8] {
        self.key.as_bytes()
    }
}

/// Lazily produced verification results. An `Err` item ends the scan.
pub type ScanStream = Box<dyn Iterator<Item = anyhow::Result<ListRes>> + Send>;
