use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// One broker of the managed cluster.
///
/// The id is assigned by the cluster and never changes for the lifetime of
/// the node. The folder set lists the data directories the broker may host
/// replica logs in; migration targets are validated against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: i32,
    pub host: String,
    pub port: u16,
    /// Data-folder paths available on this broker.
    pub folders: BTreeSet<String>,
}

impl Node {
    pub fn new(
        id: i32,
        host: impl Into<String>,
        port: u16,
        folders: impl IntoIterator<Item = String>,
    ) -> Self {
        Node {
            id,
            host: host.into(),
            port,
            folders: folders.into_iter().collect(),
        }
    }

    /// True if `path` is one of this broker's data folders.
    pub fn has_folder(&self, path: &str) -> bool {
        self.folders.contains(path)
    }
}

impl Display for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.id, self.host, self.port)
    }
}
