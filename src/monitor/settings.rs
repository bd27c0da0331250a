/// How decoded records are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Output {
    /// Live full screen dashboard
    Dashboard,
    /// One JSON object per record on stdout
    Json,
}

/// Monitor [Settings]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Local UDP port, bound on all IPv4 interfaces
    pub port: u16,

    /// Selected [Output]
    pub output: Output,
}
