#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub label: String,  // Display name, unique within a catalog
    pub token: String,  // Handed to the OS as-is (executable, applet, URI)
}

impl CatalogEntry {
    pub fn new(label: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            token: token.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// The default handler accepted the token.
    Opened,
    /// The default handler could not resolve the token, the shell ran it.
    ShellFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchAttempt {
    pub label: String,
    pub token: String,
    pub outcome: LaunchOutcome,
}
