/// Common options used when opening a catalog file.
#[derive(Clone, Debug, Default)]
pub struct CatalogOpenOptions {
    /// Whether to create the catalog (and its schema) if it doesn't exist.
    pub create_if_missing: bool,
    /// Open the SQLite file read-only.
    pub read_only: bool,
    /// Instance name reported for the catalog; defaults to the file stem.
    pub instance: Option<String>,
}

impl CatalogOpenOptions {
    /// Options for opening an existing catalog read-only.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    /// Overrides the instance name.
    pub fn instance(mut self, name: impl Into<String>) -> Self {
        self.instance = Some(name.into());
        self
    }
}
