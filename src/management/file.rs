use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use super::TokenStore;
use crate::{Error, Result, types::Tokens};

/// Owner read/write/execute for the token directory.
pub const DIR_MODE: u32 = 0o700;
/// Owner read/write for the token file.
pub const FILE_MODE: u32 = 0o600;

/// Stores tokens as a single JSON document in a private directory.
///
/// The parent directory belongs to the store. Its mode is forced to 0700 on
/// every save, whether or not it already existed.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_local_dir>/sporl/cache/<name>.json`, falling back to the
    /// working directory when the platform has no data directory.
    pub fn default_for(name: &str) -> Self {
        Self::new(Self::default_path(name))
    }

    pub fn default_path(name: &str) -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(format!("sporl/cache/{name}.json"));
        path
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }

    async fn ensure_dir(&self) -> Result<()> {
        let Some(parent) = self.path.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() {
            return Ok(());
        }
        if async_fs::metadata(parent).await.is_ok() {
            return restrict(parent, DIR_MODE).await;
        }

        let mut builder = async_fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use async_fs::unix::DirBuilderExt;
            builder.mode(DIR_MODE);
        }
        builder
            .create(parent)
            .await
            .map_err(Error::FileAccessFailed)?;

        // mode() is filtered through the umask
        restrict(parent, DIR_MODE).await
    }

    /// Creates or truncates the temp file with owner-only access before
    /// anything is written to it.
    async fn prepare_temp(&self) -> Result<PathBuf> {
        let tmp = self.temp_path();
        let mut options = async_fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use async_fs::unix::OpenOptionsExt;
            options.mode(FILE_MODE);
        }
        options.open(&tmp).await.map_err(Error::FileAccessFailed)?;

        // a leftover temp file keeps its old mode
        restrict(&tmp, FILE_MODE).await?;
        Ok(tmp)
    }
}

#[cfg(unix)]
async fn restrict(path: &std::path::Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let meta = async_fs::metadata(path)
        .await
        .map_err(Error::FileAccessFailed)?;
    let current = meta.permissions().mode() & 0o777;
    if current != mode {
        if current & 0o077 != 0 {
            warn!(
                "Stripping group/world permissions from {} ({:o})",
                path.display(),
                current
            );
        }
        async_fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .await
            .map_err(Error::FileAccessFailed)?;
    }
    Ok(())
}

#[cfg(not(unix))]
async fn restrict(_path: &std::path::Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save(&self, tokens: &Tokens) -> Result<()> {
        self.ensure_dir().await?;

        let json = serde_json::to_string_pretty(tokens).map_err(Error::EncodingFailed)?;
        let tmp = self.prepare_temp().await?;
        async_fs::write(&tmp, json)
            .await
            .map_err(Error::FileAccessFailed)?;

        // rename is atomic on the same filesystem, readers see old or new
        async_fs::rename(&tmp, &self.path)
            .await
            .map_err(Error::FileAccessFailed)?;
        debug!("Saved tokens to {}", self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Tokens>> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::FileAccessFailed(e)),
        };
        restrict(&self.path, FILE_MODE).await?;

        let tokens = serde_json::from_str(&content).map_err(Error::DecodingFailed)?;
        Ok(Some(tokens))
    }

    async fn clear(&self) -> Result<()> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::FileAccessFailed(e)),
        }
    }
}
