use chrono::{DateTime, NaiveDateTime, Utc};
use filetime::FileTime;
use log::debug;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use crate::constants::MODIFY_TIME_FORMAT;
use crate::core_fs::error::FsError;
use crate::core_fs::path::secure_path;
use crate::core_fs::statvfs::{self, StatVfs};

/// FTP transfer type. ASCII rewrites client line endings to the server's
/// native newline; binary is byte-for-byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferType {
    Ascii,
    Binary,
}

impl TransferType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "A" => Some(TransferType::Ascii),
            "I" => Some(TransferType::Binary),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            TransferType::Ascii => 'A',
            TransferType::Binary => 'I',
        }
    }
}

/// One directory entry in the shape consumed by MLSD and the SFTP lister.
#[derive(Debug)]
pub struct DirEntryInfo {
    pub name: String,
    pub fact_line: String,
    pub metadata: Metadata,
}

/// Local filesystem serving a single root directory. All paths are virtual
/// (client-facing, rooted at `/`) and pass through the path guard before
/// any host call.
#[derive(Debug)]
pub struct LocalFs {
    root: PathBuf,
}

impl LocalFs {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, FsError> {
        let root = std::fs::canonicalize(root.as_ref())?;
        Ok(Self { root })
    }

    /// The virtual root as seen by clients.
    pub fn root_dir(&self) -> &'static str {
        "/"
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, virtual_path: &str) -> Result<PathBuf, FsError> {
        let cleaned = secure_path(virtual_path)?;
        if cleaned == "." {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(cleaned))
        }
    }

    pub async fn check_dir(&self, virtual_path: &str) -> Result<(), FsError> {
        let dir = self.host_path(virtual_path)?;
        let mut entries = tokio::fs::read_dir(&dir).await?;
        // A successful first poll is enough to prove readability.
        let _ = entries.next_entry().await?;
        Ok(())
    }

    pub async fn make_dir(&self, virtual_path: &str) -> Result<(), FsError> {
        let dir = self.host_path(virtual_path)?;
        tokio::fs::create_dir_all(&dir).await?;
        Ok(())
    }

    pub async fn dir(&self, virtual_path: &str) -> Result<Vec<DirEntryInfo>, FsError> {
        let dir = self.host_path(virtual_path)?;
        let mut entries = tokio::fs::read_dir(&dir).await?;
        let mut listing = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            let metadata = entry.metadata().await?;
            let fact_line = fact_line(&name, &metadata);
            listing.push(DirEntryInfo {
                name,
                fact_line,
                metadata,
            });
        }
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    /// Streams the file at `virtual_path` into `sink`, returning the number
    /// of bytes copied.
    pub async fn read_file<W>(&self, virtual_path: &str, sink: &mut W) -> Result<u64, FsError>
    where
        W: AsyncWrite + Unpin,
    {
        let path = self.host_path(virtual_path)?;
        let mut file = File::open(&path).await?;
        let copied = tokio::io::copy(&mut file, sink).await?;
        sink.flush().await?;
        Ok(copied)
    }

    /// Writes bytes from `src` to the file at `virtual_path`, truncating or
    /// appending. In ASCII mode every client line ending is rewritten to
    /// the server-native newline.
    pub async fn write_file<R>(
        &self,
        virtual_path: &str,
        src: &mut R,
        transfer_type: TransferType,
        append: bool,
    ) -> Result<u64, FsError>
    where
        R: AsyncRead + Unpin,
    {
        let path = self.host_path(virtual_path)?;
        let mut options = OpenOptions::new();
        options.write(true).create(true);
        if append {
            options.append(true);
        } else {
            options.truncate(true);
        }
        let mut file = options.open(&path).await?;

        let written = match transfer_type {
            TransferType::Binary => tokio::io::copy(src, &mut file).await?,
            TransferType::Ascii => {
                let newline: &[u8] = if cfg!(windows) { b"\r\n" } else { b"\n" };
                let mut reader = BufReader::new(src);
                let mut line: Vec<u8> = Vec::new();
                let mut written = 0u64;
                loop {
                    line.clear();
                    let n = reader.read_until(b'\n', &mut line).await?;
                    if n == 0 {
                        break;
                    }
                    if line.last() == Some(&b'\n') {
                        line.pop();
                    }
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    file.write_all(&line).await?;
                    file.write_all(newline).await?;
                    written += (line.len() + newline.len()) as u64;
                }
                written
            }
        };
        file.flush().await?;
        debug!("wrote {} bytes to {:?}", written, path);
        Ok(written)
    }

    /// Unlinks a file or removes an empty directory.
    pub async fn remove(&self, virtual_path: &str) -> Result<(), FsError> {
        let path = self.host_path(virtual_path)?;
        let metadata = tokio::fs::symlink_metadata(&path).await?;
        if metadata.is_dir() {
            tokio::fs::remove_dir(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }

    pub async fn rename(&self, from: &str, to: &str) -> Result<(), FsError> {
        let from = self.host_path(from)?;
        let to = self.host_path(to)?;
        tokio::fs::rename(&from, &to).await?;
        Ok(())
    }

    /// Sets both mtime and atime to the `YYYYMMDDHHMMSS` UTC timestamp.
    pub async fn modify_time(&self, virtual_path: &str, timestamp: &str) -> Result<(), FsError> {
        let parsed = NaiveDateTime::parse_from_str(timestamp, MODIFY_TIME_FORMAT)
            .map_err(|_| FsError::InvalidTimeFormat(timestamp.to_string()))?;
        let path = self.host_path(virtual_path)?;
        tokio::fs::metadata(&path).await?;
        let file_time = FileTime::from_unix_time(parsed.and_utc().timestamp(), 0);
        filetime::set_file_times(&path, file_time, file_time)?;
        Ok(())
    }

    /// Returns the machine-readable fact line used by MLST/MLSD together
    /// with the native file info.
    pub async fn stat(&self, virtual_path: &str) -> Result<(String, Metadata), FsError> {
        let path = self.host_path(virtual_path)?;
        let metadata = tokio::fs::metadata(&path).await?;
        let line = fact_line(&entry_name(&path), &metadata);
        Ok((line, metadata))
    }

    /// Same as `stat` but does not follow symlinks.
    pub async fn lstat(&self, virtual_path: &str) -> Result<(String, Metadata), FsError> {
        let path = self.host_path(virtual_path)?;
        let metadata = tokio::fs::symlink_metadata(&path).await?;
        let line = fact_line(&entry_name(&path), &metadata);
        Ok((line, metadata))
    }

    pub async fn set_stat(&self, virtual_path: &str, mode: u32) -> Result<(), FsError> {
        if mode == 0 {
            return Err(FsError::InvalidMode);
        }
        let path = self.host_path(virtual_path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(mode & 0o7777);
            tokio::fs::set_permissions(&path, permissions).await?;
        }
        #[cfg(not(unix))]
        {
            // Mode bits beyond read-only have no meaning here.
            let _ = path;
        }
        Ok(())
    }

    /// Creates a hard link at `new_path` pointing to `target`.
    pub async fn link(&self, new_path: &str, target: &str) -> Result<(), FsError> {
        let new_path = self.host_path(new_path)?;
        let target = self.host_path(target)?;
        tokio::fs::hard_link(&target, &new_path).await?;
        Ok(())
    }

    /// Creates a symbolic link at `new_path` pointing to `target`.
    pub async fn symlink(&self, new_path: &str, target: &str) -> Result<(), FsError> {
        let new_path = self.host_path(new_path)?;
        let target = self.host_path(target)?;
        #[cfg(unix)]
        {
            tokio::fs::symlink(&target, &new_path).await?;
            Ok(())
        }
        #[cfg(windows)]
        {
            tokio::fs::symlink_file(&target, &new_path).await?;
            Ok(())
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = (new_path, target);
            Err(FsError::Unsupported)
        }
    }

    pub async fn read_link(&self, virtual_path: &str) -> Result<PathBuf, FsError> {
        let path = self.host_path(virtual_path)?;
        Ok(tokio::fs::read_link(&path).await?)
    }

    /// Opens a random-access handle, used by the SFTP read/write requests.
    pub async fn open(
        &self,
        virtual_path: &str,
        options: &OpenOptions,
    ) -> Result<File, FsError> {
        let path = self.host_path(virtual_path)?;
        Ok(options.open(&path).await?)
    }

    pub fn stat_vfs(&self, virtual_path: &str) -> Result<StatVfs, FsError> {
        let path = self.host_path(virtual_path)?;
        statvfs::stat_vfs(&path)
    }
}

fn entry_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| String::from("/"))
}

/// The per-entry fact line: any deviation breaks interop with MLSD clients.
fn fact_line(name: &str, metadata: &Metadata) -> String {
    let file_type = if metadata.is_dir() { "dir" } else { "file" };
    format!(
        "Type={};Size={};Modify={};Perm={};UNIX.ownername={};UNIX.groupname={}; {}",
        file_type,
        metadata.len(),
        format_modify(metadata),
        mode_string(metadata),
        "owner",
        "group",
        name
    )
}

fn format_modify(metadata: &Metadata) -> String {
    match metadata.modified() {
        Ok(modified) => {
            let utc: DateTime<Utc> = modified.into();
            utc.format(MODIFY_TIME_FORMAT).to_string()
        }
        Err(_) => String::from("00000000000000"),
    }
}

#[cfg(unix)]
fn mode_string(metadata: &Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;
    let mode = metadata.permissions().mode();
    let mut out = String::with_capacity(10);
    out.push(if metadata.is_dir() {
        'd'
    } else if metadata.file_type().is_symlink() {
        'l'
    } else {
        '-'
    });
    for shift in [6u32, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
fn mode_string(metadata: &Metadata) -> String {
    if metadata.is_dir() {
        String::from("drwxrwxrwx")
    } else if metadata.permissions().readonly() {
        String::from("-r--r--r--")
    } else {
        String::from("-rw-rw-rw-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_fs(tag: &str) -> LocalFs {
        let dir = std::env::temp_dir().join(format!("ferrofsd-fs-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        LocalFs::new(&dir).unwrap()
    }

    #[tokio::test]
    async fn binary_write_read_roundtrip() {
        let fs = test_fs("binary");
        let payload: Vec<u8> = (0u32..4096).map(|i| (i % 251) as u8).collect();

        let mut src = payload.as_slice();
        fs.write_file("blob.bin", &mut src, TransferType::Binary, false)
            .await
            .unwrap();

        let mut sink = Vec::new();
        let copied = fs.read_file("blob.bin", &mut sink).await.unwrap();
        assert_eq!(copied, payload.len() as u64);
        assert_eq!(sink, payload);
    }

    #[tokio::test]
    async fn ascii_mode_normalizes_line_endings() {
        let fs = test_fs("ascii");
        let mut src: &[u8] = b"one\r\ntwo\nthree";
        fs.write_file("notes.txt", &mut src, TransferType::Ascii, false)
            .await
            .unwrap();

        let mut sink = Vec::new();
        fs.read_file("notes.txt", &mut sink).await.unwrap();
        assert_eq!(sink, b"one\ntwo\nthree\n");
    }

    #[tokio::test]
    async fn append_extends_existing_file() {
        let fs = test_fs("append");
        let mut first: &[u8] = b"hello ";
        fs.write_file("log.txt", &mut first, TransferType::Binary, false)
            .await
            .unwrap();
        let mut second: &[u8] = b"world";
        fs.write_file("log.txt", &mut second, TransferType::Binary, true)
            .await
            .unwrap();

        let mut sink = Vec::new();
        fs.read_file("log.txt", &mut sink).await.unwrap();
        assert_eq!(sink, b"hello world");
    }

    #[tokio::test]
    async fn rename_moves_the_entry() {
        let fs = test_fs("rename");
        let mut src: &[u8] = b"payload";
        fs.write_file("old.txt", &mut src, TransferType::Binary, false)
            .await
            .unwrap();

        fs.rename("old.txt", "new.txt").await.unwrap();
        assert!(matches!(fs.stat("old.txt").await, Err(FsError::NotFound)));
        let (_, metadata) = fs.stat("new.txt").await.unwrap();
        assert_eq!(metadata.len(), 7);
    }

    #[tokio::test]
    async fn remove_unlinks_files_and_empty_dirs() {
        let fs = test_fs("remove");
        let mut src: &[u8] = b"x";
        fs.write_file("victim.txt", &mut src, TransferType::Binary, false)
            .await
            .unwrap();
        fs.remove("victim.txt").await.unwrap();
        assert!(matches!(
            fs.stat("victim.txt").await,
            Err(FsError::NotFound)
        ));

        fs.make_dir("sub/nested").await.unwrap();
        fs.remove("sub/nested").await.unwrap();
        assert!(matches!(fs.stat("sub/nested").await, Err(FsError::NotFound)));
    }

    #[tokio::test]
    async fn escaping_paths_are_denied() {
        let fs = test_fs("escape");
        assert!(matches!(
            fs.stat("../outside").await,
            Err(FsError::AccessDenied)
        ));
        let mut src: &[u8] = b"x";
        assert!(matches!(
            fs.write_file("/../outside", &mut src, TransferType::Binary, false)
                .await,
            Err(FsError::AccessDenied)
        ));
    }

    #[tokio::test]
    async fn fact_line_has_the_mlsd_shape() {
        let fs = test_fs("facts");
        let mut src: &[u8] = b"12345";
        fs.write_file("facts.txt", &mut src, TransferType::Binary, false)
            .await
            .unwrap();

        let (line, _) = fs.stat("facts.txt").await.unwrap();
        assert!(line.starts_with("Type=file;Size=5;Modify="));
        assert!(line.contains(";UNIX.ownername=owner;UNIX.groupname=group; facts.txt"));
    }

    #[tokio::test]
    async fn modify_time_is_applied_and_reported() {
        let fs = test_fs("mdtm");
        let mut src: &[u8] = b"x";
        fs.write_file("stamp.txt", &mut src, TransferType::Binary, false)
            .await
            .unwrap();

        fs.modify_time("stamp.txt", "20200102030405").await.unwrap();
        let (line, _) = fs.stat("stamp.txt").await.unwrap();
        assert!(line.contains("Modify=20200102030405"));

        assert!(matches!(
            fs.modify_time("stamp.txt", "not-a-time").await,
            Err(FsError::InvalidTimeFormat(_))
        ));
    }

    #[tokio::test]
    async fn check_dir_rejects_files() {
        let fs = test_fs("checkdir");
        fs.make_dir("real").await.unwrap();
        fs.check_dir("real").await.unwrap();
        let mut src: &[u8] = b"x";
        fs.write_file("plain.txt", &mut src, TransferType::Binary, false)
            .await
            .unwrap();
        assert!(fs.check_dir("plain.txt").await.is_err());
        assert!(matches!(fs.check_dir("ghost").await, Err(FsError::NotFound)));
    }
}
