use log::debug;
use russh_sftp::protocol::{
    Attrs, Data, ExtendedReply, File, FileAttributes, Handle, Name, OpenFlags, Packet, Status,
    StatusCode, Version, VERSION,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::Metadata;
use std::io::SeekFrom;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::core_fs::path::{display_virtual, secure_path};
use crate::core_fs::{FsError, LocalFs};

/// Open handles of one SFTP session.
enum HandleKind {
    File { path: String, file: tokio::fs::File },
    Dir { files: Vec<File>, consumed: bool },
}

/// SFTP request handler bound to the shared filesystem layer.
pub struct SftpHandler {
    fs: Arc<LocalFs>,
    handles: HashMap<String, HandleKind>,
    next_handle_id: u64,
}

impl SftpHandler {
    pub fn new(fs: Arc<LocalFs>) -> Self {
        Self {
            fs,
            handles: HashMap::new(),
            next_handle_id: 0,
        }
    }

    fn next_handle(&mut self) -> String {
        let id = self.next_handle_id;
        self.next_handle_id += 1;
        id.to_string()
    }
}

fn status_code(err: &FsError) -> StatusCode {
    match err {
        FsError::AccessDenied | FsError::PermissionDenied => StatusCode::PermissionDenied,
        FsError::NotFound => StatusCode::NoSuchFile,
        FsError::Unsupported => StatusCode::OpUnsupported,
        _ => StatusCode::Failure,
    }
}

fn ok_status(id: u32) -> Status {
    Status {
        id,
        status_code: StatusCode::Ok,
        error_message: "Ok".to_string(),
        language_tag: "en".to_string(),
    }
}

fn to_attrs(metadata: &Metadata) -> FileAttributes {
    #[cfg(unix)]
    let (permissions, uid, gid) = {
        use std::os::unix::fs::MetadataExt;
        (metadata.mode(), metadata.uid(), metadata.gid())
    };
    #[cfg(not(unix))]
    let (permissions, uid, gid) = {
        let mode = if metadata.is_dir() { 0o040755 } else { 0o100644 };
        (mode, 0, 0)
    };

    let secs = |time: std::io::Result<std::time::SystemTime>| {
        time.ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0)
    };

    FileAttributes {
        size: Some(metadata.len()),
        permissions: Some(permissions),
        uid: Some(uid),
        gid: Some(gid),
        atime: Some(secs(metadata.accessed())),
        mtime: Some(secs(metadata.modified())),
        ..Default::default()
    }
}

fn dir_attrs() -> FileAttributes {
    FileAttributes {
        permissions: Some(0o040755),
        ..Default::default()
    }
}

impl russh_sftp::server::Handler for SftpHandler {
    type Error = StatusCode;

    fn unimplemented(&self) -> Self::Error {
        StatusCode::OpUnsupported
    }

    async fn init(
        &mut self,
        version: u32,
        _extensions: HashMap<String, String>,
    ) -> Result<Version, Self::Error> {
        debug!("SFTP init, client version {}", version);
        Ok(Version {
            version: VERSION,
            extensions: HashMap::from([
                ("statvfs@openssh.com".to_string(), "2".to_string()),
                ("hardlink@openssh.com".to_string(), "1".to_string()),
            ]),
        })
    }

    async fn close(&mut self, id: u32, handle: String) -> Result<Status, Self::Error> {
        if let Some(HandleKind::File { file, .. }) = self.handles.get_mut(&handle) {
            let _ = file.flush().await;
        }
        self.handles.remove(&handle);
        Ok(ok_status(id))
    }

    async fn open(
        &mut self,
        id: u32,
        filename: String,
        pflags: OpenFlags,
        _attrs: FileAttributes,
    ) -> Result<Handle, Self::Error> {
        debug!("SFTP open {:?} with {:?}", filename, pflags);

        let mut options = tokio::fs::OpenOptions::new();
        options
            .read(pflags.contains(OpenFlags::READ))
            .write(pflags.contains(OpenFlags::WRITE) || pflags.contains(OpenFlags::APPEND))
            .append(pflags.contains(OpenFlags::APPEND))
            .create(pflags.contains(OpenFlags::CREATE))
            .truncate(pflags.contains(OpenFlags::TRUNCATE));

        let file = self
            .fs
            .open(&filename, &options)
            .await
            .map_err(|e| status_code(&e))?;

        let handle = self.next_handle();
        self.handles.insert(
            handle.clone(),
            HandleKind::File {
                path: filename,
                file,
            },
        );
        Ok(Handle { id, handle })
    }

    async fn read(
        &mut self,
        id: u32,
        handle: String,
        offset: u64,
        len: u32,
    ) -> Result<Data, Self::Error> {
        let file = match self.handles.get_mut(&handle) {
            Some(HandleKind::File { file, .. }) => file,
            _ => return Err(StatusCode::Failure),
        };

        file.seek(SeekFrom::Start(offset))
            .await
            .map_err(|_| StatusCode::Failure)?;

        let mut data = vec![0u8; len as usize];
        let mut filled = 0;
        while filled < data.len() {
            let n = file
                .read(&mut data[filled..])
                .await
                .map_err(|_| StatusCode::Failure)?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        if filled == 0 {
            return Err(StatusCode::Eof);
        }
        data.truncate(filled);
        Ok(Data { id, data })
    }

    async fn write(
        &mut self,
        id: u32,
        handle: String,
        offset: u64,
        data: Vec<u8>,
    ) -> Result<Status, Self::Error> {
        let file = match self.handles.get_mut(&handle) {
            Some(HandleKind::File { file, .. }) => file,
            _ => return Err(StatusCode::Failure),
        };

        file.seek(SeekFrom::Start(offset))
            .await
            .map_err(|_| StatusCode::Failure)?;
        file.write_all(&data)
            .await
            .map_err(|_| StatusCode::Failure)?;
        Ok(ok_status(id))
    }

    async fn opendir(&mut self, id: u32, path: String) -> Result<Handle, Self::Error> {
        debug!("SFTP opendir {:?}", path);
        let entries = self.fs.dir(&path).await.map_err(|e| status_code(&e))?;
        let files = entries
            .into_iter()
            .map(|entry| File {
                filename: entry.name,
                longname: entry.fact_line,
                attrs: to_attrs(&entry.metadata),
            })
            .collect();

        let handle = self.next_handle();
        self.handles.insert(
            handle.clone(),
            HandleKind::Dir {
                files,
                consumed: false,
            },
        );
        Ok(Handle { id, handle })
    }

    async fn readdir(&mut self, id: u32, handle: String) -> Result<Name, Self::Error> {
        match self.handles.get_mut(&handle) {
            Some(HandleKind::Dir { files, consumed }) => {
                if *consumed {
                    return Err(StatusCode::Eof);
                }
                *consumed = true;
                let files = std::mem::take(files);
                Ok(Name { id, files })
            }
            _ => Err(StatusCode::Failure),
        }
    }

    async fn realpath(&mut self, id: u32, path: String) -> Result<Name, Self::Error> {
        let cleaned = secure_path(&path).map_err(|e| status_code(&e))?;
        let absolute = display_virtual(&cleaned);
        Ok(Name {
            id,
            files: vec![File::dummy(&absolute)],
        })
    }

    async fn stat(&mut self, id: u32, path: String) -> Result<Attrs, Self::Error> {
        let (_, metadata) = self.fs.stat(&path).await.map_err(|e| status_code(&e))?;
        Ok(Attrs {
            id,
            attrs: to_attrs(&metadata),
        })
    }

    async fn lstat(&mut self, id: u32, path: String) -> Result<Attrs, Self::Error> {
        let (_, metadata) = self.fs.lstat(&path).await.map_err(|e| status_code(&e))?;
        Ok(Attrs {
            id,
            attrs: to_attrs(&metadata),
        })
    }

    async fn fstat(&mut self, id: u32, handle: String) -> Result<Attrs, Self::Error> {
        match self.handles.get(&handle) {
            Some(HandleKind::File { file, .. }) => {
                let metadata = file.metadata().await.map_err(|_| StatusCode::Failure)?;
                Ok(Attrs {
                    id,
                    attrs: to_attrs(&metadata),
                })
            }
            Some(HandleKind::Dir { .. }) => Ok(Attrs {
                id,
                attrs: dir_attrs(),
            }),
            None => Err(StatusCode::Failure),
        }
    }

    async fn setstat(
        &mut self,
        id: u32,
        path: String,
        attrs: FileAttributes,
    ) -> Result<Status, Self::Error> {
        if let Some(permissions) = attrs.permissions {
            self.fs
                .set_stat(&path, permissions)
                .await
                .map_err(|e| status_code(&e))?;
        }
        Ok(ok_status(id))
    }

    async fn fsetstat(
        &mut self,
        id: u32,
        handle: String,
        attrs: FileAttributes,
    ) -> Result<Status, Self::Error> {
        let path = match self.handles.get(&handle) {
            Some(HandleKind::File { path, .. }) => path.clone(),
            _ => return Err(StatusCode::Failure),
        };
        self.setstat(id, path, attrs).await
    }

    async fn mkdir(
        &mut self,
        id: u32,
        path: String,
        _attrs: FileAttributes,
    ) -> Result<Status, Self::Error> {
        debug!("SFTP mkdir {:?}", path);
        self.fs.make_dir(&path).await.map_err(|e| status_code(&e))?;
        Ok(ok_status(id))
    }

    async fn rmdir(&mut self, id: u32, path: String) -> Result<Status, Self::Error> {
        debug!("SFTP rmdir {:?}", path);
        self.fs.check_dir(&path).await.map_err(|e| status_code(&e))?;
        self.fs.remove(&path).await.map_err(|e| status_code(&e))?;
        Ok(ok_status(id))
    }

    async fn remove(&mut self, id: u32, filename: String) -> Result<Status, Self::Error> {
        debug!("SFTP remove {:?}", filename);
        // Unlink semantics: directories are refused, unlike the FTP DELE.
        let (_, metadata) = self.fs.stat(&filename).await.map_err(|e| status_code(&e))?;
        if metadata.is_dir() {
            return Err(StatusCode::Failure);
        }
        self.fs.remove(&filename).await.map_err(|e| status_code(&e))?;
        Ok(ok_status(id))
    }

    async fn rename(
        &mut self,
        id: u32,
        oldpath: String,
        newpath: String,
    ) -> Result<Status, Self::Error> {
        debug!("SFTP rename {:?} -> {:?}", oldpath, newpath);
        // SFTP-v2 semantics: an existing destination is an error, not a
        // replacement.
        if self.fs.stat(&newpath).await.is_ok() {
            return Err(StatusCode::Failure);
        }
        self.fs
            .rename(&oldpath, &newpath)
            .await
            .map_err(|e| status_code(&e))?;
        Ok(ok_status(id))
    }

    async fn symlink(
        &mut self,
        id: u32,
        linkpath: String,
        targetpath: String,
    ) -> Result<Status, Self::Error> {
        debug!("SFTP symlink {:?} -> {:?}", linkpath, targetpath);
        self.fs
            .symlink(&linkpath, &targetpath)
            .await
            .map_err(|e| status_code(&e))?;
        Ok(ok_status(id))
    }

    async fn readlink(&mut self, id: u32, path: String) -> Result<Name, Self::Error> {
        let target = self.fs.read_link(&path).await.map_err(|e| status_code(&e))?;
        Ok(Name {
            id,
            files: vec![File::dummy(target.to_string_lossy().as_ref())],
        })
    }

    async fn extended(
        &mut self,
        id: u32,
        request: String,
        data: Vec<u8>,
    ) -> Result<Packet, Self::Error> {
        debug!("SFTP extended request {:?}", request);

        match request.as_str() {
            "statvfs@openssh.com" => {
                #[derive(Deserialize)]
                struct StatVfsRequest {
                    path: String,
                }

                #[derive(Serialize)]
                struct StatVfsReply {
                    block_size: u64,
                    fragment_size: u64,
                    blocks: u64,
                    free_blocks: u64,
                    available_blocks: u64,
                    total_file_nodes: u64,
                    free_file_nodes: u64,
                    available_file_nodes: u64,
                    filesystem_id: u64,
                    mount_flags: u64,
                    max_filename_length: u64,
                }

                let request: StatVfsRequest = russh_sftp::de::from_bytes(&mut data.into())
                    .map_err(|_| StatusCode::BadMessage)?;
                let stats = self
                    .fs
                    .stat_vfs(&request.path)
                    .map_err(|e| status_code(&e))?;

                Ok(Packet::ExtendedReply(ExtendedReply {
                    id,
                    data: russh_sftp::ser::to_bytes(&StatVfsReply {
                        block_size: stats.block_size,
                        fragment_size: stats.fragment_size,
                        blocks: stats.blocks,
                        free_blocks: stats.free,
                        available_blocks: stats.avail,
                        total_file_nodes: stats.files,
                        free_file_nodes: stats.ffree,
                        available_file_nodes: stats.favail,
                        filesystem_id: stats.fsid,
                        mount_flags: stats.flags,
                        max_filename_length: stats.namemax,
                    })
                    .map_err(|_| StatusCode::Failure)?
                    .into(),
                }))
            }
            "hardlink@openssh.com" => {
                #[derive(Deserialize)]
                struct HardlinkRequest {
                    oldpath: String,
                    newpath: String,
                }

                let request: HardlinkRequest = russh_sftp::de::from_bytes(&mut data.into())
                    .map_err(|_| StatusCode::BadMessage)?;
                self.fs
                    .link(&request.newpath, &request.oldpath)
                    .await
                    .map_err(|e| status_code(&e))?;
                Ok(Packet::Status(ok_status(id)))
            }
            _ => Err(self.unimplemented()),
        }
    }
}
