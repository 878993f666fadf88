use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

use log::debug;
use nix::sys::stat::utimes;
use nix::sys::time::TimeVal;
use nix::unistd::{chown, Gid, Uid};

use super::error::{ShellError, ShellResult};

const COPY_BUFFER_SIZE: usize = 1024;

/// 目标是已存在的目录时，实际落点为 `目录/源文件名`
fn resolve_destination(src: &Path, dst: &Path) -> PathBuf {
    if dst.is_dir() {
        if let Some(name) = src.file_name() {
            return dst.join(name);
        }
    }
    dst.to_path_buf()
}

/// 逐字节复制源文件到目标。源必须存在且是普通文件，
/// 否则分别报 NotFound / WrongType。`preserve` 时同步属主、
/// 权限位和时间戳。
pub fn copy_file(src: &str, dst: &str, preserve: bool) -> ShellResult<()> {
    let src_path = Path::new(src);
    let meta =
        fs::symlink_metadata(src_path).map_err(|_| ShellError::NotFound(src.to_string()))?;
    if !meta.is_file() {
        return Err(ShellError::WrongType(src.to_string()));
    }

    let dest = resolve_destination(src_path, Path::new(dst));
    // 目标解析后可能落回源文件本身（比如复制进自己所在的目录），
    // 这时 File::create 会先截断源，必须在打开前拒绝
    if same_file(src_path, &dest) {
        return Err(ShellError::Os(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} and {} are the same file", src, dest.display()),
        )));
    }
    debug!("复制 {} -> {}", src, dest.display());
    copy_bytes(src_path, &dest)?;
    if preserve {
        preserve_metadata(&meta, &dest)?;
    }
    Ok(())
}

/// 复制后删除源文件实现移动：不是原子 rename，跨不跨文件系统都先落一份完整拷贝，
/// 属主、权限位和时间戳总是保留。
pub fn move_file(src: &str, dst: &str) -> ShellResult<()> {
    copy_file(src, dst, true)?;
    fs::remove_file(src).map_err(ShellError::Os)
}

/// 目标不存在时不可能撞上源；都存在时按规范化路径比较
fn same_file(src: &Path, dest: &Path) -> bool {
    match (fs::canonicalize(src), fs::canonicalize(dest)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn copy_bytes(src: &Path, dest: &Path) -> ShellResult<()> {
    let mut reader = File::open(src).map_err(ShellError::Os)?;
    let mut writer = File::create(dest).map_err(ShellError::Os)?;
    let mut buffer = [0u8; COPY_BUFFER_SIZE];

    loop {
        let n = reader.read(&mut buffer).map_err(ShellError::Os)?;
        if n == 0 {
            break;
        }
        writer.write_all(&buffer[..n]).map_err(ShellError::Os)?;
    }
    writer.sync_all().map_err(ShellError::Os)
}

fn preserve_metadata(meta: &fs::Metadata, dest: &Path) -> ShellResult<()> {
    chown(
        dest,
        Some(Uid::from_raw(meta.uid())),
        Some(Gid::from_raw(meta.gid())),
    )?;
    fs::set_permissions(dest, meta.permissions()).map_err(ShellError::Os)?;

    let atime = TimeVal::new(
        meta.atime() as libc::time_t,
        (meta.atime_nsec() / 1000) as libc::suseconds_t,
    );
    let mtime = TimeVal::new(
        meta.mtime() as libc::time_t,
        (meta.mtime_nsec() / 1000) as libc::suseconds_t,
    );
    utimes(dest, &atime, &mtime)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn test_copy_into_existing_directory_appends_basename() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("f.txt");
        let sub = dir.path().join("d");
        fs::write(&src, b"payload").unwrap();
        fs::create_dir(&sub).unwrap();

        copy_file(src.to_str().unwrap(), sub.to_str().unwrap(), false).unwrap();

        let copied = sub.join("f.txt");
        assert_eq!(fs::read(copied).unwrap(), b"payload");
    }

    #[test]
    fn test_copy_into_own_directory_is_rejected() {
        // 目标目录里的同名落点就是源文件本身，复制必须拒绝且不动源文件
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("f.txt");
        fs::write(&src, b"payload").unwrap();

        let result = copy_file(src.to_str().unwrap(), dir.path().to_str().unwrap(), false);

        match result {
            Err(ShellError::Os(_)) => {}
            other => panic!("expected same-file error, got {:?}", other),
        }
        assert_eq!(fs::read(&src).unwrap(), b"payload");
    }

    #[test]
    fn test_copy_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let dst = dir.path().join("out");
        match copy_file(missing.to_str().unwrap(), dst.to_str().unwrap(), false) {
            Err(ShellError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_copy_directory_source_is_wrong_type() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("d");
        let dst = dir.path().join("out");
        fs::create_dir(&sub).unwrap();
        match copy_file(sub.to_str().unwrap(), dst.to_str().unwrap(), false) {
            Err(ShellError::WrongType(_)) => {}
            other => panic!("expected WrongType, got {:?}", other),
        }
    }

    #[test]
    fn test_preserving_copy_keeps_permission_bits() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tool.sh");
        let dst = dir.path().join("tool-copy.sh");
        fs::write(&src, b"#!/bin/sh\n").unwrap();
        fs::set_permissions(&src, fs::Permissions::from_mode(0o750)).unwrap();

        copy_file(src.to_str().unwrap(), dst.to_str().unwrap(), true).unwrap();

        let mode = fs::metadata(&dst).unwrap().permissions().mode() & 0o7777;
        assert_eq!(mode, 0o750);
    }

    #[test]
    fn test_move_copies_then_deletes_source() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dst = dir.path().join("b.txt");
        fs::write(&src, b"moved").unwrap();

        move_file(src.to_str().unwrap(), dst.to_str().unwrap()).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"moved");
    }
}
