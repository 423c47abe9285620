//! Streaming file copy into a fresh file.
//!
//! - The destination is created with `create_new(true)`; an existing file is an error.
//! - 1 MiB buffered reader/writer, then `sync_all` so the bytes are durable before
//!   the caller renames the file into place.
//! - Source is read once to EOF; a short read compared to the size observed at open
//!   is reported as `UnexpectedEof` (a scanner or the game truncated it mid-copy).

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

const BUF_SIZE: usize = 1024 * 1024;

/// Copy `src` -> `dst` and return the number of bytes written.
pub(super) fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let expected = src_f.metadata()?.len();

    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;

    if bytes < expected {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("short copy: {bytes} of {expected} bytes"),
        ));
    }
    Ok(bytes)
}
