//! Byte stream filters.
//!
//! A filter is a shell command line (e.g. `openssl enc -d -aes-256-cbc ...`)
//! that reads the payload on stdin and writes the result on stdout. Without a
//! filter the payload is copied as-is.

use std::io::{self, Read, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::error::{Result, RunnerError};

/// Pass `reader` through `filter` into `writer`.
pub fn transform(
    mut reader: impl Read + Send,
    mut writer: impl Write,
    filter: Option<&str>,
) -> Result<()> {
    let Some(filter) = filter else {
        io::copy(&mut reader, &mut writer)?;
        return Ok(());
    };

    let mut child = Command::new("sh")
        .args(["-c", filter])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| RunnerError::TransformFailed("filter stdin unavailable".to_string()))?;

    // Feed stdin from a scoped thread while the child's output is drained,
    // otherwise a full stdout pipe blocks both sides.
    let output = thread::scope(|s| {
        let feeder = s.spawn(move || -> io::Result<()> {
            match io::copy(&mut reader, &mut stdin) {
                // The filter may legitimately stop reading early.
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                other => other.map(|_| ()),
            }
            // stdin dropped here, closing the pipe
        });

        let output = child.wait_with_output();
        let fed = feeder
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin feeder panicked")));
        (output, fed)
    });

    let (output, fed) = output;
    let output = output?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RunnerError::TransformFailed(format!(
            "`{}` exited with {}: {}",
            filter,
            output.status,
            stderr.trim()
        )));
    }
    fed?;

    writer.write_all(&output.stdout)?;
    writer.flush()?;
    Ok(())
}
