use log::debug;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
    Other,
    Unknown,
}

impl EntryKind {
    pub fn tag(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
            EntryKind::Other => "other",
            EntryKind::Unknown => "?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// The device services builtins are allowed to reach.
///
/// Every path handed to a host is already absolute and normalized.
pub trait Host {
    /// The one exception to normalized paths: `path` is absolute but may
    /// still hold `.` and `..` segments, each of which must resolve.
    fn dir_exists(&self, path: &str) -> bool;

    fn list_entries(&self, dir: &str) -> io::Result<Vec<DirEntry>>;

    fn read_all(&self, path: &str) -> io::Result<String>;

    fn write_all(&mut self, path: &str, contents: &str) -> io::Result<()>;

    fn remove_file(&mut self, path: &str) -> io::Result<()>;

    fn make_dir(&mut self, path: &str) -> io::Result<()>;

    fn remove_dir_recursive(&mut self, path: &str) -> io::Result<()>;

    /// Runs a program to completion and returns its exit code, if it had one.
    fn spawn_and_wait(&mut self, path: &str, args: &[String], cwd: &str) -> io::Result<Option<i32>>;

    fn write_output(&mut self, text: &str);

    fn clear_screen(&mut self);

    fn shutdown(&mut self);
}

/// Host backed by the real filesystem, processes and stdout.
#[derive(Debug, Default)]
pub struct StdHost {
    powered_off: bool,
    line_open: bool,
}

impl StdHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn powered_off(&self) -> bool {
        self.powered_off
    }

    /// Terminates output left without a newline, so the next prompt starts
    /// on its own line.
    pub fn end_line(&mut self) {
        if self.line_open {
            self.write_output("\n");
        }
    }
}

impl Host for StdHost {
    fn dir_exists(&self, path: &str) -> bool {
        fs::metadata(path).map(|meta| meta.is_dir()).unwrap_or(false)
    }

    fn list_entries(&self, dir: &str) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let kind = match entry.file_type() {
                Ok(file_type) if file_type.is_file() => EntryKind::File,
                Ok(file_type) if file_type.is_dir() => EntryKind::Folder,
                Ok(_) => EntryKind::Other,
                Err(_) => EntryKind::Unknown,
            };

            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                kind,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn read_all(&self, path: &str) -> io::Result<String> {
        // values are text; invalid UTF-8 is an error, never replaced
        let bytes = fs::read(path)?;
        String::from_utf8(bytes).map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))
    }

    fn write_all(&mut self, path: &str, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn remove_file(&mut self, path: &str) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn make_dir(&mut self, path: &str) -> io::Result<()> {
        fs::create_dir(path)
    }

    fn remove_dir_recursive(&mut self, path: &str) -> io::Result<()> {
        fs::remove_dir_all(path)
    }

    fn spawn_and_wait(&mut self, path: &str, args: &[String], cwd: &str) -> io::Result<Option<i32>> {
        io::stdout().flush()?;
        let status = Command::new(path).args(args).current_dir(cwd).status()?;
        debug!("process `{}` exited with {}", path, status);
        Ok(status.code())
    }

    fn write_output(&mut self, text: &str) {
        if !text.is_empty() {
            self.line_open = !text.ends_with('\n');
        }

        let mut stdout = io::stdout();
        if let Err(error) = stdout.write_all(text.as_bytes()).and_then(|_| stdout.flush()) {
            log::warn!("unable to write output: {}", error);
        }
    }

    fn clear_screen(&mut self) {
        self.write_output("\x1b[2J\x1b[H");
        self.line_open = false;
    }

    fn shutdown(&mut self) {
        debug!("power-off requested");
        self.powered_off = true;
    }
}
