use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use crate::config::Config;

pub struct DelegatingWriter {
    inner: DelegatingInner,
}

enum DelegatingInner {
    File(Arc<File>),
    Stderr(io::Stderr),
}

impl Write for DelegatingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.inner {
            DelegatingInner::File(f) => (&**f).write(buf),
            DelegatingInner::Stderr(s) => s.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.inner {
            DelegatingInner::File(f) => (&**f).flush(),
            DelegatingInner::Stderr(s) => s.flush(),
        }
    }
}

/// Hands out writers to the log file when one is configured, otherwise to
/// stderr.
#[derive(Clone, Debug, Default)]
pub struct SubscriberMakeWriter {
    file: Option<Arc<File>>,
}

impl SubscriberMakeWriter {
    pub fn stderr() -> Self {
        Self { file: None }
    }

    /// Appends to `path`, creating it if needed.
    pub fn append_to(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Some(Arc::new(file)),
        })
    }

    pub fn is_file(&self) -> bool {
        self.file.is_some()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SubscriberMakeWriter {
    type Writer = DelegatingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        let inner = match &self.file {
            Some(file) => DelegatingInner::File(Arc::clone(file)),
            None => DelegatingInner::Stderr(io::stderr()),
        };
        DelegatingWriter { inner }
    }
}

/// Installs the global subscriber described by `config`. Safe to call more
/// than once; later calls leave the first subscriber in place.
pub fn init(config: &Config) -> io::Result<()> {
    let writer = match &config.log_file {
        Some(path) => SubscriberMakeWriter::append_to(path)?,
        None => SubscriberMakeWriter::stderr(),
    };
    let ansi = !writer.is_file();
    let _ = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .with_thread_names(false)
        .try_init();
    Ok(())
}
