//! Load-or-create and save round trips
//!
//! This is the layer that meets the outside world. Bytes come from a
//! [`ByteSource`], where an absent or unreadable source is a normal first-run
//! condition rather than an error, and go to a [`ByteSink`]. Saving always
//! encodes fully in memory first, so a record that fails validation never
//! touches its destination; a sink that fails part-way through a write is
//! reported as [`StoreError::Io`].

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::conv::decode::DecodeOptions;
use crate::conv::error::{DecodeError, EncodeError};
use crate::error::RecordError;
use crate::record::Record;
use crate::schema::registry::Registry;

/// Failure of a load or save
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("stored bytes could not be decoded: {0}")]
    Decode(#[from] DecodeError),
    #[error("record could not be encoded: {0}")]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("destination write failed: {0}")]
    Io(#[from] io::Error),
}

/// Somewhere a whole encoded record may be read from
pub trait ByteSource {
    /// Returns the full contents, or `None` when there is nothing to read.
    fn read_all_bytes(&self) -> Option<Vec<u8>>;
}

/// Somewhere a whole encoded record may be written to
pub trait ByteSink {
    /// Replaces the sink's contents with `bytes`.
    fn write_all_bytes(&mut self, bytes: &[u8]) -> io::Result<()>;
}

impl ByteSource for [u8] {
    fn read_all_bytes(&self) -> Option<Vec<u8>> {
        Some(self.to_vec())
    }
}

impl ByteSource for Vec<u8> {
    fn read_all_bytes(&self) -> Option<Vec<u8>> {
        Some(self.clone())
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Option<&S> {
    fn read_all_bytes(&self) -> Option<Vec<u8>> {
        (*self).and_then(S::read_all_bytes)
    }
}

impl ByteSource for Path {
    fn read_all_bytes(&self) -> Option<Vec<u8>> {
        match fs::read(self) {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                debug!(path = %self.display(), %err, "treating unreadable file as absent");
                None
            }
        }
    }
}

impl ByteSource for PathBuf {
    fn read_all_bytes(&self) -> Option<Vec<u8>> {
        self.as_path().read_all_bytes()
    }
}

impl ByteSink for Vec<u8> {
    fn write_all_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.clear();
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl ByteSink for PathBuf {
    fn write_all_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        fs::write(self.as_path(), bytes)
    }
}

/// A file on disk, used both as source and as sink
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSource for FileStore {
    fn read_all_bytes(&self) -> Option<Vec<u8>> {
        self.path.read_all_bytes()
    }
}

impl ByteSink for FileStore {
    fn write_all_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        fs::write(&self.path, bytes)
    }
}

/// Adapts any [`Write`] as a sink; the bytes are written in full and then
/// flushed.
#[derive(Debug)]
pub struct WriteSink<W: Write>(pub W);

impl<W: Write> WriteSink<W> {
    pub fn into_inner(self) -> W {
        self.0
    }
}

impl<W: Write> ByteSink for WriteSink<W> {
    fn write_all_bytes(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.0.write_all(bytes)?;
        self.0.flush()
    }
}

/// Decodes the source's contents as a `name` record, or returns `None` when
/// the source is absent.
///
/// # Errors
///
/// Fails with [`StoreError::Decode`] if the source holds malformed bytes.
pub fn load<S: ByteSource + ?Sized>(
    source: &S,
    registry: &Arc<Registry>,
    name: &str,
    opts: &DecodeOptions,
) -> Result<Option<Record>, StoreError> {
    let Some(bytes) = source.read_all_bytes() else {
        return Ok(None);
    };
    let record = Record::decode_with(registry, name, &bytes, opts)?;
    debug!(record = name, len = bytes.len(), "loaded record");
    Ok(Some(record))
}

/// Like [`load_or_create`], with explicit decode options
///
/// # Errors
///
/// As for [`load_or_create`].
pub fn load_or_create_with<S: ByteSource + ?Sized>(
    source: &S,
    registry: &Arc<Registry>,
    name: &str,
    opts: &DecodeOptions,
) -> Result<Record, StoreError> {
    match load(source, registry, name, opts)? {
        Some(record) => Ok(record),
        None => {
            debug!(record = name, "no stored bytes; starting empty");
            Ok(Record::new(registry, name)?)
        }
    }
}

/// Decodes the source's contents, or starts an empty record when the source
/// is absent or unreadable.
///
/// # Errors
///
/// Fails with [`StoreError::Decode`] if the source holds malformed bytes, and
/// with [`StoreError::Record`] if `name` is not a declared message type.
pub fn load_or_create<S: ByteSource + ?Sized>(
    source: &S,
    registry: &Arc<Registry>,
    name: &str,
) -> Result<Record, StoreError> {
    load_or_create_with(source, registry, name, &DecodeOptions::default())
}

/// [`load_or_create`] over the file at `path`
///
/// # Errors
///
/// As for [`load_or_create`].
pub fn load_or_create_file(
    path: impl AsRef<Path>,
    registry: &Arc<Registry>,
    name: &str,
) -> Result<Record, StoreError> {
    load_or_create(path.as_ref(), registry, name)
}

/// Encodes `record` and writes it to `sink`, returning the number of bytes
/// written.
///
/// # Errors
///
/// Fails with [`StoreError::Encode`], without touching the sink, if a
/// required field is missing; fails with [`StoreError::Io`] if the sink
/// rejects the write, in which case it may have been partly written.
pub fn save<K: ByteSink + ?Sized>(record: &Record, sink: &mut K) -> Result<usize, StoreError> {
    let bytes = record.encode()?;
    sink.write_all_bytes(&bytes)?;
    debug!(record = %record.message_name(), len = bytes.len(), "saved record");
    Ok(bytes.len())
}

/// [`save`] to the file at `path`, creating or truncating it
///
/// # Errors
///
/// As for [`save`].
pub fn save_file(record: &Record, path: impl AsRef<Path>) -> Result<usize, StoreError> {
    save(record, &mut path.as_ref().to_path_buf())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::registry::fixtures::{self, BOOK, PERSON};
    use crate::value::Value;

    /// Accepts `room` bytes, then fails
    struct ShortWriter {
        written: Vec<u8>,
        room: usize,
    }

    impl Write for ShortWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.room == 0 {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "disk full"));
            }
            let n = buf.len().min(self.room);
            self.written.extend_from_slice(&buf[..n]);
            self.room -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn absent_source_starts_empty() {
        let registry = fixtures::address_book();
        let none: Option<&[u8]> = None;
        let book = load_or_create(&none, &registry, BOOK).unwrap();
        assert!(book.is_empty());
        assert!(load(&none, &registry, BOOK, &DecodeOptions::default())
            .unwrap()
            .is_none());
        assert!(matches!(
            load_or_create(&none, &registry, "nope"),
            Err(StoreError::Record(RecordError::UnknownMessage(_)))
        ));
    }

    #[test]
    fn save_then_load() {
        let registry = fixtures::address_book();
        let mut person = load_or_create(&Vec::<u8>::new(), &registry, PERSON).unwrap();
        person.set(1, Value::from("Ann")).unwrap();
        person.set(2, Value::Int32(1)).unwrap();

        let mut sink = vec![0xde, 0xad];
        assert_eq!(save(&person, &mut sink).unwrap(), 7);
        let loaded = load_or_create(&sink, &registry, PERSON).unwrap();
        assert_eq!(loaded, person);
    }

    #[test]
    fn malformed_bytes_are_an_error() {
        let registry = fixtures::address_book();
        let bytes: &[u8] = &[0x0a, 0x09];
        assert!(matches!(
            load_or_create(bytes, &registry, PERSON),
            Err(StoreError::Decode(_))
        ));
    }

    #[test]
    fn invalid_record_leaves_sink_untouched() {
        let registry = fixtures::address_book();
        let person = Record::new(&registry, PERSON).unwrap();
        let mut sink = vec![1, 2, 3];
        assert!(matches!(
            save(&person, &mut sink),
            Err(StoreError::Encode(_))
        ));
        assert_eq!(sink, vec![1, 2, 3]);
    }

    #[test]
    fn partial_write_is_surfaced() {
        let registry = fixtures::address_book();
        let mut person = Record::new(&registry, PERSON).unwrap();
        person.set(1, Value::from("Ann")).unwrap();
        person.set(2, Value::Int32(1)).unwrap();
        let mut sink = WriteSink(ShortWriter {
            written: Vec::new(),
            room: 3,
        });
        assert!(matches!(save(&person, &mut sink), Err(StoreError::Io(_))));
        assert_eq!(sink.into_inner().written, vec![0x0a, 0x03, b'A']);
    }
}
