//! The v1 portable wire format (spec §6): a self-delimiting, forward
//! compatible encoding for a single [`Record`].
//!
//! ```text
//! Record:  i32 field-count
//!          for each: u8 storeFlags  (bit0=indexed, bit1=tokenized, bit2=stored)
//!                    utf string name  (i16 length + UTF-8 bytes)
//!                    utf string value (i32 length + UTF-8 bytes)
//! ```
//!
//! Unknown field names are preserved verbatim on read so a reader built
//! against an older schema still round-trips a newer writer's output.

use idx_model::record::FieldFlags;
use idx_model::Record;
use std::io::{self, Read, Write};

const FLAG_INDEXED: u8 = 1 << 0;
const FLAG_TOKENIZED: u8 = 1 << 1;
const FLAG_STORED: u8 = 1 << 2;

fn flags_to_byte(flags: FieldFlags) -> u8 {
    let mut b = 0u8;
    if flags.indexed {
        b |= FLAG_INDEXED;
    }
    if flags.searchable {
        b |= FLAG_TOKENIZED;
    }
    if flags.stored {
        b |= FLAG_STORED;
    }
    b
}

fn byte_to_flags(b: u8) -> FieldFlags {
    FieldFlags {
        indexed: b & FLAG_INDEXED != 0,
        searchable: b & FLAG_TOKENIZED != 0,
        stored: b & FLAG_STORED != 0,
    }
}

/// Write one record's fields, length-prefixed at both the record and
/// field-string level (spec §6).
pub fn write_record<W: Write>(w: &mut W, record: &Record) -> io::Result<()> {
    let fields = record.fields();
    w.write_all(&(fields.len() as i32).to_be_bytes())?;
    for field in fields {
        w.write_all(&[flags_to_byte(field.flags)])?;
        write_utf_i16(w, &field.name)?;
        write_utf_i32(w, &field.value)?;
    }
    Ok(())
}

/// Read one record. Returns `Ok(None)` at a clean EOF (no more records in
/// the stream), distinguishing it from a truncated read mid-record.
pub fn read_record<R: Read>(r: &mut R) -> io::Result<Option<Record>> {
    let mut count_buf = [0u8; 4];
    match read_exact_or_eof(r, &mut count_buf)? {
        false => return Ok(None),
        true => {}
    }
    let field_count = i32::from_be_bytes(count_buf);
    let mut record = Record::new();
    for _ in 0..field_count {
        let mut flag_buf = [0u8; 1];
        r.read_exact(&mut flag_buf)?;
        let flags = byte_to_flags(flag_buf[0]);
        let name = read_utf_i16(r)?;
        let value = read_utf_i32(r)?;
        record.set(name, value, flags);
    }
    Ok(Some(record))
}

fn write_utf_i16<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    let bytes = s.as_bytes();
    w.write_all(&(bytes.len() as i16).to_be_bytes())?;
    w.write_all(bytes)
}

fn read_utf_i16<R: Read>(r: &mut R) -> io::Result<String> {
    let mut len_buf = [0u8; 2];
    r.read_exact(&mut len_buf)?;
    let len = i16::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn write_utf_i32<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    let bytes = s.as_bytes();
    w.write_all(&(bytes.len() as i32).to_be_bytes())?;
    w.write_all(bytes)
}

fn read_utf_i32<R: Read>(r: &mut R) -> io::Result<String> {
    let mut len_buf = [0u8; 4];
    r.read_exact(&mut len_buf)?;
    let len = i32::from_be_bytes(len_buf) as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Like `read_exact`, but returns `Ok(false)` instead of erroring when the
/// stream is exhausted before a single byte is read.
fn read_exact_or_eof<R: Read>(r: &mut R, buf: &mut [u8]) -> io::Result<bool> {
    let mut read = 0;
    while read < buf.len() {
        match r.read(&mut buf[read..]) {
            Ok(0) if read == 0 => return Ok(false),
            Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}
