//! Binary layout of resource files.
//!
//! A resource file starts with a 12 byte [`FileHeader`] and is followed by one record per
//! object:
//!
//! ```text
//! +-------------+----------------+------+---------+----------+-------------+
//! | DataHeader  | object header  | body | strings | messages | relocations |
//! | 12 bytes    | 36 bytes       |      | padded  | padded   | count + 8*n |
//! +-------------+----------------+------+---------+----------+-------------+
//! ```
//!
//! The [`DataHeader`] holds the offsets of the three trailing tables, measured from the start
//! of the data header, with `-1` for a table that is not present. A record without a
//! relocation table has no string or message table either.
//!
//! `scan` walks the records of an image without copying anything, `read_object` turns one
//! of them into an owned [`ResObject`] and `write_object` produces the disk form of an object
//! again.

use std::ops::Range;

use log::{debug, warn};

use crate::{
    config::ResourceConfig,
    file::{
        io::{read_c_bytes, read_le_at, write_le_at},
        parser::Parser,
    },
    res::{
        arena::{padded, StringArena, TextBuffer, TextKind},
        data::RecordData,
        handle::ResourceHandle,
        object::{ResObject, HEADER_BODY_OFFSET, HEADER_BODY_SIZE, HEADER_SIZE, HEADER_TOTAL_SIZE},
        relocation::{Relocation, RelocationTable},
        storage::OwnedRecord,
    },
    Error, Result,
};

/// Magic word at the start of every resource file, "RESF".
pub const RESF_MARKER: u32 = 0x4653_4552;
/// Resource file format version written on save.
pub const FILE_VERSION: u32 = 101;
/// Size of the file header.
pub const FILE_HEADER_SIZE: usize = 12;
/// Size of the data header in front of every record.
pub const DATA_HEADER_SIZE: usize = 12;

fn offset_word(offset: Option<usize>) -> Result<i32> {
    match offset {
        None => Ok(-1),
        Some(offset) => i32::try_from(offset)
            .map_err(|_| malformed_error!("Offset {} does not fit the file format", offset)),
    }
}

fn size_word(size: usize) -> Result<i32> {
    i32::try_from(size).map_err(|_| malformed_error!("Size {} does not fit the file format", size))
}

fn truncated(what: &str, pos: usize) -> Error {
    malformed_error!("Truncated {} at {}", what, pos)
}

/// The header at the start of a resource file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    /// Always [`RESF_MARKER`]
    pub magic: u32,
    /// Format version
    pub version: u32,
    /// Offset of the first record, `None` for a file without objects
    pub first_object: Option<usize>,
}

impl FileHeader {
    /// Header of a file in the current format.
    #[must_use]
    pub fn new(has_objects: bool) -> Self {
        FileHeader {
            magic: RESF_MARKER,
            version: FILE_VERSION,
            first_object: has_objects.then_some(FILE_HEADER_SIZE),
        }
    }

    /// Read and check the header at the cursor.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for a short file, a wrong magic word or a first object
    /// inside the header.
    pub fn read(parser: &mut Parser<'_>) -> Result<Self> {
        let start = parser.pos();
        let magic = parser
            .read_le::<u32>()
            .map_err(|_| truncated("file header", start))?;
        if magic != RESF_MARKER {
            return Err(malformed_error!("Not a resource file, marker {:#010x}", magic));
        }
        let version = parser
            .read_le::<u32>()
            .map_err(|_| truncated("file header", start))?;
        let first_object = match parser.read_offset() {
            Ok(offset) => offset,
            Err(Error::OutOfBounds { .. }) => return Err(truncated("file header", start)),
            Err(e) => return Err(e),
        };
        if let Some(first) = first_object {
            if first < FILE_HEADER_SIZE {
                return Err(malformed_error!("First object at {} inside the file header", first));
            }
        }

        Ok(FileHeader {
            magic,
            version,
            first_object,
        })
    }

    /// Append the header to `out`.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if the first object offset does not fit in an `int32`.
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(&self.magic.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&offset_word(self.first_object)?.to_le_bytes());
        Ok(())
    }
}

/// Offsets of the tables that follow a record, relative to the data header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DataHeader {
    /// Offset of the string table
    pub strings: Option<usize>,
    /// Offset of the message table
    pub messages: Option<usize>,
    /// Offset of the relocation table
    pub relocations: Option<usize>,
}

impl DataHeader {
    /// Read a data header at the cursor.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] for a short file or a negative offset other than `-1`.
    pub fn read(parser: &mut Parser<'_>) -> Result<Self> {
        let start = parser.pos();
        let mut offsets = [None; 3];
        for offset in &mut offsets {
            *offset = match parser.read_offset() {
                Ok(offset) => offset,
                Err(Error::OutOfBounds { .. }) => return Err(truncated("data header", start)),
                Err(e) => return Err(e),
            };
        }
        Ok(DataHeader {
            strings: offsets[0],
            messages: offsets[1],
            relocations: offsets[2],
        })
    }

    /// Append the data header to `out`.
    ///
    /// # Errors
    /// Returns [`Error::Malformed`] if an offset does not fit in an `int32`.
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        for offset in [self.strings, self.messages, self.relocations] {
            out.extend_from_slice(&offset_word(offset)?.to_le_bytes());
        }
        Ok(())
    }
}

/// Position and table layout of one record in an image.
#[derive(Debug, Clone)]
pub(crate) struct RecordLayout {
    /// Image position of the object header
    pub(crate) header_pos: usize,
    /// Offset of the body from the object header
    pub(crate) body_offset: usize,
    /// Size of the object header and body
    pub(crate) size: usize,
    /// Image range of the string table, empty if there is none
    pub(crate) strings: Range<usize>,
    /// Image range of the message table, empty if there is none
    pub(crate) messages: Range<usize>,
    /// The relocation array
    pub(crate) relocations: Vec<Relocation>,
    /// Image position of the next record
    pub(crate) next: usize,
}

impl RecordLayout {
    /// Returns the size of the body.
    pub(crate) fn body_size(&self) -> usize {
        self.size - self.body_offset
    }

    /// Returns the image position of the body.
    pub(crate) fn body_pos(&self) -> usize {
        self.header_pos + self.body_offset
    }

    /// Returns the image range of the table holding texts of `kind`.
    pub(crate) fn table(&self, kind: TextKind) -> Range<usize> {
        match kind {
            TextKind::String => self.strings.clone(),
            TextKind::Message => self.messages.clone(),
        }
    }
}

/// Walk the records of a resource image.
///
/// # Errors
/// Returns [`Error::Malformed`] if the file header or any record is damaged or truncated.
pub(crate) fn scan(data: &[u8]) -> Result<(FileHeader, Vec<RecordLayout>)> {
    let mut parser = Parser::new(data);
    let header = FileHeader::read(&mut parser)?;

    let mut records = Vec::new();
    if let Some(mut pos) = header.first_object {
        while pos < data.len() {
            let record = read_layout(data, pos)?;
            pos = record.next;
            records.push(record);
        }
    }

    debug!(
        "Scanned resource file version {} with {} objects",
        header.version,
        records.len()
    );
    Ok((header, records))
}

fn header_field(data: &[u8], header_pos: usize, field: usize) -> Result<usize> {
    let mut offset = header_pos + field;
    let value = read_le_at::<i32>(data, &mut offset).map_err(|_| truncated("object header", header_pos))?;
    usize::try_from(value)
        .map_err(|_| malformed_error!("Negative object header field {} at {}", value, header_pos))
}

fn read_layout(data: &[u8], pos: usize) -> Result<RecordLayout> {
    let mut parser = Parser::new(data);
    parser
        .seek(pos)
        .map_err(|_| truncated("data header", pos))?;
    let data_header = DataHeader::read(&mut parser)?;

    let header_pos = pos + DATA_HEADER_SIZE;
    let total_size = header_field(data, header_pos, HEADER_TOTAL_SIZE)?;
    let body_offset = header_field(data, header_pos, HEADER_BODY_OFFSET)?;
    let body_size = header_field(data, header_pos, HEADER_BODY_SIZE)?;
    if body_offset < HEADER_SIZE {
        return Err(malformed_error!(
            "Body offset {} inside the object header at {}",
            body_offset,
            header_pos
        ));
    }

    let size = body_offset + body_size;
    if header_pos + size > data.len() {
        return Err(truncated("object body", header_pos));
    }

    let Some(relocation_offset) = data_header.relocations else {
        let next = header_pos + total_size.max(size);
        return Ok(RecordLayout {
            header_pos,
            body_offset,
            size,
            strings: 0..0,
            messages: 0..0,
            relocations: Vec::new(),
            next,
        });
    };

    let tables_start = header_pos + size;
    let relocation_pos = pos + relocation_offset;
    if relocation_pos < tables_start {
        return Err(malformed_error!(
            "Relocation table at {} overlaps the record at {}",
            relocation_pos,
            header_pos
        ));
    }

    let text_end = (header_pos + total_size).min(relocation_pos);
    let message_start = data_header.messages.map(|offset| pos + offset);
    let strings = match data_header.strings {
        Some(offset) => table_range(pos + offset, message_start.unwrap_or(text_end), tables_start)?,
        None => 0..0,
    };
    let messages = match message_start {
        Some(start) => table_range(start, text_end, tables_start)?,
        None => 0..0,
    };

    let mut offset = relocation_pos;
    let relocations = match Relocation::read_array(data, &mut offset) {
        Ok(relocations) => relocations,
        Err(Error::OutOfBounds { .. }) => return Err(truncated("relocation table", relocation_pos)),
        Err(e) => return Err(e),
    };

    Ok(RecordLayout {
        header_pos,
        body_offset,
        size,
        strings,
        messages,
        relocations,
        next: offset,
    })
}

fn table_range(start: usize, end: usize, tables_start: usize) -> Result<Range<usize>> {
    if start < tables_start || start > end {
        return Err(malformed_error!(
            "Text table [{}, {}) outside of the record tables at {}",
            start,
            end,
            tables_start
        ));
    }
    Ok(start..end)
}

/// Build the text buffer of `kind` from its table in the image.
///
/// With normalisation, the buffer ends after the last referenced text, so the word padding
/// of the table is not taken for stored text.
fn text_buffer(
    data: &[u8],
    layout: &RecordLayout,
    relocations: &RelocationTable,
    kind: TextKind,
    config: &ResourceConfig,
) -> TextBuffer {
    let table = data.get(layout.table(kind)).unwrap_or(&[]);
    if !config.normalise_text {
        return TextBuffer::from_bytes(table);
    }

    let relocation_kind = kind.relocation_kind();
    let used = relocations
        .iter()
        .filter(|entry| entry.kind == relocation_kind)
        .filter_map(|entry| entry.target.text_position())
        .filter_map(|pos| match read_c_bytes(table, pos) {
            Ok(text) => Some(pos + text.len() + 1),
            Err(_) => {
                warn!("{:?} reference to {} outside of its table", kind, pos);
                None
            }
        })
        .max()
        .unwrap_or(0);
    TextBuffer::from_bytes(&table[..used])
}

/// Copy the record at `layout` out of `data` as a writeable object.
///
/// # Errors
/// Returns [`Error::Malformed`] if a relocation slot or target is invalid.
pub(crate) fn read_object(
    data: &[u8],
    layout: &RecordLayout,
    config: &ResourceConfig,
) -> Result<ResObject> {
    let mut bytes = data
        .get(layout.header_pos..layout.header_pos + layout.size)
        .ok_or_else(|| truncated("object body", layout.header_pos))?
        .to_vec();

    let relocations = RelocationTable::offsets_to_pointers(
        &layout.relocations,
        &mut bytes[layout.body_offset..],
        config,
    )?;
    let strings = text_buffer(data, layout, &relocations, TextKind::String, config);
    let messages = text_buffer(data, layout, &relocations, TextKind::Message, config);

    let mut record_data =
        RecordData::from_parts(relocations, StringArena::from_tables(strings, messages));
    if config.verify_references {
        record_data.verify(layout.body_size())?;
    }
    if config.normalise_text {
        record_data.normalise()?;
    }

    let record = OwnedRecord::from_parts(bytes, layout.body_offset, record_data)?;
    ResObject::from_handle(ResourceHandle::from_owned(record))
}

/// Append the disk form of `object` to `out`.
///
/// The object itself is not modified. A read-only object is copied first, which needs its
/// relocation table.
///
/// # Errors
/// Returns [`Error::InvalidOperation`] for a read-only object without relocation table and
/// [`Error::Malformed`] if a reference does not fit the format.
pub(crate) fn write_object(object: &ResObject, out: &mut Vec<u8>) -> Result<()> {
    let record = object.to_owned_record()?;
    let data = record.data();
    let relocations = data.relocations();
    let body_offset = record.body_offset();
    let body_size = record.body_size();

    let mut bytes = record.bytes().to_vec();
    let mut header = DataHeader::default();
    let strings = data.arena().strings();
    let messages = data.arena().messages();

    let total_size = if relocations.is_empty() {
        body_offset + body_size
    } else {
        let mut table_pos = DATA_HEADER_SIZE + body_offset + body_size;
        if !strings.is_empty() {
            header.strings = Some(table_pos);
            table_pos += padded(strings.used());
        }
        if !messages.is_empty() {
            header.messages = Some(table_pos);
            table_pos += padded(messages.used());
        }
        header.relocations = Some(table_pos);
        relocations.pointers_to_offsets(&mut bytes[body_offset..])?;
        table_pos - DATA_HEADER_SIZE
    };

    let mut offset = HEADER_TOTAL_SIZE;
    write_le_at(&mut bytes, &mut offset, size_word(total_size)?)?;
    let mut offset = HEADER_BODY_OFFSET;
    write_le_at(&mut bytes, &mut offset, size_word(body_offset)?)?;

    header.write(out)?;
    out.extend_from_slice(&bytes);
    if !relocations.is_empty() {
        for table in [strings, messages] {
            if !table.is_empty() {
                let start = out.len();
                out.extend_from_slice(table.as_bytes());
                out.resize(start + padded(table.used()), 0);
            }
        }
        Relocation::write_array(&relocations.relocations(), out)?;
    }
    Ok(())
}

/// Serialize a complete resource file.
///
/// # Errors
/// See [`write_object`].
pub(crate) fn write_file<'a>(objects: impl ExactSizeIterator<Item = &'a ResObject>) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    FileHeader::new(objects.len() > 0).write(&mut out)?;
    for object in objects {
        write_object(object, &mut out)?;
    }
    debug!("Serialized resource file of {} bytes", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::res::reference::SpriteArea;

    fn sample_object() -> ResObject {
        let mut object = ResObject::new("Sample", 0x1234, 100, 20);
        object.set_int(0, 7).unwrap();
        object.set_string(4, Some("Name")).unwrap();
        object.set_message(8, Some("Hello")).unwrap();
        object.set_message(12, None).unwrap();
        object.set_sprite_area_ref(16, Some(SpriteArea::CLIENT)).unwrap();
        object
    }

    #[test]
    fn headers() {
        let mut out = Vec::new();
        FileHeader::new(true).write(&mut out).unwrap();
        assert_eq!(out, [0x52, 0x45, 0x53, 0x46, 101, 0, 0, 0, 12, 0, 0, 0]);

        let header = FileHeader::read(&mut Parser::new(&out)).unwrap();
        assert_eq!(header.first_object, Some(12));

        let mut out = Vec::new();
        FileHeader::new(false).write(&mut out).unwrap();
        assert_eq!(&out[8..], [0xFF; 4]);

        let data_header = DataHeader {
            strings: Some(60),
            messages: None,
            relocations: Some(64),
        };
        let mut out = Vec::new();
        data_header.write(&mut out).unwrap();
        assert_eq!(DataHeader::read(&mut Parser::new(&out)).unwrap(), data_header);
    }

    #[test]
    fn bad_headers() {
        let mut data = Vec::new();
        FileHeader::new(true).write(&mut data).unwrap();
        data[0] = b'X';
        assert!(matches!(scan(&data), Err(Error::Malformed { .. })));
        assert!(matches!(scan(&data[..6]), Err(Error::Malformed { .. })));
        assert!(matches!(scan(&[]), Err(Error::Malformed { .. })));
    }

    #[test]
    fn record_layout_on_save() {
        let mut out = Vec::new();
        write_object(&sample_object(), &mut out).unwrap();

        let header = DataHeader::read(&mut Parser::new(&out)).unwrap();
        // data header + object header + body
        assert_eq!(header.strings, Some(12 + 36 + 20));
        assert_eq!(header.messages, Some(68 + 8));
        assert_eq!(header.relocations, Some(76 + 8));

        let mut offset = 12 + HEADER_TOTAL_SIZE;
        assert_eq!(read_le_at::<i32>(&out, &mut offset).unwrap(), 84 - 12);
        let body = &out[48..68];
        assert_eq!(&body[4..8], [0, 0, 0, 0]);
        assert_eq!(&body[8..12], [0, 0, 0, 0]);
        assert_eq!(&body[12..16], [0xFF; 4]);
        assert_eq!(&body[16..20], [0, 0, 0, 0]);
        assert_eq!(&out[68..76], b"Name\0\0\0\0");
        assert_eq!(&out[76..84], b"Hello\0\0\0");
        assert_eq!(out.len(), 84 + 4 + 4 * 8);
    }

    #[test]
    fn record_without_relocations() {
        let mut object = ResObject::new("Plain", 0x1234, 100, 8);
        object.set_int(4, -5).unwrap();
        let mut out = Vec::new();
        write_object(&object, &mut out).unwrap();

        assert_eq!(&out[..12], [0xFF; 12]);
        let mut offset = 12 + HEADER_TOTAL_SIZE;
        assert_eq!(read_le_at::<i32>(&out, &mut offset).unwrap(), 36 + 8);
        assert_eq!(out.len(), 12 + 36 + 8);
    }

    #[test]
    fn read_back() {
        let mut file = Vec::new();
        FileHeader::new(true).write(&mut file).unwrap();
        write_object(&sample_object(), &mut file).unwrap();
        write_object(&ResObject::new("Plain", 0x1234, 100, 8), &mut file).unwrap();

        let (header, records) = scan(&file).unwrap();
        assert_eq!(header.version, FILE_VERSION);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].next, file.len());

        let config = ResourceConfig::default().with_sprite_area(SpriteArea(0x8000));
        let object = read_object(&file, &records[0], &config).unwrap();
        assert_eq!(object.name(), "Sample");
        assert_eq!(object.int_value(0).unwrap(), 7);
        assert_eq!(object.text(4).unwrap(), Some("Name"));
        assert_eq!(object.text(8).unwrap(), Some("Hello"));
        assert_eq!(object.text(12).unwrap(), None);
        assert_eq!(object.sprite_area_ref(16).unwrap(), Some(SpriteArea(0x8000)));

        let mut again = Vec::new();
        write_object(&object, &mut again).unwrap();
        assert_eq!(again, file[12..records[0].next]);
    }

    #[test]
    fn truncated_record() {
        let mut file = Vec::new();
        FileHeader::new(true).write(&mut file).unwrap();
        write_object(&sample_object(), &mut file).unwrap();

        for len in [20, 60, file.len() - 4] {
            assert!(
                matches!(scan(&file[..len]), Err(Error::Malformed { .. })),
                "length {len}"
            );
        }
    }
}
