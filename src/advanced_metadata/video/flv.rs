//! Objeto `onMetaData` (AMF0) de archivos FLV.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::StreamInfo;

const SCRIPT_TAG: u8 = 18;
const SCRIPT_LIMIT: usize = 1024 * 1024;
/// Solo se inspeccionan las primeras etiquetas; `onMetaData` va al principio.
const MAX_TAGS: usize = 16;
/// Anidamiento máximo de objetos y arreglos AMF0.
const MAX_DEPTH: u8 = 64;

pub(super) fn probe(path: &Path) -> Option<StreamInfo> {
    let mut reader = BufReader::new(File::open(path).ok()?);

    let mut header = [0_u8; 9];
    reader.read_exact(&mut header).ok()?;
    if &header[0..3] != b"FLV" {
        return None;
    }
    let data_offset = u32::from_be_bytes([header[5], header[6], header[7], header[8]]);
    // Salta el resto de la cabecera y PreviousTagSize0.
    reader
        .seek(SeekFrom::Start(u64::from(data_offset) + 4))
        .ok()?;

    for _ in 0..MAX_TAGS {
        let mut tag = [0_u8; 11];
        reader.read_exact(&mut tag).ok()?;
        let size = u32::from_be_bytes([0, tag[1], tag[2], tag[3]]) as usize;

        if tag[0] == SCRIPT_TAG && size <= SCRIPT_LIMIT {
            let mut payload = vec![0_u8; size];
            reader.read_exact(&mut payload).ok()?;
            if let Some(info) = parse_script(&payload) {
                return Some(info);
            }
            reader.seek(SeekFrom::Current(4)).ok()?;
        } else {
            reader.seek(SeekFrom::Current(size as i64 + 4)).ok()?;
        }
    }
    None
}

#[derive(Default)]
struct ScriptMetadata {
    width: f64,
    height: f64,
    framerate: f64,
    duration: f64,
}

fn parse_script(data: &[u8]) -> Option<StreamInfo> {
    let mut amf = Amf0 { data, pos: 0 };
    if amf.read_u8()? != 0x02 || amf.read_string()? != "onMetaData" {
        return None;
    }

    let mut meta = ScriptMetadata::default();
    match amf.read_u8()? {
        0x08 => {
            amf.read_u32()?;
        }
        0x03 => {}
        _ => return None,
    }

    loop {
        let key = amf.read_string()?;
        let marker = amf.read_u8()?;
        if key.is_empty() && marker == 0x09 {
            break;
        }
        let number = amf.read_value(marker, 0)?;
        if let Some(number) = number {
            match key.as_str() {
                "width" => meta.width = number,
                "height" => meta.height = number,
                "framerate" | "videoframerate" => meta.framerate = number,
                "duration" => meta.duration = number,
                _ => {}
            }
        }
    }

    if meta.width <= 0.0 || meta.height <= 0.0 {
        return None;
    }
    let frame_count = if meta.framerate > 0.0 && meta.duration > 0.0 {
        (meta.duration * meta.framerate).round() as u64
    } else {
        0
    };
    Some(StreamInfo {
        width: meta.width as u32,
        height: meta.height as u32,
        frame_count,
        fps: meta.framerate.max(0.0),
    })
}

struct Amf0<'a> {
    data: &'a [u8],
    pos: usize,
}

impl Amf0<'_> {
    fn take(&mut self, len: usize) -> Option<&[u8]> {
        let slice = self.data.get(self.pos..self.pos.checked_add(len)?)?;
        self.pos += len;
        Some(slice)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn read_u16(&mut self) -> Option<u16> {
        self.take(2).map(|b| u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take(4).map(|b| u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_f64(&mut self) -> Option<f64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().ok()?;
        Some(f64::from_be_bytes(bytes))
    }

    fn read_string(&mut self) -> Option<String> {
        let len = usize::from(self.read_u16()?);
        self.take(len)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Consume un valor; devuelve el número si el valor era numérico.
    fn read_value(&mut self, marker: u8, depth: u8) -> Option<Option<f64>> {
        if depth >= MAX_DEPTH {
            return None;
        }
        match marker {
            0x00 => return self.read_f64().map(Some),
            0x01 => {
                self.take(1)?;
            }
            0x02 => {
                self.read_string()?;
            }
            0x03 => self.skip_properties(depth + 1)?,
            0x05 | 0x06 => {}
            0x07 => {
                self.take(2)?;
            }
            0x08 => {
                self.read_u32()?;
                self.skip_properties(depth + 1)?;
            }
            0x0A => {
                let count = self.read_u32()? as usize;
                // Cada elemento ocupa al menos su marcador.
                if count > self.data.len() - self.pos {
                    return None;
                }
                for _ in 0..count {
                    let inner = self.read_u8()?;
                    self.read_value(inner, depth + 1)?;
                }
            }
            0x0B => {
                self.take(10)?;
            }
            0x0C => {
                let len = self.read_u32()? as usize;
                self.take(len)?;
            }
            _ => return None,
        }
        Some(None)
    }

    fn skip_properties(&mut self, depth: u8) -> Option<()> {
        loop {
            let key = self.read_string()?;
            let marker = self.read_u8()?;
            if key.is_empty() && marker == 0x09 {
                return Some(());
            }
            self.read_value(marker, depth)?;
        }
    }
}
