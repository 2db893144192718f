//! Cabecera principal (`avih`) de archivos AVI.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::StreamInfo;

const HDRL_LIMIT: u32 = 1024 * 1024;

fn read_u32_le(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_chunk_header<R: Read>(reader: &mut R) -> Option<([u8; 4], u32)> {
    let mut header = [0_u8; 8];
    reader.read_exact(&mut header).ok()?;
    let mut id = [0_u8; 4];
    id.copy_from_slice(&header[0..4]);
    Some((id, read_u32_le(&header, 4)?))
}

pub(super) fn probe(path: &Path) -> Option<StreamInfo> {
    let mut reader = BufReader::new(File::open(path).ok()?);

    let mut riff = [0_u8; 12];
    reader.read_exact(&mut riff).ok()?;
    if &riff[0..4] != b"RIFF" || &riff[8..12] != b"AVI " {
        return None;
    }

    while let Some((id, size)) = read_chunk_header(&mut reader) {
        if &id == b"LIST" && size >= 4 {
            let mut list_type = [0_u8; 4];
            reader.read_exact(&mut list_type).ok()?;
            if &list_type == b"hdrl" {
                if size > HDRL_LIMIT {
                    return None;
                }
                let mut payload = vec![0_u8; (size - 4) as usize];
                reader.read_exact(&mut payload).ok()?;
                return parse_hdrl(&payload);
            }
            reader
                .seek(SeekFrom::Current(i64::from(size - 4 + (size & 1))))
                .ok()?;
        } else {
            reader
                .seek(SeekFrom::Current(i64::from(size) + i64::from(size & 1)))
                .ok()?;
        }
    }
    None
}

fn parse_hdrl(data: &[u8]) -> Option<StreamInfo> {
    let mut offset = 0;
    while offset + 8 <= data.len() {
        let id = &data[offset..offset + 4];
        let size = read_u32_le(data, offset + 4)? as usize;
        let start = offset + 8;
        if id == b"avih" {
            return parse_avih(data.get(start..start + size.min(data.len() - start))?);
        }
        offset = start.saturating_add(size).saturating_add(size & 1);
    }
    None
}

/// Campos de `MainAVIHeader`: µs por fotograma, total de fotogramas y tamaño.
fn parse_avih(avih: &[u8]) -> Option<StreamInfo> {
    let micros_per_frame = read_u32_le(avih, 0)?;
    let total_frames = read_u32_le(avih, 16)?;
    let width = read_u32_le(avih, 32)?;
    let height = read_u32_le(avih, 36)?;

    let fps = if micros_per_frame > 0 {
        1_000_000.0 / f64::from(micros_per_frame)
    } else {
        0.0
    };

    Some(StreamInfo {
        width,
        height,
        frame_count: u64::from(total_frames),
        fps,
    })
}
