//! Lectura de Matroska/WebM: `Segment → Info` y la primera pista de video.
//!
//! Se recorre el archivo elemento a elemento saltando los `Cluster`, así que
//! solo se leen las cabeceras aunque el video sea grande.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use super::StreamInfo;

const EBML_HEADER: u32 = 0x1A45_DFA3;
const SEGMENT: u32 = 0x1853_8067;
const INFO: u32 = 0x1549_A966;
const TRACKS: u32 = 0x1654_AE6B;
const TIMECODE_SCALE: u32 = 0x2A_D7B1;
const DURATION: u32 = 0x4489;
const TRACK_ENTRY: u32 = 0xAE;
const TRACK_TYPE: u32 = 0x83;
const DEFAULT_DURATION: u32 = 0x23_E383;
const VIDEO: u32 = 0xE0;
const PIXEL_WIDTH: u32 = 0xB0;
const PIXEL_HEIGHT: u32 = 0xBA;

const TRACK_TYPE_VIDEO: u64 = 1;
const DEFAULT_TIMECODE_SCALE: u64 = 1_000_000;
const ELEMENT_LIMIT: u64 = 16 * 1024 * 1024;
const UNKNOWN_SIZE: u64 = u64::MAX;

fn read_ebml_id<R: Read>(reader: &mut R) -> Option<u32> {
    let mut first = [0_u8; 1];
    reader.read_exact(&mut first).ok()?;
    let length = first[0].leading_zeros() as usize + 1;
    if length > 4 {
        return None;
    }
    let mut value = first[0] as u32;
    for _ in 1..length {
        let mut b = [0_u8; 1];
        reader.read_exact(&mut b).ok()?;
        value = (value << 8) | b[0] as u32;
    }
    Some(value)
}

/// Tamaño de un elemento; todos los bits a uno significa tamaño desconocido.
fn read_ebml_size<R: Read>(reader: &mut R) -> Option<u64> {
    let mut first = [0_u8; 1];
    reader.read_exact(&mut first).ok()?;
    let length = first[0].leading_zeros() as usize + 1;
    if length > 8 {
        return None;
    }
    let mask = (0xFF_u16 >> length) as u8;
    let mut value = (first[0] & mask) as u64;
    let mut all_ones = first[0] & mask == mask;
    for _ in 1..length {
        let mut b = [0_u8; 1];
        reader.read_exact(&mut b).ok()?;
        all_ones &= b[0] == 0xFF;
        value = (value << 8) | b[0] as u64;
    }
    Some(if all_ones { UNKNOWN_SIZE } else { value })
}

fn read_ebml_element<R: Read>(reader: &mut R) -> Option<(u32, u64)> {
    let id = read_ebml_id(reader)?;
    let size = read_ebml_size(reader)?;
    Some((id, size))
}

fn read_ebml_uint(data: &[u8]) -> u64 {
    data.iter().fold(0_u64, |value, &b| (value << 8) | b as u64)
}

fn read_ebml_float(data: &[u8]) -> Option<f64> {
    match data.len() {
        4 => Some(f32::from_be_bytes([data[0], data[1], data[2], data[3]]) as f64),
        8 => Some(f64::from_be_bytes(data.try_into().ok()?)),
        _ => None,
    }
}

fn read_payload<R: Read>(reader: &mut R, size: u64) -> Option<Vec<u8>> {
    if size > ELEMENT_LIMIT {
        return None;
    }
    // Se lee lo que haya: un tamaño declarado mayor que el archivo no reserva memoria.
    let mut buffer = Vec::new();
    reader.by_ref().take(size).read_to_end(&mut buffer).ok()?;
    (buffer.len() as u64 == size).then_some(buffer)
}

/// Elementos hijos contenidos en `data`.
fn children(data: &[u8]) -> Vec<(u32, &[u8])> {
    let mut cursor = Cursor::new(data);
    let mut out = Vec::new();
    while let Some((id, size)) = read_ebml_element(&mut cursor) {
        let start = cursor.position() as usize;
        let end = match usize::try_from(size).ok().and_then(|s| start.checked_add(s)) {
            Some(end) if end <= data.len() => end,
            _ => data.len(),
        };
        out.push((id, &data[start..end]));
        cursor.set_position(end as u64);
    }
    out
}

#[derive(Default)]
struct SegmentInfo {
    timecode_scale: u64,
    duration: f64,
}

#[derive(Default)]
struct VideoTrack {
    width: u32,
    height: u32,
    default_duration_ns: u64,
}

pub(super) fn probe(path: &Path) -> Option<StreamInfo> {
    let mut reader = BufReader::new(File::open(path).ok()?);

    let (id, size) = read_ebml_element(&mut reader)?;
    if id != EBML_HEADER || size == UNKNOWN_SIZE {
        return None;
    }
    reader.seek(SeekFrom::Current(i64::try_from(size).ok()?)).ok()?;

    loop {
        let (id, size) = read_ebml_element(&mut reader)?;
        if id == SEGMENT {
            break;
        }
        if size == UNKNOWN_SIZE {
            return None;
        }
        reader.seek(SeekFrom::Current(i64::try_from(size).ok()?)).ok()?;
    }

    let mut info = None;
    let mut track = None;
    while info.is_none() || track.is_none() {
        let Some((id, size)) = read_ebml_element(&mut reader) else {
            break;
        };
        match id {
            INFO => info = Some(parse_info(&read_payload(&mut reader, size)?)),
            TRACKS => track = parse_tracks(&read_payload(&mut reader, size)?),
            _ if size == UNKNOWN_SIZE => break,
            _ => {
                reader.seek(SeekFrom::Current(i64::try_from(size).ok()?)).ok()?;
            }
        }
    }

    let track = track?;
    let info = info.unwrap_or_default();
    let scale = if info.timecode_scale == 0 {
        DEFAULT_TIMECODE_SCALE
    } else {
        info.timecode_scale
    };
    let seconds = info.duration * scale as f64 / 1e9;
    let fps = if track.default_duration_ns > 0 {
        1e9 / track.default_duration_ns as f64
    } else {
        0.0
    };
    let frame_count = if fps > 0.0 && seconds > 0.0 {
        (seconds * fps).round() as u64
    } else {
        0
    };

    Some(StreamInfo {
        width: track.width,
        height: track.height,
        frame_count,
        fps,
    })
}

fn parse_info(data: &[u8]) -> SegmentInfo {
    let mut info = SegmentInfo::default();
    for (id, payload) in children(data) {
        match id {
            TIMECODE_SCALE => info.timecode_scale = read_ebml_uint(payload),
            DURATION => info.duration = read_ebml_float(payload).unwrap_or(0.0),
            _ => {}
        }
    }
    info
}

fn parse_tracks(data: &[u8]) -> Option<VideoTrack> {
    children(data)
        .into_iter()
        .filter(|(id, _)| *id == TRACK_ENTRY)
        .find_map(|(_, entry)| parse_track_entry(entry))
}

fn parse_track_entry(data: &[u8]) -> Option<VideoTrack> {
    let mut track_type = 0;
    let mut track = VideoTrack::default();
    for (id, payload) in children(data) {
        match id {
            TRACK_TYPE => track_type = read_ebml_uint(payload),
            DEFAULT_DURATION => track.default_duration_ns = read_ebml_uint(payload),
            VIDEO => {
                for (inner, value) in children(payload) {
                    match inner {
                        PIXEL_WIDTH => track.width = read_ebml_uint(value) as u32,
                        PIXEL_HEIGHT => track.height = read_ebml_uint(value) as u32,
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    (track_type == TRACK_TYPE_VIDEO).then_some(track)
}
