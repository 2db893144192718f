//! Lectura de la primera pista de video en contenedores ISO-BMFF (mp4, mov).

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use super::StreamInfo;

const MOOV_LIMIT: u64 = 64 * 1024 * 1024;
/// Tamaño declarado `0`: la caja llega hasta el final del archivo.
const TO_END: u64 = u64::MAX;

struct BoxHeader {
    kind: [u8; 4],
    payload_size: u64,
}

fn read_box_header<R: Read>(reader: &mut R) -> Option<BoxHeader> {
    let mut buffer = [0_u8; 8];
    reader.read_exact(&mut buffer).ok()?;
    let size = u32::from_be_bytes([buffer[0], buffer[1], buffer[2], buffer[3]]) as u64;
    let mut kind = [0_u8; 4];
    kind.copy_from_slice(&buffer[4..8]);

    let payload_size = match size {
        0 => TO_END,
        1 => {
            let mut large = [0_u8; 8];
            reader.read_exact(&mut large).ok()?;
            u64::from_be_bytes(large).saturating_sub(16)
        }
        _ => size.saturating_sub(8),
    };
    Some(BoxHeader { kind, payload_size })
}

fn read_box_payload<R: Read>(reader: &mut R, header: &BoxHeader, limit: u64) -> Option<Vec<u8>> {
    if header.payload_size != TO_END && header.payload_size > limit {
        return None;
    }
    let mut buffer = Vec::new();
    reader
        .by_ref()
        .take(header.payload_size.min(limit))
        .read_to_end(&mut buffer)
        .ok()?;
    Some(buffer)
}

/// Cajas hijas contenidas en `data`, en orden.
fn child_boxes(data: &[u8]) -> Vec<([u8; 4], &[u8])> {
    let mut cursor = Cursor::new(data);
    let mut children = Vec::new();

    while let Some(header) = read_box_header(&mut cursor) {
        let start = cursor.position() as usize;
        let end = if header.payload_size == TO_END {
            data.len()
        } else {
            match usize::try_from(header.payload_size)
                .ok()
                .and_then(|size| start.checked_add(size))
            {
                Some(end) if end <= data.len() => end,
                _ => break,
            }
        };
        children.push((header.kind, &data[start..end]));
        cursor.set_position(end as u64);
    }
    children
}

pub(super) fn probe(path: &Path) -> Option<StreamInfo> {
    let mut reader = BufReader::new(File::open(path).ok()?);

    while let Some(header) = read_box_header(&mut reader) {
        if &header.kind == b"moov" {
            let payload = read_box_payload(&mut reader, &header, MOOV_LIMIT)?;
            return parse_moov(&payload);
        }
        if header.payload_size == TO_END {
            break;
        }
        let skip = i64::try_from(header.payload_size).ok()?;
        reader.seek(SeekFrom::Current(skip)).ok()?;
    }
    None
}

fn parse_moov(data: &[u8]) -> Option<StreamInfo> {
    child_boxes(data)
        .into_iter()
        .filter(|(kind, _)| kind == b"trak")
        .find_map(|(_, payload)| parse_trak(payload))
}

#[derive(Default)]
struct MediaTiming {
    handler: Option<[u8; 4]>,
    timescale: u32,
    duration: u64,
    sample_count: u64,
    total_delta: u64,
}

fn parse_trak(data: &[u8]) -> Option<StreamInfo> {
    let mut dimensions = None;
    let mut timing = MediaTiming::default();

    for (kind, payload) in child_boxes(data) {
        match &kind {
            b"tkhd" => dimensions = tkhd_dimensions(payload),
            b"mdia" => parse_mdia(payload, &mut timing),
            _ => {}
        }
    }

    if timing.handler.as_ref() != Some(b"vide") {
        return None;
    }
    let (width, height) = dimensions?;

    let fps = if timing.sample_count > 0 && timing.total_delta > 0 && timing.timescale > 0 {
        timing.sample_count as f64 * f64::from(timing.timescale) / timing.total_delta as f64
    } else if timing.sample_count > 0 && timing.duration > 0 && timing.timescale > 0 {
        timing.sample_count as f64 / (timing.duration as f64 / f64::from(timing.timescale))
    } else {
        0.0
    };

    Some(StreamInfo {
        width,
        height,
        frame_count: timing.sample_count,
        fps,
    })
}

/// Ancho y alto en punto fijo 16.16 al final de `tkhd`.
fn tkhd_dimensions(payload: &[u8]) -> Option<(u32, u32)> {
    if payload.len() < 84 {
        return None;
    }
    let at = payload.len() - 8;
    let width = be_u32(payload, at)? >> 16;
    let height = be_u32(payload, at + 4)? >> 16;
    Some((width, height))
}

fn parse_mdia(data: &[u8], timing: &mut MediaTiming) {
    for (kind, payload) in child_boxes(data) {
        match &kind {
            b"hdlr" if payload.len() >= 12 => {
                let mut handler = [0_u8; 4];
                handler.copy_from_slice(&payload[8..12]);
                timing.handler = Some(handler);
            }
            b"mdhd" => {
                if let Some((timescale, duration)) = mdhd_timing(payload) {
                    timing.timescale = timescale;
                    timing.duration = duration;
                }
            }
            b"minf" => {
                let stts = child_boxes(payload)
                    .into_iter()
                    .filter(|(kind, _)| kind == b"stbl")
                    .flat_map(|(_, stbl)| child_boxes(stbl))
                    .find(|(kind, _)| kind == b"stts");
                if let Some((_, stts)) = stts {
                    let (count, delta) = stts_totals(stts);
                    timing.sample_count = count;
                    timing.total_delta = delta;
                }
            }
            _ => {}
        }
    }
}

fn mdhd_timing(payload: &[u8]) -> Option<(u32, u64)> {
    match payload.first()? {
        1 => Some((be_u32(payload, 20)?, be_u64(payload, 24)?)),
        _ => Some((be_u32(payload, 12)?, u64::from(be_u32(payload, 16)?))),
    }
}

/// Suma de muestras y de duraciones declaradas en `stts`.
fn stts_totals(payload: &[u8]) -> (u64, u64) {
    let entries = be_u32(payload, 4).unwrap_or(0) as usize;
    let mut count = 0_u64;
    let mut delta = 0_u64;
    for index in 0..entries {
        let at = 8 + index * 8;
        let (Some(samples), Some(sample_delta)) = (be_u32(payload, at), be_u32(payload, at + 4))
        else {
            break;
        };
        count += u64::from(samples);
        delta += u64::from(samples) * u64::from(sample_delta);
    }
    (count, delta)
}

fn be_u32(data: &[u8], at: usize) -> Option<u32> {
    let bytes = data.get(at..at + 4)?;
    Some(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn be_u64(data: &[u8], at: usize) -> Option<u64> {
    let bytes: [u8; 8] = data.get(at..at + 8)?.try_into().ok()?;
    Some(u64::from_be_bytes(bytes))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn mp4_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }

    /// MP4 mínimo con una pista de video de `frames` muestras a 30 fps.
    pub(crate) fn sample_mp4(width: u32, height: u32, frames: u32) -> Vec<u8> {
        let mut tkhd = vec![0_u8; 84];
        tkhd[76..80].copy_from_slice(&(width << 16).to_be_bytes());
        tkhd[80..84].copy_from_slice(&(height << 16).to_be_bytes());

        let mut mdhd = vec![0_u8; 24];
        mdhd[12..16].copy_from_slice(&15360_u32.to_be_bytes());
        mdhd[16..20].copy_from_slice(&(frames * 512).to_be_bytes());

        let mut hdlr = vec![0_u8; 24];
        hdlr[8..12].copy_from_slice(b"vide");

        let mut stts = vec![0_u8; 8];
        stts[4..8].copy_from_slice(&1_u32.to_be_bytes());
        stts.extend_from_slice(&frames.to_be_bytes());
        stts.extend_from_slice(&512_u32.to_be_bytes());

        let stbl = mp4_box(b"stbl", &mp4_box(b"stts", &stts));
        let minf = mp4_box(b"minf", &stbl);
        let mdia = mp4_box(
            b"mdia",
            &[mp4_box(b"mdhd", &mdhd), mp4_box(b"hdlr", &hdlr), minf].concat(),
        );
        let trak = mp4_box(b"trak", &[mp4_box(b"tkhd", &tkhd), mdia].concat());

        let mut file = mp4_box(b"ftyp", b"isom\0\0\x02\0isomiso2");
        file.extend(mp4_box(b"mdat", &[0_u8; 32]));
        file.extend(mp4_box(b"moov", &trak));
        file
    }

    #[test]
    fn video_track_yields_dimensions_and_rate() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, sample_mp4(1920, 1080, 90))?;

        let info = probe(&path).ok_or("sin pista de video")?;
        assert_eq!((info.width, info.height), (1920, 1080));
        assert_eq!(info.frame_count, 90);
        assert!((info.fps - 30.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn non_video_tracks_are_skipped() {
        let mut hdlr = vec![0_u8; 24];
        hdlr[8..12].copy_from_slice(b"soun");
        let trak = mp4_box(
            b"trak",
            &[mp4_box(b"tkhd", &[0_u8; 84]), mp4_box(b"mdia", &mp4_box(b"hdlr", &hdlr))].concat(),
        );
        assert!(parse_moov(&trak).is_none());
    }

    #[test]
    fn truncated_files_are_not_readable() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("roto.mp4");
        std::fs::write(&path, &sample_mp4(640, 480, 10)[..40])?;
        assert!(probe(&path).is_none());
        Ok(())
    }
}
