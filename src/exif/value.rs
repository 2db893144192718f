use std::fmt::Write as _;

use super::registry::TypeCode;

/// Escala usada al convertir texto decimal en racional.
pub const RATIONAL_SCALE: u32 = 1000;

/// Valor tipado de una entrada IFD.
#[derive(Clone, Debug, PartialEq)]
pub enum ExifValue {
    Byte(Vec<u8>),
    Ascii(Vec<u8>),
    Short(Vec<u16>),
    Long(Vec<u32>),
    Rational(Vec<(u32, u32)>),
    SByte(Vec<i8>),
    Undefined(Vec<u8>),
    SShort(Vec<i16>),
    SLong(Vec<i32>),
    SRational(Vec<(i32, i32)>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

impl ExifValue {
    pub fn type_code(&self) -> TypeCode {
        match self {
            ExifValue::Byte(_) => TypeCode::Byte,
            ExifValue::Ascii(_) => TypeCode::Ascii,
            ExifValue::Short(_) => TypeCode::Short,
            ExifValue::Long(_) => TypeCode::Long,
            ExifValue::Rational(_) => TypeCode::Rational,
            ExifValue::SByte(_) => TypeCode::SByte,
            ExifValue::Undefined(_) => TypeCode::Undefined,
            ExifValue::SShort(_) => TypeCode::SShort,
            ExifValue::SLong(_) => TypeCode::SLong,
            ExifValue::SRational(_) => TypeCode::SRational,
            ExifValue::Float(_) => TypeCode::Float,
            ExifValue::Double(_) => TypeCode::Double,
        }
    }

    /// Número de elementos tal como se declara en la entrada IFD.
    pub fn count(&self) -> u32 {
        let count = match self {
            ExifValue::Byte(v) | ExifValue::Undefined(v) => v.len(),
            ExifValue::Ascii(v) => ascii_with_terminator_len(v),
            ExifValue::Short(v) => v.len(),
            ExifValue::Long(v) => v.len(),
            ExifValue::Rational(v) => v.len(),
            ExifValue::SByte(v) => v.len(),
            ExifValue::SShort(v) => v.len(),
            ExifValue::SLong(v) => v.len(),
            ExifValue::SRational(v) => v.len(),
            ExifValue::Float(v) => v.len(),
            ExifValue::Double(v) => v.len(),
        };
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Serialización big-endian de los elementos.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            ExifValue::Byte(v) | ExifValue::Undefined(v) => out.extend_from_slice(v),
            ExifValue::Ascii(v) => {
                out.extend_from_slice(v);
                if v.last() != Some(&0) {
                    out.push(0);
                }
            }
            ExifValue::Short(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
            ExifValue::Long(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
            ExifValue::Rational(v) => v.iter().for_each(|(n, d)| {
                out.extend_from_slice(&n.to_be_bytes());
                out.extend_from_slice(&d.to_be_bytes());
            }),
            ExifValue::SByte(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
            ExifValue::SShort(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
            ExifValue::SLong(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
            ExifValue::SRational(v) => v.iter().for_each(|(n, d)| {
                out.extend_from_slice(&n.to_be_bytes());
                out.extend_from_slice(&d.to_be_bytes());
            }),
            ExifValue::Float(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
            ExifValue::Double(v) => v.iter().for_each(|x| out.extend_from_slice(&x.to_be_bytes())),
        }
        out
    }

    /// Representación textual mostrada al usuario.
    ///
    /// Listas separadas por `", "`, racionales como decimales con hasta tres
    /// cifras y bytes como texto si son UTF-8 imprimible (si no, hexadecimal).
    pub fn display(&self) -> String {
        match self {
            ExifValue::Ascii(bytes) => {
                String::from_utf8_lossy(trim_nul(bytes)).trim().to_string()
            }
            ExifValue::Byte(bytes) | ExifValue::Undefined(bytes) => display_bytes(bytes),
            ExifValue::Short(v) => join(v),
            ExifValue::Long(v) => join(v),
            ExifValue::SByte(v) => join(v),
            ExifValue::SShort(v) => join(v),
            ExifValue::SLong(v) => join(v),
            ExifValue::Float(v) => join(v),
            ExifValue::Double(v) => join(v),
            ExifValue::Rational(v) => v
                .iter()
                .map(|&(n, d)| format_ratio(n as f64, d as f64))
                .collect::<Vec<_>>()
                .join(", "),
            ExifValue::SRational(v) => v
                .iter()
                .map(|&(n, d)| format_ratio(n as f64, d as f64))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Codifica un texto editado según el tipo declarado de la etiqueta.
    ///
    /// Enteros: `0` si el texto no se puede interpretar. Racionales:
    /// `(round(v * 1000), 1000)`, o `(0, 1)` si falla. El resto, bytes UTF-8.
    pub fn encode(type_code: TypeCode, text: &str) -> ExifValue {
        match type_code {
            TypeCode::Short => ExifValue::Short(parse_list(text).unwrap_or_else(|| vec![0])),
            TypeCode::Long => ExifValue::Long(parse_list(text).unwrap_or_else(|| vec![0])),
            TypeCode::SShort => ExifValue::SShort(parse_list(text).unwrap_or_else(|| vec![0])),
            TypeCode::SLong => ExifValue::SLong(parse_list(text).unwrap_or_else(|| vec![0])),
            TypeCode::Rational => ExifValue::Rational(
                parse_rationals(text, |v| u32::try_from(v).ok()).unwrap_or_else(|| vec![(0, 1)]),
            ),
            TypeCode::SRational => ExifValue::SRational(
                parse_rationals(text, |v| i32::try_from(v).ok())
                    .map(|values| values.into_iter().map(|(n, d)| (n, d as i32)).collect())
                    .unwrap_or_else(|| vec![(0, 1)]),
            ),
            TypeCode::Ascii => ExifValue::Ascii(text.as_bytes().to_vec()),
            TypeCode::Byte => ExifValue::Byte(text.as_bytes().to_vec()),
            TypeCode::SByte
            | TypeCode::Undefined
            | TypeCode::Float
            | TypeCode::Double => ExifValue::Undefined(text.as_bytes().to_vec()),
        }
    }

    /// Primer elemento como entero sin signo, si aplica.
    pub fn first_uint(&self) -> Option<u32> {
        match self {
            ExifValue::Byte(v) => v.first().map(|&x| u32::from(x)),
            ExifValue::Short(v) => v.first().map(|&x| u32::from(x)),
            ExifValue::Long(v) => v.first().copied(),
            _ => None,
        }
    }

    /// Primer elemento como número real, si aplica.
    pub fn first_f64(&self) -> Option<f64> {
        match self {
            ExifValue::Rational(v) => v
                .first()
                .filter(|(_, d)| *d != 0)
                .map(|&(n, d)| n as f64 / d as f64),
            ExifValue::SRational(v) => v
                .first()
                .filter(|(_, d)| *d != 0)
                .map(|&(n, d)| n as f64 / d as f64),
            other => other.first_uint().map(f64::from),
        }
    }
}

fn ascii_with_terminator_len(bytes: &[u8]) -> usize {
    if bytes.last() == Some(&0) {
        bytes.len()
    } else {
        bytes.len() + 1
    }
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0)
        .map(|index| index + 1)
        .unwrap_or(0);
    &bytes[..end]
}

fn display_bytes(bytes: &[u8]) -> String {
    let trimmed = trim_nul(bytes);
    if let Ok(text) = std::str::from_utf8(trimmed)
        && text
            .chars()
            .all(|c| !c.is_control() || c == '\n' || c == '\t')
    {
        return text.to_string();
    }

    let mut hex = String::with_capacity(2 + bytes.len() * 2);
    hex.push_str("0x");
    for byte in bytes {
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_ratio(numerator: f64, denominator: f64) -> String {
    if denominator == 0.0 {
        return "0".to_string();
    }
    let formatted = format!("{:.3}", numerator / denominator);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}

fn split_items(text: &str) -> impl Iterator<Item = &str> {
    text.split([',', ' '])
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

fn parse_list<T: std::str::FromStr>(text: &str) -> Option<Vec<T>> {
    let values = split_items(text)
        .map(|item| item.parse::<T>().ok())
        .collect::<Option<Vec<T>>>()?;
    if values.is_empty() { None } else { Some(values) }
}

fn parse_rationals<T>(text: &str, convert: impl Fn(i64) -> Option<T>) -> Option<Vec<(T, u32)>>
where
    T: Copy,
{
    let values = split_items(text)
        .map(|item| {
            let parsed = item.parse::<f64>().ok().filter(|v| v.is_finite())?;
            let scaled = (parsed * f64::from(RATIONAL_SCALE)).round();
            if scaled < i64::MIN as f64 || scaled > i64::MAX as f64 {
                return None;
            }
            convert(scaled as i64).map(|numerator| (numerator, RATIONAL_SCALE))
        })
        .collect::<Option<Vec<_>>>()?;
    if values.is_empty() { None } else { Some(values) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_parse_or_fall_back_to_zero() {
        assert_eq!(ExifValue::encode(TypeCode::Short, "3"), ExifValue::Short(vec![3]));
        assert_eq!(ExifValue::encode(TypeCode::Long, " 640 "), ExifValue::Long(vec![640]));
        assert_eq!(ExifValue::encode(TypeCode::Short, "abc"), ExifValue::Short(vec![0]));
        assert_eq!(ExifValue::encode(TypeCode::Short, "70000"), ExifValue::Short(vec![0]));
        assert_eq!(
            ExifValue::encode(TypeCode::Short, "8, 8, 8"),
            ExifValue::Short(vec![8, 8, 8])
        );
    }

    #[test]
    fn rationals_scale_by_one_thousand() {
        assert_eq!(
            ExifValue::encode(TypeCode::Rational, "72.0"),
            ExifValue::Rational(vec![(72000, 1000)])
        );
        assert_eq!(
            ExifValue::encode(TypeCode::Rational, "2.8"),
            ExifValue::Rational(vec![(2800, 1000)])
        );
        assert_eq!(
            ExifValue::encode(TypeCode::Rational, "f/2.8"),
            ExifValue::Rational(vec![(0, 1)])
        );
        assert_eq!(
            ExifValue::encode(TypeCode::Rational, "-1"),
            ExifValue::Rational(vec![(0, 1)])
        );
        assert_eq!(
            ExifValue::encode(TypeCode::SRational, "-0.5"),
            ExifValue::SRational(vec![(-500, 1000)])
        );
    }

    #[test]
    fn other_types_become_utf8_bytes() {
        assert_eq!(
            ExifValue::encode(TypeCode::Ascii, "Canon"),
            ExifValue::Ascii(b"Canon".to_vec())
        );
        assert_eq!(
            ExifValue::encode(TypeCode::Undefined, "0231"),
            ExifValue::Undefined(b"0231".to_vec())
        );
    }

    #[test]
    fn display_is_stable_under_reencoding() {
        let original = ExifValue::Rational(vec![(72, 1)]);
        assert_eq!(original.display(), "72");
        let reencoded = ExifValue::encode(TypeCode::Rational, &original.display());
        assert_eq!(reencoded.display(), "72");

        let gps = ExifValue::Rational(vec![(40, 1), (26, 1), (4632, 100)]);
        assert_eq!(gps.display(), "40, 26, 46.32");
        assert_eq!(
            ExifValue::encode(TypeCode::Rational, &gps.display()).display(),
            gps.display()
        );

        assert_eq!(ExifValue::Rational(vec![(1, 3)]).display(), "0.333");
        assert_eq!(ExifValue::Rational(vec![(1, 0)]).display(), "0");
    }

    #[test]
    fn bytes_render_as_text_or_hex() {
        assert_eq!(ExifValue::Ascii(b"Nikon\0\0".to_vec()).display(), "Nikon");
        assert_eq!(ExifValue::Undefined(b"0230".to_vec()).display(), "0230");
        assert_eq!(ExifValue::Byte(vec![2, 2, 0, 0]).display(), "0x02020000");
    }

    #[test]
    fn ascii_count_includes_terminator() {
        let value = ExifValue::Ascii(b"abc".to_vec());
        assert_eq!(value.count(), 4);
        assert_eq!(value.to_be_bytes(), b"abc\0".to_vec());

        let value = ExifValue::Ascii(b"abc\0".to_vec());
        assert_eq!(value.count(), 4);
        assert_eq!(value.to_be_bytes().len(), 4);
    }
}
