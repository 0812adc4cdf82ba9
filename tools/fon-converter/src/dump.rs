//! Writers producing source-embeddable text dumps of binary blobs.

use std::io::{self, Write};

/// The number of bytes written on each line of a dump.
const BYTES_PER_LINE: usize = 16;

/// Writes `bytes` as a C array definition named `name`.
///
/// # Errors
///
/// Returns any error produced by `writer`.
pub fn write_c_array<W: Write>(mut writer: W, name: &str, bytes: &[u8]) -> io::Result<()> {
    writeln!(writer, "static const unsigned char {name}[{}] = {{", bytes.len())?;
    write_lines(&mut writer, bytes)?;
    writeln!(writer, "}};")
}

/// Writes `bytes` as a Rust static definition named `name`.
///
/// # Errors
///
/// Returns any error produced by `writer`.
pub fn write_rust_static<W: Write>(mut writer: W, name: &str, bytes: &[u8]) -> io::Result<()> {
    let name = name.to_ascii_uppercase();
    writeln!(writer, "pub static {name}: [u8; {}] = [", bytes.len())?;
    write_lines(&mut writer, bytes)?;
    writeln!(writer, "];")
}

/// Writes `bytes` as indented lines of comma-separated hexadecimal literals.
fn write_lines<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<()> {
    for line in bytes.chunks(BYTES_PER_LINE) {
        write!(writer, "   ")?;
        for byte in line {
            write!(writer, " 0x{byte:02x},")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Returns `true` if `name` can be used as an identifier in both C and Rust.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod test {
    use super::{is_valid_identifier, write_c_array, write_rust_static};

    #[test]
    fn c_array() {
        let bytes: Vec<u8> = (0..18).collect();
        let mut out = Vec::new();
        write_c_array(&mut out, "fonts", &bytes).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "static const unsigned char fonts[18] = {\n    \
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, \
            0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f,\n    \
            0x10, 0x11,\n};\n"
        );
    }

    #[test]
    fn rust_static() {
        let mut out = Vec::new();
        write_rust_static(&mut out, "fonts", &[0xDF, 0xBF]).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "pub static FONTS: [u8; 2] = [\n    0xdf, 0xbf,\n];\n"
        );
    }

    #[test]
    fn identifiers() {
        assert!(is_valid_identifier("font_blob2"));
        assert!(is_valid_identifier("_x"));
        assert!(!is_valid_identifier("2fonts"));
        assert!(!is_valid_identifier("font-blob"));
        assert!(!is_valid_identifier(""));
    }
}
