//! String descriptor generation.
//!
//! Index 0 with language 0 is the supported-language list; nonzero indices
//! under en-US resolve to the fixed identity strings. Strings go on the
//! wire as UTF-16LE with a trailing NUL code unit, prefixed by the 2-byte
//! {bLength, bDescriptorType} header.

use crate::ids;
use crate::usb;
use crate::{PenProtocolError, PenProtocolResult};

/// Language ids the device supports, in descriptor order.
pub const LANGUAGES: &[u16] = &[ids::LANG_EN_US];

/// Build the string descriptor for `index` under language `lang` into
/// `buf`, returning its length (header included).
///
/// # Errors
///
/// Returns [`PenProtocolError::UnknownStringDescriptor`] for any
/// index/language pair the device does not define, and
/// [`PenProtocolError::BufferTooSmall`] if the encoding does not fit.
pub fn string_descriptor(index: u8, lang: u16, buf: &mut [u8]) -> PenProtocolResult<usize> {
    if index == 0 && lang == 0 {
        return language_list(buf);
    }

    let text = match (index, lang) {
        (ids::STRING_ID_MANUFACTURER, ids::LANG_EN_US) => ids::MANUFACTURER,
        (ids::STRING_ID_PRODUCT, ids::LANG_EN_US) => ids::PRODUCT,
        (ids::STRING_ID_SERIAL, ids::LANG_EN_US) => ids::SERIAL,
        _ => return Err(PenProtocolError::UnknownStringDescriptor { index, lang }),
    };

    // UTF-16LE code units plus the trailing NUL the device has always sent.
    let payload_len = (text.encode_utf16().count() + 1) * 2;
    let total = payload_len + 2;
    if buf.len() < total {
        return Err(PenProtocolError::BufferTooSmall {
            needed: total,
            capacity: buf.len(),
        });
    }

    buf[0] = total as u8;
    buf[1] = usb::DT_STRING;
    let mut pos = 2;
    for unit in text.encode_utf16().chain(core::iter::once(0u16)) {
        buf[pos..pos + 2].copy_from_slice(&unit.to_le_bytes());
        pos += 2;
    }
    Ok(total)
}

fn language_list(buf: &mut [u8]) -> PenProtocolResult<usize> {
    let total = 2 + LANGUAGES.len() * 2;
    if buf.len() < total {
        return Err(PenProtocolError::BufferTooSmall {
            needed: total,
            capacity: buf.len(),
        });
    }
    buf[0] = total as u8;
    buf[1] = usb::DT_STRING;
    let mut pos = 2;
    for lang in LANGUAGES {
        buf[pos..pos + 2].copy_from_slice(&lang.to_le_bytes());
        pos += 2;
    }
    Ok(total)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn language_list_is_exact_bytes() {
        let mut buf = [0u8; 8];
        let n = string_descriptor(0, 0, &mut buf).unwrap();
        assert_eq!(&buf[..n], &[4, 0x03, 0x09, 0x04]);
    }

    #[test]
    fn manufacturer_string_has_header_and_nul() {
        let mut buf = [0u8; 64];
        let n = string_descriptor(1, ids::LANG_EN_US, &mut buf).unwrap();
        // "Wacom Co., Ltd." = 15 chars, +NUL, *2, +header
        assert_eq!(n, (15 + 1) * 2 + 2);
        assert_eq!(buf[0] as usize, n);
        assert_eq!(buf[1], 0x03);
        assert_eq!(&buf[2..4], &[b'W', 0]);
        assert_eq!(&buf[n - 2..n], &[0, 0]);
    }

    #[test]
    fn all_identity_strings_resolve() {
        let mut buf = [0u8; 64];
        for index in 1..=3u8 {
            assert!(string_descriptor(index, ids::LANG_EN_US, &mut buf).is_ok());
        }
    }

    #[test]
    fn unknown_index_or_language_fails() {
        let mut buf = [0u8; 64];
        assert_eq!(
            string_descriptor(4, ids::LANG_EN_US, &mut buf),
            Err(PenProtocolError::UnknownStringDescriptor {
                index: 4,
                lang: ids::LANG_EN_US
            })
        );
        // A valid index under the wrong language is just as unknown.
        assert!(matches!(
            string_descriptor(1, 0x0407, &mut buf),
            Err(PenProtocolError::UnknownStringDescriptor { .. })
        ));
        // Index 0 under a nonzero language is not the language list.
        assert!(matches!(
            string_descriptor(0, ids::LANG_EN_US, &mut buf),
            Err(PenProtocolError::UnknownStringDescriptor { .. })
        ));
    }

    #[test]
    fn short_buffer_reports_needed_size() {
        let mut buf = [0u8; 4];
        let err = string_descriptor(2, ids::LANG_EN_US, &mut buf).unwrap_err();
        assert_eq!(
            err,
            PenProtocolError::BufferTooSmall {
                needed: (15 + 1) * 2 + 2,
                capacity: 4
            }
        );
    }
}
