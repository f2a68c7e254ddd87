use crate::error::{MessageError, Result};

/// Bounds-checked read window `buf[offset..offset + need]`.
pub(crate) fn window(buf: &[u8], offset: usize, need: usize) -> Result<&[u8]> {
    match offset.checked_add(need) {
        Some(end) if end <= buf.len() => Ok(&buf[offset..end]),
        _ => Err(MessageError::BufferTooShort {
            need,
            offset,
            have: buf.len(),
        }),
    }
}

/// Bounds-checked write window `buf[offset..offset + need]`.
pub(crate) fn window_mut(buf: &mut [u8], offset: usize, need: usize) -> Result<&mut [u8]> {
    match offset.checked_add(need) {
        Some(end) if end <= buf.len() => Ok(&mut buf[offset..end]),
        _ => Err(MessageError::BufferTooShort {
            need,
            offset,
            have: buf.len(),
        }),
    }
}

/// Declares a record made only of big-endian `i16` fields, laid out in
/// declaration order.
macro_rules! i16_record {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$field_meta:meta])* $field:ident ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            $( $(#[$field_meta])* pub $field: i16, )+
        }

        impl $crate::Message for $name {
            const PACKET_SIZE: usize = 2 * [$( stringify!($field) ),+].len();

            fn encode(&self, buf: &mut [u8], offset: usize) -> $crate::Result<()> {
                let mut dst = $crate::layout::window_mut(buf, offset, Self::PACKET_SIZE)?;
                $( ::bytes::BufMut::put_i16(&mut dst, self.$field); )+
                Ok(())
            }

            fn decode(&mut self, buf: &[u8], offset: usize) -> $crate::Result<()> {
                let mut src = $crate::layout::window(buf, offset, Self::PACKET_SIZE)?;
                $( self.$field = ::bytes::Buf::get_i16(&mut src); )+
                Ok(())
            }
        }
    };
}

pub(crate) use i16_record;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_checks_bounds() {
        let buf = [0u8; 8];
        assert_eq!(window(&buf, 2, 6).unwrap().len(), 6);
        assert!(matches!(
            window(&buf, 3, 6),
            Err(MessageError::BufferTooShort {
                need: 6,
                offset: 3,
                have: 8
            })
        ));
        assert!(window(&buf, usize::MAX, 2).is_err());
    }

    #[test]
    fn window_mut_checks_bounds() {
        let mut buf = [0u8; 4];
        window_mut(&mut buf, 0, 4).unwrap()[3] = 9;
        assert_eq!(buf[3], 9);
        assert!(window_mut(&mut buf, 1, 4).is_err());
    }
}
