//! LEB128 var-ints: 7 bits per byte, low group first, high bit set on
//! every byte but the last.

use alloc::vec::Vec;

/// Longest encoding of a `u32`.
pub(crate) const MAX_LEN_32: usize = 5;
/// Longest encoding of a `u64`.
pub(crate) const MAX_LEN_64: usize = 10;

pub(crate) fn write_u64(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::write_u64;

    #[test]
    fn groups_of_seven_bits() {
        let encode = |value| {
            let mut buf = Vec::new();
            write_u64(&mut buf, value);
            buf
        };
        assert_eq!(encode(0), [0x00]);
        assert_eq!(encode(127), [0x7F]);
        assert_eq!(encode(300), [0xAC, 0x02]);
        assert_eq!(encode(u64::MAX).len(), super::MAX_LEN_64);
        assert_eq!(encode(u32::MAX.into()).len(), super::MAX_LEN_32);
    }
}
