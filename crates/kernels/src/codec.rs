//! Conversion between `f32` and the storage encodings.
//!
//! Elements live in little-endian byte buffers; element `index` of a buffer
//! in encoding `dtype` starts at byte `index * dtype.element_size_bytes()`.
//! Indexing past the end of the buffer panics.

use crate::config::DataType;

/// Decodes element `index` of `bytes` to `f32`.
#[inline]
pub fn load(bytes: &[u8], index: usize, dtype: DataType) -> f32 {
    match dtype {
        DataType::Float32 => {
            let offset = index * 4;
            let mut raw = [0u8; 4];
            raw.copy_from_slice(&bytes[offset..offset + 4]);
            f32::from_le_bytes(raw)
        }
        DataType::Float16 => f16_bits_to_f32(read_u16(bytes, index)),
        DataType::BFloat16 => bf16_bits_to_f32(read_u16(bytes, index)),
    }
}

/// Encodes `value` into element `index` of `bytes`.
#[inline]
pub fn store(bytes: &mut [u8], index: usize, dtype: DataType, value: f32) {
    match dtype {
        DataType::Float32 => {
            let offset = index * 4;
            bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
        DataType::Float16 => write_u16(bytes, index, f32_to_f16_bits(value)),
        DataType::BFloat16 => write_u16(bytes, index, f32_to_bf16_bits(value)),
    }
}

#[inline]
fn read_u16(bytes: &[u8], index: usize) -> u16 {
    let offset = index * 2;
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn write_u16(bytes: &mut [u8], index: usize, bits: u16) {
    let offset = index * 2;
    bytes[offset..offset + 2].copy_from_slice(&bits.to_le_bytes());
}

/// IEEE-754 binary32 to binary16, round to nearest even.
pub fn f32_to_f16_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let src_exp = ((bits >> 23) & 0xFF) as i32;
    let mant = bits & 0x007F_FFFF;
    let exp = src_exp - 127 + 15;

    if src_exp == 0xFF {
        if mant == 0 {
            return sign | 0x7C00;
        }
        // Keep the top payload bits and force the quiet bit so the result stays NaN.
        return sign | 0x7C00 | 0x0200 | (mant >> 13) as u16;
    }

    if exp >= 31 {
        return sign | 0x7C00;
    }

    if exp <= 0 {
        if exp < -10 {
            return sign;
        }
        let mant = mant | 0x0080_0000;
        let shift = (1 - exp) as u32 + 13;
        let mut half = mant >> shift;
        let remainder = mant & ((1u32 << shift) - 1);
        let halfway = 1u32 << (shift - 1);
        if remainder > halfway || (remainder == halfway && half & 1 == 1) {
            // A carry out of the mantissa lands in the exponent, giving the smallest normal.
            half += 1;
        }
        return sign | half as u16;
    }

    let mut half = ((exp as u32) << 10) | (mant >> 13);
    let remainder = mant & 0x1FFF;
    if remainder > 0x1000 || (remainder == 0x1000 && half & 1 == 1) {
        // Rounding up from the largest finite value carries into infinity.
        half += 1;
    }
    sign | half as u16
}

/// IEEE-754 binary16 to binary32. Exact for every input.
pub fn f16_bits_to_f32(half: u16) -> f32 {
    let sign = ((half & 0x8000) as u32) << 16;
    let exp = ((half >> 10) & 0x1F) as u32;
    let mant = (half & 0x03FF) as u32;

    match exp {
        0 => {
            // mant / 1024 * 2^-14
            let magnitude = mant as f32 * f32::from_bits(0x3380_0000);
            if sign == 0 {
                magnitude
            } else {
                -magnitude
            }
        }
        31 => f32::from_bits(sign | 0x7F80_0000 | (mant << 13)),
        _ => f32::from_bits(sign | ((exp + 127 - 15) << 23) | (mant << 13)),
    }
}

/// Top 16 bits of the binary32 pattern, round to nearest even.
pub fn f32_to_bf16_bits(value: f32) -> u16 {
    let bits = value.to_bits();
    if value.is_nan() {
        return ((bits >> 16) as u16) | 0x0040;
    }
    let rounding = ((bits >> 16) & 1) + 0x7FFF;
    ((bits + rounding) >> 16) as u16
}

pub fn bf16_bits_to_f32(bits: u16) -> f32 {
    f32::from_bits((bits as u32) << 16)
}
