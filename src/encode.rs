//! Serialize data into the bytecode protocol.
//!
//! All multi-byte integers are written big-endian. Strings carry a u16
//! length prefix, byte chunks a u32 length prefix, arrays a u32 count
//! prefix. Optional fields carry a one-byte presence tag.
use bytes::{BufMut, Bytes};

use crate::error::Result;

pub trait ToByte {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()>;
}

impl<'a, T: ToByte + 'a + ?Sized> ToByte for &'a T {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        (*self).encode(buffer)
    }
}

impl ToByte for u8 {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_u8(*self);
        Ok(())
    }
}

impl ToByte for u16 {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_u16(*self);
        Ok(())
    }
}

impl ToByte for u32 {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_u32(*self);
        Ok(())
    }
}

impl ToByte for u64 {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_u64(*self);
        Ok(())
    }
}

impl ToByte for str {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        buffer.put_u16(self.len() as u16);
        buffer.put(self.as_bytes());
        Ok(())
    }
}

impl ToByte for String {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        self.as_str().encode(buffer)
    }
}

impl ToByte for Bytes {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        buffer.put_u32(self.len() as u32);
        buffer.put_slice(self);
        Ok(())
    }
}

impl<V: ToByte> ToByte for [V] {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        encode_as_array(buffer, self, |buffer, x| x.encode(buffer))
    }
}

impl<V: ToByte> ToByte for Vec<V> {
    fn encode<T: BufMut>(&self, buffer: &mut T) -> Result<()> {
        self.as_slice().encode(buffer)
    }
}

impl ToByte for Option<Bytes> {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        match self {
            Some(chunk) => {
                buffer.put_u8(1);
                chunk.encode(buffer)
            }
            None => {
                buffer.put_u8(0);
                Ok(())
            }
        }
    }
}

impl ToByte for Option<String> {
    fn encode<W: BufMut>(&self, buffer: &mut W) -> Result<()> {
        match self {
            Some(s) => {
                buffer.put_u8(1);
                s.encode(buffer)
            }
            None => {
                buffer.put_u8(0);
                Ok(())
            }
        }
    }
}

/// Renders the length of `xs` to `buffer` as the start of a protocol array
/// and then for each element of `xs` invokes `f` assuming that function will
/// render the element to the buffer.
pub fn encode_as_array<T, F, W>(buffer: &mut W, xs: &[T], mut f: F) -> Result<()>
where
    F: FnMut(&mut W, &T) -> Result<()>,
    W: BufMut,
{
    buffer.put_u32(xs.len() as u32);
    for x in xs {
        f(buffer, x)?;
    }
    Ok(())
}
