//! Deserialize data from the bytecode protocol.
use bytes::Bytes;
use nom::{
    IResult,
    bytes::complete::take,
    multi::many_m_n,
    number::complete::{be_u8, be_u16, be_u32},
};
use nombytes::NomBytes;

use crate::constants::MAX_PROTOCOL_ARRAY_SIZE;

/// Convert bytes to a validated UTF-8 string.
/// Returns an error if the bytes are not valid UTF-8.
pub fn bytes_to_string(bytes: &Bytes) -> Result<String, nom::Err<nom::error::Error<NomBytes>>> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| {
            nom::Err::Failure(nom::error::Error::new(
                NomBytes::from(bytes.as_ref()),
                nom::error::ErrorKind::Verify,
            ))
        })
}

/// Parse a u16-length-prefixed string as raw bytes.
pub fn parse_string(s: NomBytes) -> IResult<NomBytes, Bytes> {
    let (s, length) = be_u16(s)?;
    let (s, string) = take(length)(s)?;
    Ok((s, string.into_bytes()))
}

/// Parse a u16-length-prefixed string, validating UTF-8.
pub fn parse_string_utf8(s: NomBytes) -> IResult<NomBytes, String> {
    let (s, raw) = parse_string(s)?;
    let string = bytes_to_string(&raw)?;
    Ok((s, string))
}

/// Parse a u32-length-prefixed byte chunk.
pub fn parse_chunk(s: NomBytes) -> IResult<NomBytes, Bytes> {
    let (s, length) = be_u32(s)?;
    let (s, chunk) = take(length)(s)?;
    Ok((s, chunk.into_bytes()))
}

/// Parse a u32-count-prefixed array of elements.
pub fn parse_array<O, E, F>(f: F) -> impl FnMut(NomBytes) -> IResult<NomBytes, Vec<O>, E>
where
    F: nom::Parser<NomBytes, O, E> + Copy,
    E: nom::error::ParseError<NomBytes>,
{
    move |input: NomBytes| {
        let (i, count) = be_u32(input)?;

        // Validate array size bounds
        if count > MAX_PROTOCOL_ARRAY_SIZE {
            return Err(nom::Err::Failure(E::from_error_kind(
                i,
                nom::error::ErrorKind::TooLarge,
            )));
        }

        many_m_n(count as usize, count as usize, f)(i)
    }
}

/// Parse an optional byte chunk: one presence byte, then the chunk.
pub fn parse_optional_chunk(s: NomBytes) -> IResult<NomBytes, Option<Bytes>> {
    let (s, present) = be_u8(s)?;
    if present == 0 {
        return Ok((s, None));
    }
    let (s, chunk) = parse_chunk(s)?;
    Ok((s, Some(chunk)))
}

/// Parse an optional string: one presence byte, then the string.
pub fn parse_optional_string(s: NomBytes) -> IResult<NomBytes, Option<String>> {
    let (s, present) = be_u8(s)?;
    if present == 0 {
        return Ok((s, None));
    }
    let (s, string) = parse_string_utf8(s)?;
    Ok((s, Some(string)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::number::complete::be_u64;

    #[test]
    fn test_bytes_to_string_valid_utf8() {
        let bytes = Bytes::from("hello");
        assert_eq!(bytes_to_string(&bytes).unwrap(), "hello");
    }

    #[test]
    fn test_bytes_to_string_invalid_utf8() {
        let bytes = Bytes::from(vec![0xff, 0xfe]);
        assert!(bytes_to_string(&bytes).is_err());
    }

    #[test]
    fn test_parse_string() {
        let mut data = Vec::new();
        data.extend_from_slice(&5u16.to_be_bytes());
        data.extend_from_slice(b"hello");
        data.extend_from_slice(b"extra"); // trailing bytes after

        let input = NomBytes::new(Bytes::from(data));
        let (remaining, parsed) = parse_string(input).unwrap();

        assert_eq!(parsed, Bytes::from("hello"));
        assert_eq!(remaining.into_bytes(), Bytes::from("extra"));
    }

    #[test]
    fn test_parse_string_utf8_rejects_bad_bytes() {
        let mut data = Vec::new();
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(&[0xff, 0xfe]);

        let input = NomBytes::new(Bytes::from(data));
        assert!(parse_string_utf8(input).is_err());
    }

    #[test]
    fn test_parse_string_truncated() {
        let mut data = Vec::new();
        data.extend_from_slice(&9u16.to_be_bytes()); // claims 9, only 2 follow
        data.extend_from_slice(b"hi");

        let input = NomBytes::new(Bytes::from(data));
        assert!(parse_string(input).is_err());
    }

    #[test]
    fn test_parse_chunk() {
        let mut data = Vec::new();
        data.extend_from_slice(&3u32.to_be_bytes());
        data.extend_from_slice(&[9, 8, 7]);

        let input = NomBytes::new(Bytes::from(data));
        let (remaining, parsed) = parse_chunk(input).unwrap();

        assert_eq!(parsed, Bytes::from(vec![9, 8, 7]));
        assert!(remaining.into_bytes().is_empty());
    }

    #[test]
    fn test_parse_array_empty() {
        let data = 0u32.to_be_bytes();
        let input = NomBytes::new(Bytes::from(data.to_vec()));

        let mut parser = parse_array(be_u64::<_, nom::error::Error<NomBytes>>);
        let (_, parsed): (_, Vec<u64>) = parser(input).unwrap();

        assert!(parsed.is_empty());
    }

    #[test]
    fn test_parse_array_with_elements() {
        let mut data = Vec::new();
        data.extend_from_slice(&3u32.to_be_bytes());
        data.extend_from_slice(&10u64.to_be_bytes());
        data.extend_from_slice(&20u64.to_be_bytes());
        data.extend_from_slice(&30u64.to_be_bytes());

        let input = NomBytes::new(Bytes::from(data));

        let mut parser = parse_array(be_u64::<_, nom::error::Error<NomBytes>>);
        let (_, parsed): (_, Vec<u64>) = parser(input).unwrap();

        assert_eq!(parsed, vec![10, 20, 30]);
    }

    #[test]
    fn test_parse_array_too_large() {
        let data = (MAX_PROTOCOL_ARRAY_SIZE + 1).to_be_bytes();
        let input = NomBytes::new(Bytes::from(data.to_vec()));

        let mut parser = parse_array(be_u64::<_, nom::error::Error<NomBytes>>);
        let result: IResult<_, Vec<u64>, nom::error::Error<NomBytes>> = parser(input);

        assert!(result.is_err());
    }

    #[test]
    fn test_parse_optional_chunk_absent() {
        let input = NomBytes::new(Bytes::from(vec![0u8]));
        let (_, parsed) = parse_optional_chunk(input).unwrap();
        assert_eq!(parsed, None);
    }

    #[test]
    fn test_parse_optional_chunk_present() {
        let mut data = vec![1u8];
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&[0xAA, 0xBB]);

        let input = NomBytes::new(Bytes::from(data));
        let (_, parsed) = parse_optional_chunk(input).unwrap();
        assert_eq!(parsed, Some(Bytes::from(vec![0xAA, 0xBB])));
    }

    #[test]
    fn test_parse_optional_string_present() {
        let mut data = vec![1u8];
        data.extend_from_slice(&2u16.to_be_bytes());
        data.extend_from_slice(b"ok");

        let input = NomBytes::new(Bytes::from(data));
        let (_, parsed) = parse_optional_string(input).unwrap();
        assert_eq!(parsed, Some("ok".to_string()));
    }
}
