//! Minimal Solidity ABI codec
//!
//! Just enough of the contract ABI to drive the locker and ERC-20 calls:
//! 4-byte Keccak selectors, 32-byte word encoding for address/uint256, and
//! head/tail layout for dynamic strings. No external ABI machinery.

use sha3::{Digest, Keccak256};

/// ABI word size in bytes
pub const WORD: usize = 32;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Return data too short: need {need} bytes, have {have}")]
    TooShort { need: usize, have: usize },

    #[error("Offset {0} out of bounds")]
    BadOffset(usize),

    #[error("String payload is not valid UTF-8")]
    BadUtf8,
}

/// A single ABI-encodable value
#[derive(Debug, Clone)]
pub enum Token {
    Address(String),
    Uint(u128),
    Str(String),
}

impl Token {
    fn is_dynamic(&self) -> bool {
        matches!(self, Token::Str(_))
    }
}

/// Compute the 4-byte function selector for a canonical signature,
/// e.g. `selector("approve(address,uint256)")`.
pub fn selector(signature: &str) -> [u8; 4] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&digest[..4]);
    out
}

/// Encode a full calldata payload: selector + ABI-encoded arguments,
/// returned as a 0x-prefixed hex string.
pub fn encode_call(signature: &str, args: &[Token]) -> Result<String, AbiError> {
    let mut data = selector(signature).to_vec();
    data.extend_from_slice(&encode_args(args)?);
    Ok(format!("0x{}", hex::encode(data)))
}

/// Encode arguments using the standard head/tail layout.
fn encode_args(args: &[Token]) -> Result<Vec<u8>, AbiError> {
    let head_len = args.len() * WORD;
    let mut head: Vec<u8> = Vec::with_capacity(head_len);
    let mut tail: Vec<u8> = Vec::new();

    for arg in args {
        if arg.is_dynamic() {
            head.extend_from_slice(&encode_uint((head_len + tail.len()) as u128));
            match arg {
                Token::Str(s) => tail.extend_from_slice(&encode_string_tail(s)),
                _ => unreachable!(),
            }
        } else {
            match arg {
                Token::Address(a) => head.extend_from_slice(&encode_address(a)?),
                Token::Uint(v) => head.extend_from_slice(&encode_uint(*v)),
                Token::Str(_) => unreachable!(),
            }
        }
    }

    head.extend_from_slice(&tail);
    Ok(head)
}

/// Encode a u128 as a left-padded 32-byte word
pub fn encode_uint(value: u128) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[WORD - 16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Encode a 0x-prefixed address as a left-padded 32-byte word
pub fn encode_address(address: &str) -> Result<[u8; WORD], AbiError> {
    let stripped = address
        .strip_prefix("0x")
        .ok_or_else(|| AbiError::InvalidAddress(address.to_string()))?;
    let bytes = hex::decode(stripped).map_err(|_| AbiError::InvalidAddress(address.to_string()))?;
    if bytes.len() != 20 {
        return Err(AbiError::InvalidAddress(address.to_string()));
    }
    let mut word = [0u8; WORD];
    word[WORD - 20..].copy_from_slice(&bytes);
    Ok(word)
}

/// Dynamic string tail: length word followed by the bytes padded to a word
fn encode_string_tail(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut out = encode_uint(bytes.len() as u128).to_vec();
    out.extend_from_slice(bytes);
    let rem = bytes.len() % WORD;
    if rem != 0 {
        out.extend(std::iter::repeat(0u8).take(WORD - rem));
    }
    out
}

/// Word-oriented reader over ABI return data.
///
/// Accessors take word indices (for heads) or byte offsets (for tails);
/// uint256 values above `u128::MAX` saturate, which keeps comparisons
/// against huge allowances (`MaxUint256` approvals) well-behaved.
pub struct AbiReader<'a> {
    data: &'a [u8],
}

impl<'a> AbiReader<'a> {
    /// Construct from 0x-prefixed hex return data
    pub fn from_hex(hex_data: &str) -> Result<AbiReaderOwned, AbiError> {
        let stripped = hex_data.strip_prefix("0x").unwrap_or(hex_data);
        let data = hex::decode(stripped).map_err(|_| AbiError::InvalidHex(hex_data.to_string()))?;
        Ok(AbiReaderOwned { data })
    }

    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The 32-byte word at word index `i`
    pub fn word(&self, i: usize) -> Result<&'a [u8], AbiError> {
        let start = i * WORD;
        let end = start + WORD;
        if end > self.data.len() {
            return Err(AbiError::TooShort {
                need: end,
                have: self.data.len(),
            });
        }
        Ok(&self.data[start..end])
    }

    /// Decode the word at index `i` as a uint256, saturating to u128
    pub fn uint(&self, i: usize) -> Result<u128, AbiError> {
        let word = self.word(i)?;
        if word[..WORD - 16].iter().any(|&b| b != 0) {
            return Ok(u128::MAX);
        }
        let mut buf = [0u8; 16];
        buf.copy_from_slice(&word[WORD - 16..]);
        Ok(u128::from_be_bytes(buf))
    }

    /// Decode the word at index `i` as a 0x-prefixed lowercase address
    pub fn address(&self, i: usize) -> Result<String, AbiError> {
        let word = self.word(i)?;
        Ok(format!("0x{}", hex::encode(&word[WORD - 20..])))
    }

    /// Decode a dynamic string whose tail begins at byte offset `offset`
    /// (relative to the start of this reader's data).
    pub fn string_at(&self, offset: usize) -> Result<String, AbiError> {
        if offset + WORD > self.data.len() {
            return Err(AbiError::BadOffset(offset));
        }
        let len_reader = AbiReader::new(&self.data[offset..]);
        let len = len_reader.uint(0)? as usize;
        let start = offset + WORD;
        let end = start + len;
        if end > self.data.len() {
            return Err(AbiError::BadOffset(offset));
        }
        String::from_utf8(self.data[start..end].to_vec()).map_err(|_| AbiError::BadUtf8)
    }

    /// A sub-reader starting at byte offset `offset`; used for decoding
    /// tuples whose inner offsets are relative to the tuple base.
    pub fn slice_from(&self, offset: usize) -> Result<AbiReader<'a>, AbiError> {
        if offset > self.data.len() {
            return Err(AbiError::BadOffset(offset));
        }
        Ok(AbiReader::new(&self.data[offset..]))
    }
}

/// Owning variant produced by `AbiReader::from_hex`
pub struct AbiReaderOwned {
    data: Vec<u8>,
}

impl AbiReaderOwned {
    pub fn reader(&self) -> AbiReader<'_> {
        AbiReader::new(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_erc20_selectors() {
        assert_eq!(selector("approve(address,uint256)"), [0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(selector("transfer(address,uint256)"), [0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(selector("balanceOf(address)"), [0x70, 0xa0, 0x82, 0x31]);
        assert_eq!(selector("allowance(address,address)"), [0xdd, 0x62, 0xed, 0x3e]);
        assert_eq!(selector("decimals()"), [0x31, 0x3c, 0xe5, 0x67]);
        assert_eq!(selector("symbol()"), [0x95, 0xd8, 0x9b, 0x41]);
    }

    #[test]
    fn test_encode_uint_layout() {
        let word = encode_uint(1);
        assert_eq!(word[..31], [0u8; 31]);
        assert_eq!(word[31], 1);

        let word = encode_uint(0x0102);
        assert_eq!(word[30], 0x01);
        assert_eq!(word[31], 0x02);
    }

    #[test]
    fn test_encode_address_layout() {
        let addr = "0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F";
        let word = encode_address(addr).unwrap();
        assert_eq!(word[..12], [0u8; 12]);
        assert_eq!(hex::encode(&word[12..]), "8d3815197b07a24d8df7f50e28cd47fe2165d65f");

        assert!(encode_address("8D38").is_err());
        assert!(encode_address("0x1234").is_err());
    }

    #[test]
    fn test_encode_call_static_args() {
        let data = encode_call(
            "approve(address,uint256)",
            &[
                Token::Address("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F".into()),
                Token::Uint(100),
            ],
        )
        .unwrap();

        // selector + 2 words
        assert!(data.starts_with("0x095ea7b3"));
        assert_eq!(data.len(), 2 + 8 + 64 * 2);
    }

    #[test]
    fn test_encode_call_dynamic_string() {
        // f(uint256,string) with a short string: head is 2 words, the string
        // offset points just past the head (0x40), the tail is len + padding.
        let data = encode_call("f(uint256,string)", &[Token::Uint(7), Token::Str("ab".into())])
            .unwrap();

        let bytes = hex::decode(&data[2..]).unwrap();
        let args = AbiReader::new(&bytes[4..]);
        assert_eq!(args.uint(0).unwrap(), 7);
        assert_eq!(args.uint(1).unwrap(), 0x40);
        assert_eq!(args.uint(2).unwrap(), 2); // length word
        assert_eq!(&bytes[4 + 96..4 + 98], b"ab");
        assert_eq!(args.len(), 4 * WORD); // head + one padded tail word
    }

    #[test]
    fn test_reader_uint_saturates() {
        let mut data = vec![0xffu8; WORD];
        data[0] = 0x01; // high bytes set -> beyond u128
        let reader = AbiReader::new(&data);
        assert_eq!(reader.uint(0).unwrap(), u128::MAX);

        let word = encode_uint(42);
        let reader = AbiReader::new(&word);
        assert_eq!(reader.uint(0).unwrap(), 42);
    }

    #[test]
    fn test_reader_string_at() {
        // Simulate return data of `symbol()`: offset word, length word, bytes
        let mut data = encode_uint(0x20).to_vec();
        data.extend_from_slice(&encode_uint(3));
        let mut tail = b"FRM".to_vec();
        tail.resize(WORD, 0);
        data.extend_from_slice(&tail);

        let reader = AbiReader::new(&data);
        let offset = reader.uint(0).unwrap() as usize;
        assert_eq!(reader.string_at(offset).unwrap(), "FRM");
    }

    #[test]
    fn test_reader_too_short() {
        let data = [0u8; 16];
        let reader = AbiReader::new(&data);
        assert!(matches!(reader.uint(0), Err(AbiError::TooShort { .. })));
    }
}
