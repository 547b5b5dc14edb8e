//! ERC-20 read helpers
//!
//! Metadata reads (`decimals`, `symbol`) degrade gracefully: a token with a
//! broken or missing implementation yields `None` and the caller falls back
//! to defaults. Balance and allowance reads surface their errors so callers
//! can decide (the approval predicate treats a failed allowance read as
//! "approval needed").

use lockyard_core::Address;

use crate::abi::{encode_call, AbiReader, Token};
use crate::{Result, RpcClient};

/// Token metadata from the chain
#[derive(Debug, Clone, Default)]
pub struct TokenInfo {
    pub symbol: Option<String>,
    pub decimals: Option<u32>,
}

/// Fetch symbol and decimals for a token. Never fails; individual read
/// failures are logged at debug and leave the field unset.
pub async fn token_info(client: &RpcClient, token: &Address) -> TokenInfo {
    let decimals = match decimals(client, token).await {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::debug!(token = %token, error = %e, "decimals() read failed");
            None
        }
    };

    let symbol = match symbol(client, token).await {
        Ok(s) => Some(s),
        Err(e) => {
            tracing::debug!(token = %token, error = %e, "symbol() read failed");
            None
        }
    };

    TokenInfo { symbol, decimals }
}

/// `decimals() -> uint8`
pub async fn decimals(client: &RpcClient, token: &Address) -> Result<u32> {
    let data = encode_call("decimals()", &[]).map_err(abi_err)?;
    let result = client.eth_call(token.as_str(), &data).await?;
    let owned = AbiReader::from_hex(&result).map_err(abi_err)?;
    Ok(owned.reader().uint(0).map_err(abi_err)? as u32)
}

/// `symbol() -> string`
pub async fn symbol(client: &RpcClient, token: &Address) -> Result<String> {
    let data = encode_call("symbol()", &[]).map_err(abi_err)?;
    let result = client.eth_call(token.as_str(), &data).await?;
    let owned = AbiReader::from_hex(&result).map_err(abi_err)?;
    let reader = owned.reader();
    let offset = reader.uint(0).map_err(abi_err)? as usize;
    reader.string_at(offset).map_err(abi_err)
}

/// `balanceOf(address) -> uint256`
pub async fn balance_of(client: &RpcClient, token: &Address, owner: &Address) -> Result<u128> {
    let data = encode_call(
        "balanceOf(address)",
        &[Token::Address(owner.as_str().to_string())],
    )
    .map_err(abi_err)?;
    let result = client.eth_call(token.as_str(), &data).await?;
    let owned = AbiReader::from_hex(&result).map_err(abi_err)?;
    owned.reader().uint(0).map_err(abi_err)
}

/// `allowance(owner, spender) -> uint256`
pub async fn allowance(
    client: &RpcClient,
    token: &Address,
    owner: &Address,
    spender: &Address,
) -> Result<u128> {
    let data = encode_call(
        "allowance(address,address)",
        &[
            Token::Address(owner.as_str().to_string()),
            Token::Address(spender.as_str().to_string()),
        ],
    )
    .map_err(abi_err)?;
    let result = client.eth_call(token.as_str(), &data).await?;
    let owned = AbiReader::from_hex(&result).map_err(abi_err)?;
    owned.reader().uint(0).map_err(abi_err)
}

fn abi_err(e: crate::abi::AbiError) -> lockyard_core::RpcError {
    lockyard_core::RpcError::ParseError(e.to_string())
}
