//! Lock discovery via the locker contract
//!
//! Pages are assembled newest-first: indices descend from `count - 1`, ten
//! point reads per page issued concurrently. `join_all` preserves submission
//! order, so the page comes back in descending-index order regardless of
//! which read finishes first. A failed read for one index is logged and
//! skipped; it never aborts the page.

use futures::future::join_all;
use lockyard_core::{Address, ProtocolError};
use serde::{Deserialize, Serialize};

use evm_node_client::abi::{encode_call, AbiReader, Token};
use evm_node_client::RpcClient;

use crate::constants::PAGE_SIZE;
use crate::state::Lock;

/// One fetched page plus the continuation cursor.
///
/// `next_index` is None once the oldest record (index 0) has been fetched;
/// otherwise it is the index to start the next "load more" from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockPage {
    pub locks: Vec<Lock>,
    pub next_index: Option<u64>,
}

/// Read the total number of locks ever created.
pub async fn fetch_total_count(client: &RpcClient, locker: &Address) -> Result<u64, ProtocolError> {
    let data = encode_call("getTotalLockCount()", &[]).map_err(parse_err)?;
    let result = client
        .eth_call(locker.as_str(), &data)
        .await
        .map_err(rpc_err)?;
    let owned = AbiReader::from_hex(&result).map_err(parse_err)?;
    Ok(owned.reader().uint(0).map_err(parse_err)? as u64)
}

/// Fetch one page of locks, newest first, starting at `start_index` and
/// descending. Pass `count - 1` for the first page and the previous page's
/// `next_index` for "load more".
pub async fn fetch_lock_page(
    client: &RpcClient,
    locker: &Address,
    start_index: u64,
) -> LockPage {
    let indices = page_indices(start_index, PAGE_SIZE);
    let next_index = next_cursor(&indices);

    let reads = indices
        .iter()
        .map(|&index| fetch_lock_at(client, locker, index));
    let results = join_all(reads).await;

    let mut locks = Vec::with_capacity(indices.len());
    for (index, result) in indices.iter().copied().zip(results) {
        match result {
            Ok(lock) => locks.push(lock),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable lock");
            }
        }
    }

    LockPage { locks, next_index }
}

/// Fetch the lock stored at the given index (`getLockAt`).
pub async fn fetch_lock_at(
    client: &RpcClient,
    locker: &Address,
    index: u64,
) -> Result<Lock, ProtocolError> {
    let data =
        encode_call("getLockAt(uint256)", &[Token::Uint(index as u128)]).map_err(parse_err)?;
    let result = client
        .eth_call(locker.as_str(), &data)
        .await
        .map_err(rpc_err)?;
    decode_lock(&result)
}

/// Fetch a lock by its id (`getLockById`).
pub async fn fetch_lock_by_id(
    client: &RpcClient,
    locker: &Address,
    id: u64,
) -> Result<Lock, ProtocolError> {
    let data = encode_call("getLockById(uint256)", &[Token::Uint(id as u128)]).map_err(parse_err)?;
    let result = client
        .eth_call(locker.as_str(), &data)
        .await
        .map_err(|e| match e {
            lockyard_core::RpcError::Reverted { .. } => ProtocolError::LockNotFound { id },
            other => rpc_err(other),
        })?;
    decode_lock(&result)
}

/// Scan every lock and keep those owned by `owner`. Reads go out in
/// page-sized concurrent batches; individual failures are skipped.
pub async fn fetch_locks_by_owner(
    client: &RpcClient,
    locker: &Address,
    owner: &Address,
    total: u64,
) -> Vec<Lock> {
    let mut owned = Vec::new();

    let mut index = 0u64;
    while index < total {
        let batch_end = (index + PAGE_SIZE as u64).min(total);
        let reads = (index..batch_end).map(|i| fetch_lock_at(client, locker, i));
        for (i, result) in (index..batch_end).zip(join_all(reads).await) {
            match result {
                Ok(lock) if lock.is_owned_by(owner) => owned.push(lock),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(index = i, error = %e, "Skipping unreadable lock");
                }
            }
        }
        index = batch_end;
    }

    owned
}

/// The descending index list for one page starting at `start`.
pub fn page_indices(start: u64, page_size: usize) -> Vec<u64> {
    let len = (page_size as u64).min(start + 1);
    (0..len).map(|offset| start - offset).collect()
}

/// Continuation cursor after fetching `indices`: None once index 0 is
/// covered, otherwise the next index down.
pub fn next_cursor(indices: &[u64]) -> Option<u64> {
    match indices.last() {
        Some(0) | None => None,
        Some(&lowest) => Some(lowest - 1),
    }
}

/// Decode the ABI-encoded Lock struct returned by `getLockAt`/`getLockById`.
///
/// Return layout: one offset word to the tuple, then nine tuple fields
/// (id, token, owner, amount, lockDate, unlockedDate, unlockedAmount,
/// name offset, description offset) with string tails relative to the
/// tuple base.
pub fn decode_lock(return_hex: &str) -> Result<Lock, ProtocolError> {
    let owned = AbiReader::from_hex(return_hex).map_err(parse_err)?;
    let top = owned.reader();

    let tuple_offset = top.uint(0).map_err(parse_err)? as usize;
    let tuple = top.slice_from(tuple_offset).map_err(parse_err)?;

    let name_offset = tuple.uint(7).map_err(parse_err)? as usize;
    let desc_offset = tuple.uint(8).map_err(parse_err)? as usize;

    Ok(Lock {
        id: tuple.uint(0).map_err(parse_err)? as u64,
        token: Address::new(tuple.address(1).map_err(parse_err)?),
        owner: Address::new(tuple.address(2).map_err(parse_err)?),
        amount: tuple.uint(3).map_err(parse_err)?,
        lock_date: tuple.uint(4).map_err(parse_err)? as u64,
        unlock_date: tuple.uint(5).map_err(parse_err)? as u64,
        unlocked_amount: tuple.uint(6).map_err(parse_err)?,
        name: tuple.string_at(name_offset).map_err(parse_err)?,
        description: tuple.string_at(desc_offset).map_err(parse_err)?,
    })
}

fn rpc_err(e: lockyard_core::RpcError) -> ProtocolError {
    ProtocolError::StateUnavailable {
        reason: e.to_string(),
    }
}

fn parse_err(e: evm_node_client::abi::AbiError) -> ProtocolError {
    ProtocolError::StateUnavailable {
        reason: format!("Failed to decode lock data: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evm_node_client::abi::{encode_address, encode_uint, WORD};

    #[test]
    fn test_page_indices_full_page() {
        assert_eq!(
            page_indices(24, 10),
            vec![24, 23, 22, 21, 20, 19, 18, 17, 16, 15]
        );
        assert_eq!(
            page_indices(14, 10),
            vec![14, 13, 12, 11, 10, 9, 8, 7, 6, 5]
        );
    }

    #[test]
    fn test_page_indices_short_final_page() {
        assert_eq!(page_indices(4, 10), vec![4, 3, 2, 1, 0]);
        assert_eq!(page_indices(0, 10), vec![0]);
    }

    #[test]
    fn test_cursor_over_25_locks() {
        // First page covers [24..15] and leaves a cursor; second covers
        // [14..5] with cursor 4; the final page reaches index 0.
        let page1 = page_indices(24, 10);
        assert_eq!(next_cursor(&page1), Some(14));

        let page2 = page_indices(14, 10);
        assert_eq!(next_cursor(&page2), Some(4));

        let page3 = page_indices(4, 10);
        assert_eq!(next_cursor(&page3), None);
    }

    #[test]
    fn test_cursor_empty() {
        assert_eq!(next_cursor(&[]), None);
    }

    /// Build the return payload of getLockAt for a lock with the given
    /// name/description, mirroring solc's struct-return encoding.
    fn encode_lock_return(name: &str, description: &str) -> String {
        let mut tuple: Vec<u8> = Vec::new();
        tuple.extend_from_slice(&encode_uint(3)); // id
        tuple.extend_from_slice(
            &encode_address("0x8D3815197b07A24D8Df7f50E28cD47Fe2165d65F").unwrap(),
        );
        tuple.extend_from_slice(
            &encode_address("0x81861EEbC43795fe2c259c15836Bb5d709966fe6").unwrap(),
        );
        tuple.extend_from_slice(&encode_uint(1_000_000)); // amount
        tuple.extend_from_slice(&encode_uint(1_700_000_000)); // lockDate
        tuple.extend_from_slice(&encode_uint(1_700_086_400)); // unlockDate
        tuple.extend_from_slice(&encode_uint(0)); // unlockedAmount

        let head_len = 9 * WORD;
        let pad = |s: &str| -> Vec<u8> {
            let mut out = encode_uint(s.len() as u128).to_vec();
            out.extend_from_slice(s.as_bytes());
            let rem = s.len() % WORD;
            if rem != 0 {
                out.extend(std::iter::repeat(0u8).take(WORD - rem));
            }
            out
        };
        let name_tail = pad(name);

        tuple.extend_from_slice(&encode_uint(head_len as u128)); // name offset
        tuple.extend_from_slice(&encode_uint((head_len + name_tail.len()) as u128)); // desc offset
        tuple.extend_from_slice(&name_tail);
        tuple.extend_from_slice(&pad(description));

        let mut data = encode_uint(WORD as u128).to_vec(); // offset to tuple
        data.extend_from_slice(&tuple);
        format!("0x{}", hex::encode(data))
    }

    #[test]
    fn test_decode_lock() {
        let payload = encode_lock_return("Team vesting", "cliff until mainnet");
        let lock = decode_lock(&payload).unwrap();

        assert_eq!(lock.id, 3);
        assert_eq!(
            lock.token.as_str(),
            "0x8d3815197b07a24d8df7f50e28cd47fe2165d65f"
        );
        assert_eq!(
            lock.owner.as_str(),
            "0x81861eebc43795fe2c259c15836bb5d709966fe6"
        );
        assert_eq!(lock.amount, 1_000_000);
        assert_eq!(lock.lock_date, 1_700_000_000);
        assert_eq!(lock.unlock_date, 1_700_086_400);
        assert_eq!(lock.unlocked_amount, 0);
        assert_eq!(lock.name, "Team vesting");
        assert_eq!(lock.description, "cliff until mainnet");
    }

    #[test]
    fn test_decode_lock_empty_strings() {
        let payload = encode_lock_return("", "");
        let lock = decode_lock(&payload).unwrap();
        assert_eq!(lock.name, "");
        assert_eq!(lock.description, "");
        assert_eq!(lock.display_name(), "Lock #3");
    }

    #[test]
    fn test_decode_lock_truncated_payload() {
        assert!(decode_lock("0x0000").is_err());
        assert!(decode_lock("0x").is_err());
    }
}
