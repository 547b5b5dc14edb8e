//! Locker Protocol Calculator
//!
//! Pure functions for durations, progress, amount/decimals conversion, and
//! display formatting. No I/O, no async - just deterministic calculations.
//!
//! # Units
//!
//! - Durations: whole seconds (u64)
//! - Token amounts: raw smallest-unit values (u128), converted to and from
//!   decimal strings with the token's on-chain `decimals`
//! - Timestamps: Unix seconds

use chrono::{LocalResult, TimeZone, Utc};

use crate::constants::DurationUnit;
use crate::state::Lock;

/// Convert a user-entered duration to whole seconds.
///
/// Unparseable or non-finite values yield 0; the product is truncated
/// toward zero and negative results clamp to 0. Unknown units fall back to
/// days (see `DurationUnit::parse`). No upper bound is enforced here - the
/// contract rejects durations it does not accept.
pub fn to_seconds(value: &str, unit: &str) -> u64 {
    let num: f64 = match value.trim().parse() {
        Ok(n) => n,
        Err(_) => return 0,
    };
    if !num.is_finite() {
        return 0;
    }

    let secs = num * DurationUnit::parse(unit).factor() as f64;
    if secs <= 0.0 {
        0
    } else {
        secs.trunc() as u64
    }
}

/// Elapsed-time percentage between lock creation and unlock, in [0, 100].
///
/// Zero-duration locks (lock_date == unlock_date) report 0 rather than
/// dividing by zero; a NaN from malformed inputs also reports 0.
pub fn progress_pct(lock: &Lock, now: u64) -> f64 {
    let total = (lock.unlock_date.saturating_sub(lock.lock_date)).max(1) as f64;
    let elapsed = (now as f64 - lock.lock_date as f64) / total * 100.0;
    if elapsed.is_nan() {
        return 0.0;
    }
    elapsed.clamp(0.0, 100.0)
}

/// Render a Unix timestamp as `YYYY-MM-DD HH:MM:SS (UTC)`.
///
/// Zero and out-of-range inputs render as `"N/A"`. Always UTC - never the
/// host timezone.
pub fn format_utc(secs: i64) -> String {
    if secs <= 0 {
        return "N/A".to_string();
    }
    match Utc.timestamp_opt(secs, 0) {
        LocalResult::Single(dt) => format!("{} (UTC)", dt.format("%Y-%m-%d %H:%M:%S")),
        _ => "N/A".to_string(),
    }
}

/// Countdown text for an unmatured lock: `"3d 4h remaining"`,
/// `"2h 10m remaining"`, `"5m remaining"`, or `"Ready to unlock"`.
pub fn time_remaining(unlock_date: u64, now: u64) -> String {
    if now >= unlock_date {
        return "Ready to unlock".to_string();
    }

    let diff = unlock_date - now;
    let days = diff / 86_400;
    let hours = (diff % 86_400) / 3_600;
    let minutes = (diff % 3_600) / 60;

    if days > 0 {
        format!("{}d {}h remaining", days, hours)
    } else if hours > 0 {
        format!("{}h {}m remaining", hours, minutes)
    } else {
        format!("{}m remaining", minutes)
    }
}

/// Compact duration rendering: `"1d 2h 3m"`, `"2h 3m"`, `"3m"`; non-positive
/// durations render as an em dash.
pub fn humanize_seconds(secs: i64) -> String {
    if secs <= 0 {
        return "—".to_string();
    }
    let secs = secs as u64;
    let d = secs / 86_400;
    let h = (secs % 86_400) / 3_600;
    let m = (secs % 3_600) / 60;
    if d > 0 {
        format!("{}d {}h {}m", d, h, m)
    } else if h > 0 {
        format!("{}h {}m", h, m)
    } else {
        format!("{}m", m)
    }
}

/// Parse a user-entered decimal amount into the token's smallest unit.
///
/// Fractional digits beyond `decimals` truncate toward zero. Returns None
/// for anything that is not a plain non-negative decimal number, or when
/// the result overflows u128.
pub fn parse_units(value: &str, decimals: u32) -> Option<u128> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    let (int_part, frac_part) = match value.split_once('.') {
        Some((i, f)) => (i, f),
        None => (value, ""),
    };

    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
        || (int_part.is_empty() && frac_part.is_empty())
    {
        return None;
    }

    let scale = 10u128.checked_pow(decimals)?;

    let int_value: u128 = if int_part.is_empty() {
        0
    } else {
        int_part.parse().ok()?
    };

    let frac_digits: String = frac_part.chars().take(decimals as usize).collect();
    let frac_value: u128 = if frac_digits.is_empty() {
        0
    } else {
        let parsed: u128 = frac_digits.parse().ok()?;
        parsed * 10u128.checked_pow(decimals - frac_digits.len() as u32)?
    };

    int_value.checked_mul(scale)?.checked_add(frac_value)
}

/// Format a raw smallest-unit amount as a decimal string, trimming trailing
/// zeros from the fractional part.
pub fn format_units(value: u128, decimals: u32) -> String {
    let scale = match 10u128.checked_pow(decimals) {
        Some(s) => s,
        None => return value.to_string(),
    };
    let int_part = value / scale;
    let frac_part = value % scale;
    if frac_part == 0 {
        return int_part.to_string();
    }
    let frac = format!("{:0width$}", frac_part, width = decimals as usize);
    let frac = frac.trim_end_matches('0');
    format!("{}.{}", int_part, frac)
}

/// Whether an `approve` step is required before locking `amount`.
///
/// A missing allowance (failed or never-issued read) defaults to "approval
/// needed" - the safe direction.
pub fn approval_needed(allowance: Option<u128>, amount: u128) -> bool {
    match allowance {
        Some(a) => a < amount,
        None => true,
    }
}
