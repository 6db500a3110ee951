//! Identifier helpers for persisted validation reports.

use bech32::Bech32m;
use uuid7::uuid7;

// construct a unique report id then encode using bech32
pub fn new_report_id() -> anyhow::Result<String> {
    let hrp = bech32::Hrp::parse("report")?;
    let encode = bech32::encode::<Bech32m>(hrp, uuid7().as_bytes())?;
    Ok(encode)
}
