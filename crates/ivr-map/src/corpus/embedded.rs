//! Global alias table compiled into the binary.

use super::{AliasCorpus, AliasScope, loader};
use crate::error::Result;

const GLOBAL_CSV: &str = include_str!("../../data/aliases/global.csv");

pub(super) fn builtin() -> Result<AliasCorpus> {
    let entries = loader::parse_entries(GLOBAL_CSV, "builtin/global.csv", &AliasScope::Global)?;
    AliasCorpus::from_entries(entries)
}
