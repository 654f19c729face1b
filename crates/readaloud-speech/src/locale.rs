//! Locale negotiation between caller preferences, the engine and the platform.

use std::collections::BTreeSet;

use readaloud_core::Locale;

/// Pick the first candidate that the engine supports and the platform has.
///
/// `platform` of `None` means every locale is available on the platform.
pub fn negotiate_locale(
    engine_supported: &BTreeSet<Locale>,
    platform: Option<&BTreeSet<Locale>>,
    candidates: &[Locale],
) -> Option<Locale> {
    candidates
        .iter()
        .find(|candidate| {
            engine_supported.contains(*candidate)
                && platform.is_none_or(|available| available.contains(*candidate))
        })
        .cloned()
}
