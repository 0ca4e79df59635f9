/// Anything a playlist or campaign can aim at: every kiosk in the tenant,
/// or an explicit membership set.
pub trait Targeted {
    fn targets_all_kiosks(&self) -> bool;
    fn kiosk_ids(&self) -> &[i32];
}

/// The all-kiosks flag wins unconditionally; the membership set is not even
/// consulted. With the flag off, an empty set applies to nobody - it is not
/// an error and it does not fall back to "all".
pub fn applies<T: Targeted>(candidate: &T, kiosk_id: i32) -> bool {
    candidate.targets_all_kiosks() || candidate.kiosk_ids().contains(&kiosk_id)
}
