use headscale_provision_core::error::ReconcileError;

use crate::adapters::zone_directory::ZoneDirectory;
use crate::lookup::find_zone_domain;

/// Canonical domain for `zone_id`, without the trailing root dot.
pub fn resolve_domain(zones: &dyn ZoneDirectory, zone_id: &str) -> Result<String, ReconcileError> {
    let zone_name = find_zone_domain(zones, zone_id)?;
    Ok(normalize_zone_name(&zone_name).to_string())
}

/// Strips exactly one trailing dot.
pub fn normalize_zone_name(zone_name: &str) -> &str {
    zone_name.strip_suffix('.').unwrap_or(zone_name)
}
