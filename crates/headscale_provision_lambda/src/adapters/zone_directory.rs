use headscale_provision_core::error::ReconcileError;

pub trait ZoneDirectory {
    /// Fully-qualified zone name, or `None` when the zone id does not resolve.
    fn hosted_zone_name(&self, zone_id: &str) -> Result<Option<String>, ReconcileError>;
}
