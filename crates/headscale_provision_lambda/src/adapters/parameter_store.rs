use headscale_provision_core::error::ReconcileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

pub trait ParameterStore {
    /// Upserts `value` at `name`, overwriting any existing value.
    fn put_parameter(&self, name: &str, value: &str) -> Result<(), ReconcileError>;

    fn delete_parameter(&self, name: &str) -> Result<DeleteOutcome, ReconcileError>;
}
