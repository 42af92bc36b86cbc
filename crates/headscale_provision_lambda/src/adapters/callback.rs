use headscale_provision_core::error::ReconcileError;

pub trait CallbackTransport {
    fn put(&self, url: &str, body: &[u8]) -> Result<(), ReconcileError>;
}
