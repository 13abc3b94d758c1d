//! Run-sense collaborator contract.

/// Polled per-asset run/stop sense (dry contacts, stack lights, CT
/// clamps — whatever the board wires up).
pub trait RunSense {
    type Error;

    /// Number of wired sense channels.
    fn asset_count(&self) -> usize;

    /// Samples one channel.
    fn is_running(&mut self, asset: usize) -> Result<bool, Self::Error>;
}
