use crate::error::BoxError;

/// Source of cryptographically secure random bytes.
///
/// Boundary and Message-ID tokens draw from this. The default
/// implementation is [`SystemRandom`]; tests inject deterministic sources
/// to pin exact output.
pub trait RandomSource {
    /// Fills `buf` entirely, or reports why entropy is unavailable.
    fn fill(&self, buf: &mut [u8]) -> Result<(), BoxError>;
}

/// Operating-system entropy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn fill(&self, buf: &mut [u8]) -> Result<(), BoxError> {
        getrandom::getrandom(buf).map_err(|err| Box::new(err) as BoxError)
    }
}
