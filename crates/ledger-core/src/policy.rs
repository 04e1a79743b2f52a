//! Transaction admission policies consulted by [`Ledger::add_transaction`](crate::Ledger::add_transaction).
//!
//! None of them look at balances: an overdrawing spend is admitted by every
//! built-in policy.

use crate::config::AdmissionMode;
use crate::error::TxRejected;
use crate::signer::Signer;
use crate::{HexDigest, Transaction};
use std::collections::HashMap;

pub trait AdmissionPolicy: Send + Sync {
    fn admit(&self, tx: &Transaction) -> Result<(), TxRejected>;
}

/// Accepts everything, malformed and unsigned transactions included.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl AdmissionPolicy for Permissive {
    fn admit(&self, _tx: &Transaction) -> Result<(), TxRejected> {
        Ok(())
    }
}

/// Requires non-empty parties and a positive amount.
#[derive(Debug, Clone, Copy, Default)]
pub struct WellFormed;

impl AdmissionPolicy for WellFormed {
    fn admit(&self, tx: &Transaction) -> Result<(), TxRejected> {
        tx.check()
    }
}

/// Well-formed and carrying a hex-encoded signature. Addresses are digests, so
/// the signature is only verified for senders registered with [`Signed::register`];
/// for anyone else its presence and encoding are all that is checked.
#[derive(Debug, Clone, Default)]
pub struct Signed {
    identities: HashMap<HexDigest, String>,
}

impl Signed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, signer: &dyn Signer) -> Self {
        self.identities
            .insert(signer.address(), signer.public_identity());
        self
    }
}

impl AdmissionPolicy for Signed {
    fn admit(&self, tx: &Transaction) -> Result<(), TxRejected> {
        tx.check()?;
        let Some(signature) = &tx.signature else {
            return Err(TxRejected::MissingSignature);
        };
        if hex::decode(signature).is_err() {
            return Err(TxRejected::BadSignature);
        }
        match self.identities.get(&tx.from) {
            Some(identity) if !tx.verify_signature(identity) => Err(TxRejected::BadSignature),
            _ => Ok(()),
        }
    }
}

/// Adapts a closure into a policy.
pub struct PolicyFn<F>(pub F);

impl<F> AdmissionPolicy for PolicyFn<F>
where
    F: Fn(&Transaction) -> Result<(), TxRejected> + Send + Sync,
{
    fn admit(&self, tx: &Transaction) -> Result<(), TxRejected> {
        (self.0)(tx)
    }
}

impl AdmissionMode {
    pub fn policy(self) -> Box<dyn AdmissionPolicy> {
        match self {
            AdmissionMode::Permissive => Box::new(Permissive),
            AdmissionMode::WellFormed => Box::new(WellFormed),
            AdmissionMode::Signed => Box::new(Signed::new()),
        }
    }
}
