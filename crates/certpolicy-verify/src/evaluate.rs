//! Policy evaluation over a built chain
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! 1. Signatures, leaf first. The anchor's own self-signature is not checked.
//! 2. Validity windows, leaf first, with inclusive bounds.
//! 3. The terminal anchor's distrust policies, in declared order.

use crate::chain::Chain;
use crate::error::{ErrorKind, Result};
use crate::validate::ValidationResult;
use chrono::{DateTime, Utc};

/// Evaluates a chain at a reference time
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEvaluator;

impl PolicyEvaluator {
    /// Evaluate `chain` at `time`
    pub fn evaluate(chain: &Chain<'_>, time: DateTime<Utc>) -> ValidationResult {
        ValidationResult::from(Self::check(chain, time))
    }

    fn check(chain: &Chain<'_>, time: DateTime<Utc>) -> Result<()> {
        verify_signatures(chain)?;
        verify_validity(chain, time)?;
        verify_issuer_policies(chain)
    }
}

fn verify_signatures(chain: &Chain<'_>) -> Result<()> {
    for pair in chain.certificates().windows(2) {
        let (child, parent) = (pair[0], pair[1]);
        child.verify_signed_by(parent).map_err(|e| {
            tracing::warn!(
                "Signature on {} does not verify against {}: {}",
                child.subject(),
                parent.subject(),
                e
            );
            ErrorKind::SignatureInvalid
        })?;
    }
    Ok(())
}

fn verify_validity(chain: &Chain<'_>, time: DateTime<Utc>) -> Result<()> {
    for cert in chain.certificates() {
        if time < cert.not_before() {
            tracing::warn!(
                "{} is not valid before {} (reference time {})",
                cert.subject(),
                cert.not_before(),
                time
            );
            return Err(ErrorKind::NotYetValid);
        }
        if time > cert.not_after() {
            tracing::warn!(
                "{} expired at {} (reference time {})",
                cert.subject(),
                cert.not_after(),
                time
            );
            return Err(ErrorKind::Expired);
        }
    }
    Ok(())
}

fn verify_issuer_policies(chain: &Chain<'_>) -> Result<()> {
    let anchor = chain.anchor();
    let leaf = chain.leaf();

    for policy in anchor.policies() {
        if !policy.applies_to(anchor.certificate()) {
            tracing::debug!(
                "Policy {} does not apply to {}",
                policy.name,
                anchor.subject()
            );
            continue;
        }
        if policy.is_violated_by(leaf) {
            tracing::warn!(
                "Policy {} rejects {}: notBefore {} is not before cutoff {}",
                policy.name,
                leaf.subject(),
                leaf.not_before(),
                policy.cutoff
            );
            return Err(policy.error.into());
        }
        tracing::debug!("Policy {} accepts {}", policy.name, leaf.subject());
    }
    Ok(())
}
