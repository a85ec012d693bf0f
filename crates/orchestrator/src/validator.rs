use batch_distributor_types::{SendingTokenInvoice, ValidationError, UNREGISTERED_TOKEN_ID};
use cosmwasm_std::Uint128;
use futures::future::try_join_all;
use tracing::debug;

use crate::client::DistributorClient;
use crate::error::OrchestratorError;
use crate::keys::KeyProvider;
use crate::ledger::LedgerError;

/// Pre-flight checks for token invoices.
///
/// Every check is a read against current ledger state; a clean result only
/// says each invoice was executable at the time of the read.
#[derive(Clone)]
pub struct InvoiceValidator {
    client: DistributorClient,
}

impl InvoiceValidator {
    pub fn new(client: DistributorClient) -> Self {
        Self { client }
    }

    /// Whether `token` is registered with the distributor
    pub async fn check_token_exist_in_contract(&self, token: &str) -> Result<bool, LedgerError> {
        Ok(self.client.token_id(token).await? != UNREGISTERED_TOKEN_ID)
    }

    /// Whether `wallet` holds strictly more than `amount` of `token`
    pub async fn check_wallet_token_balance(
        &self,
        wallet: &str,
        token: &str,
        amount: Uint128,
    ) -> Result<bool, LedgerError> {
        Ok(covers(self.client.token_balance(token, wallet).await?, amount))
    }

    /// Whether `wallet` lets the distributor move strictly more than `amount`
    pub async fn check_wallet_allowance(
        &self,
        wallet: &str,
        token: &str,
        amount: Uint128,
    ) -> Result<bool, LedgerError> {
        Ok(covers(self.client.token_allowance(token, wallet).await?, amount))
    }

    /// Validate every invoice, returning all failed checks in invoice order.
    ///
    /// Invoices are checked concurrently. A token that is not registered
    /// yields `TOKEN_NOT_IN_CONTRACT` and no further checks for that invoice;
    /// otherwise the balance and allowance checks both run.
    pub async fn validate(
        &self,
        keys: &dyn KeyProvider,
        invoices: &[SendingTokenInvoice],
    ) -> Result<Vec<ValidationError>, OrchestratorError> {
        let checks = invoices
            .iter()
            .enumerate()
            .map(|(index, invoice)| self.check_invoice(keys, index, invoice));

        let errors = try_join_all(checks)
            .await?
            .into_iter()
            .fold(Vec::new(), |mut acc, invoice_errors| {
                acc.extend(invoice_errors);
                acc
            });

        debug!(
            invoices = invoices.len(),
            errors = errors.len(),
            "invoice validation finished"
        );
        Ok(errors)
    }

    async fn check_invoice(
        &self,
        keys: &dyn KeyProvider,
        index: usize,
        invoice: &SendingTokenInvoice,
    ) -> Result<Vec<ValidationError>, OrchestratorError> {
        let token = invoice.token_address.as_str();

        if !self.check_token_exist_in_contract(token).await? {
            return Ok(vec![ValidationError::token_not_in_contract(index, token)]);
        }

        let wallet = keys.address(&invoice.wallet).await?;

        let (balance, allowance) = futures::try_join!(
            self.client.token_balance(token, &wallet),
            self.client.token_allowance(token, &wallet),
        )?;

        let mut errors = Vec::new();
        if !covers(balance, invoice.amount) {
            errors.push(ValidationError::insufficient_balance(
                index,
                &wallet,
                token,
                balance,
                invoice.amount,
            ));
        }
        if !covers(allowance, invoice.amount) {
            errors.push(ValidationError::insufficient_allowance(
                index,
                &wallet,
                token,
                allowance,
                invoice.amount,
            ));
        }
        Ok(errors)
    }
}

/// Whether `held` is enough for `amount`; equality is not enough
fn covers(held: Uint128, amount: Uint128) -> bool {
    held > amount
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_is_strict() {
        assert!(covers(Uint128::new(101), Uint128::new(100)));
        assert!(!covers(Uint128::new(100), Uint128::new(100)));
        assert!(!covers(Uint128::zero(), Uint128::zero()));
    }
}
