use rust_decimal::Decimal;
use tabsplit_domain::{
    Bill, BillEngine, BillError, BillSummary, ChatId, Claimant, Currency, Discount, FeePolicy,
    ItemId, MemberId, Money,
};

use crate::{
    error::BillCommandError,
    model::{BillHistoryEntry, ReceiptImport},
    ports::{BillRepository, Clock, ExchangeRateProvider, ReceiptExtractor},
    receipt::ReceiptImage,
};

/// Chat-level bill commands. Every command loads the chat's open bill,
/// applies one change and saves it back; a failed command saves nothing.
#[derive(Clone, Copy)]
pub struct BillService<'a> {
    repository: &'a dyn BillRepository,
    clock: &'a dyn Clock,
    receipts: Option<&'a dyn ReceiptExtractor>,
    rates: Option<&'a dyn ExchangeRateProvider>,
    engine: BillEngine,
}

impl<'a> BillService<'a> {
    pub fn new(repository: &'a dyn BillRepository, clock: &'a dyn Clock) -> Self {
        Self {
            repository,
            clock,
            receipts: None,
            rates: None,
            engine: BillEngine::default(),
        }
    }

    pub fn with_receipt_extractor(self, receipts: &'a dyn ReceiptExtractor) -> Self {
        Self {
            receipts: Some(receipts),
            ..self
        }
    }

    pub fn with_exchange_rates(self, rates: &'a dyn ExchangeRateProvider) -> Self {
        Self {
            rates: Some(rates),
            ..self
        }
    }

    pub fn with_engine(self, engine: BillEngine) -> Self {
        Self { engine, ..self }
    }

    pub fn active_bill(&self, chat: ChatId) -> Result<Bill, BillCommandError> {
        self.repository
            .find_active(chat)?
            .ok_or(BillCommandError::NoActiveBill)
    }

    /// Summary of the open bill as it would be finalized now.
    pub fn preview(&self, chat: ChatId) -> Result<BillSummary, BillCommandError> {
        let bill = self.active_bill(chat)?;
        Ok(self.engine.compute(&bill))
    }

    pub fn new_bill(
        &self,
        chat: ChatId,
        creator: MemberId,
        creator_name: &str,
        currency: Currency,
    ) -> Result<Bill, BillCommandError> {
        if self.repository.find_active(chat)?.is_some() {
            return Err(BillCommandError::BillAlreadyOpen);
        }

        let id = self.repository.next_id()?;
        let mut bill = Bill::open(id, chat, creator, creator_name, currency, self.clock.now());
        if let Some(rates) = self.rates.filter(|_| currency == Currency::Jpy) {
            match rates.rate(Currency::Jpy, Currency::Thb) {
                Ok(rate) => bill.set_exchange_rate(rate)?,
                Err(err) => {
                    tracing::warn!(chat_id = chat.0, error = %err, "Exchange rate unavailable for new bill");
                }
            }
        }

        self.repository.save(&bill)?;
        tracing::info!(chat_id = chat.0, bill_id = id.0, currency = %currency, "Bill opened");
        Ok(bill)
    }

    pub fn join(&self, chat: ChatId, member: MemberId, name: &str) -> Result<(), BillCommandError> {
        self.update(chat, |bill| Ok(bill.join(member, name)?))
    }

    pub fn add_guest(
        &self,
        chat: ChatId,
        actor: MemberId,
        name: &str,
    ) -> Result<Claimant, BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, actor)?;
            Ok(bill.add_guest(name)?)
        })
    }

    pub fn add_item(
        &self,
        chat: ChatId,
        actor: MemberId,
        name: &str,
        gross: Money,
        discount: Option<Discount>,
    ) -> Result<ItemId, BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, actor)?;
            Ok(bill.add_item(name, gross, discount)?)
        })
    }

    /// Returns how many people now share the item.
    pub fn claim(&self, chat: ChatId, member: MemberId, item: ItemId) -> Result<usize, BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, member)?;
            Ok(bill.claim(item, Claimant::Member(member))?)
        })
    }

    pub fn unclaim(&self, chat: ChatId, member: MemberId, item: ItemId) -> Result<bool, BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, member)?;
            Ok(bill.unclaim(item, &Claimant::Member(member))?)
        })
    }

    /// Creator-only: adds a claim on behalf of a member or guest.
    pub fn assign(
        &self,
        chat: ChatId,
        actor: MemberId,
        item: ItemId,
        target: Claimant,
    ) -> Result<usize, BillCommandError> {
        self.update(chat, |bill| {
            ensure_creator(bill, actor)?;
            if let Claimant::Member(member) = &target {
                ensure_joined(bill, *member)?;
            }
            Ok(bill.claim(item, target)?)
        })
    }

    pub fn reset_claims(&self, chat: ChatId, member: MemberId) -> Result<usize, BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, member)?;
            Ok(bill.reset_claims(&Claimant::Member(member))?)
        })
    }

    pub fn set_fees(
        &self,
        chat: ChatId,
        actor: MemberId,
        service_charge_rate: Decimal,
        vat_rate: Decimal,
        mode_token: Option<&str>,
    ) -> Result<FeePolicy, BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, actor)?;
            let policy = bill.set_fees(service_charge_rate, vat_rate, mode_token)?;
            tracing::info!(
                chat_id = chat.0,
                mode = %policy.mode(),
                service_charge_rate = %policy.service_charge_rate(),
                vat_rate = %policy.vat_rate(),
                "Fee policy set"
            );
            Ok(policy)
        })
    }

    pub fn reset_fees(&self, chat: ChatId, actor: MemberId) -> Result<Option<FeePolicy>, BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, actor)?;
            Ok(bill.reset_fee_policy()?)
        })
    }

    /// Adds the receipt's usable lines as items and parks detected fees until
    /// someone confirms them.
    pub fn import_receipt(
        &self,
        chat: ChatId,
        actor: MemberId,
        image: &ReceiptImage<'_>,
    ) -> Result<ReceiptImport, BillCommandError> {
        let receipts = self.receipts.ok_or(BillCommandError::ReceiptsUnavailable)?;
        let mut bill = self.active_bill(chat)?;
        ensure_joined(&bill, actor)?;

        let vetted = receipts.extract(image)?.vet();
        if vetted.items.is_empty() && vetted.fees.is_empty() {
            return Err(BillCommandError::EmptyReceipt);
        }

        let added = vetted
            .items
            .into_iter()
            .map(|item| bill.add_item(item.name, item.gross, item.discount))
            .collect::<Result<Vec<_>, _>>()?;
        let pending_fees = (!vetted.fees.is_empty()).then_some(vetted.fees);
        if let Some(fees) = &pending_fees {
            bill.suggest_fees(fees.clone())?;
        }

        self.repository.save(&bill)?;
        tracing::info!(
            chat_id = chat.0,
            added = added.len(),
            rejected = vetted.rejected,
            has_pending_fees = pending_fees.is_some(),
            "Receipt imported"
        );
        Ok(ReceiptImport {
            added,
            rejected: vetted.rejected,
            pending_fees,
        })
    }

    pub fn confirm_fees(&self, chat: ChatId, actor: MemberId) -> Result<FeePolicy, BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, actor)?;
            Ok(bill.confirm_suggested_fees()?)
        })
    }

    /// Drops the fee suggestion read from a receipt without committing it.
    pub fn reject_fees(&self, chat: ChatId, actor: MemberId) -> Result<(), BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, actor)?;
            bill.discard_suggested_fees()?
                .map(|_| ())
                .ok_or(BillCommandError::Bill(BillError::NoPendingFees))
        })
    }

    /// Fetches the current JPY to THB rate for the open bill.
    pub fn refresh_exchange_rate(&self, chat: ChatId) -> Result<Decimal, BillCommandError> {
        let rates = self.rates.ok_or(BillCommandError::ExchangeRatesUnavailable)?;
        self.update(chat, |bill| {
            if bill.currency() != Currency::Jpy {
                return Err(BillCommandError::ExchangeRateNotApplicable(bill.currency()));
            }
            let rate = rates.rate(Currency::Jpy, Currency::Thb)?;
            bill.set_exchange_rate(rate)?;
            Ok(rate)
        })
    }

    /// Finalizes the open bill. On any error the bill stays open.
    pub fn finalize(&self, chat: ChatId, actor: MemberId) -> Result<BillSummary, BillCommandError> {
        self.update(chat, |bill| {
            ensure_joined(bill, actor)?;
            Ok(bill.finalize(&self.engine, self.clock.now())?)
        })
    }

    /// Creator-only: discards the open bill.
    pub fn cancel(&self, chat: ChatId, actor: MemberId) -> Result<(), BillCommandError> {
        let bill = self.active_bill(chat)?;
        ensure_creator(&bill, actor)?;
        self.repository.delete(chat, bill.id())?;
        tracing::info!(chat_id = chat.0, bill_id = bill.id().0, "Bill cancelled");
        Ok(())
    }

    pub fn history(&self, chat: ChatId, limit: usize) -> Result<Vec<BillHistoryEntry>, BillCommandError> {
        let bills = self.repository.recent_finalized(chat, limit)?;
        Ok(bills
            .iter()
            .map(|bill| BillHistoryEntry {
                bill_id: bill.id(),
                finalized_at: bill.finalized_at(),
                currency: bill.currency(),
                grand_total: self.engine.compute(bill).totals.grand_total,
                item_count: bill.items().len(),
                participant_count: bill.participants().len(),
            })
            .collect())
    }

    fn update<T, F>(&self, chat: ChatId, apply: F) -> Result<T, BillCommandError>
    where
        F: FnOnce(&mut Bill) -> Result<T, BillCommandError>,
    {
        let mut bill = self.active_bill(chat)?;
        let value = apply(&mut bill)?;
        self.repository.save(&bill)?;
        Ok(value)
    }
}

fn ensure_joined(bill: &Bill, member: MemberId) -> Result<(), BillCommandError> {
    if !bill.is_participant(&Claimant::Member(member)) {
        return Err(BillCommandError::NotJoined(member));
    }
    Ok(())
}

fn ensure_creator(bill: &Bill, actor: MemberId) -> Result<(), BillCommandError> {
    if bill.creator() != actor {
        return Err(BillCommandError::NotCreator);
    }
    Ok(())
}
