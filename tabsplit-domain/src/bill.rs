use std::fmt;

use fxhash::FxHashSet;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::{
    error::BillError,
    model::{
        BillId, ChatId, Claimant, Currency, Discount, FeePolicy, FeeSuggestion, Item, ItemId,
        MemberId, Money, Participant,
    },
    services::{BillEngine, FeePolicyResolver},
    summary::BillSummary,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BillState {
    Open,
    Finalized,
    Archived,
}

impl BillState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Finalized => "finalized",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for BillState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bill being split in one chat.
///
/// Items, claims and fees can only change while the bill is open.
/// Finalization computes the summary and freezes the bill for good.
#[derive(Clone, Debug, PartialEq)]
pub struct Bill {
    id: BillId,
    chat: ChatId,
    creator: MemberId,
    currency: Currency,
    created_at: OffsetDateTime,
    finalized_at: Option<OffsetDateTime>,
    participants: Vec<Participant>,
    items: Vec<Item>,
    next_item_id: u32,
    fee_policy: Option<FeePolicy>,
    pending_fees: Option<FeeSuggestion>,
    exchange_rate: Option<Decimal>,
    state: BillState,
}

/// Raw fields of a stored bill, validated by [`Bill::restore`].
#[derive(Clone, Debug)]
pub struct BillParts {
    pub id: BillId,
    pub chat: ChatId,
    pub creator: MemberId,
    pub currency: Currency,
    pub created_at: OffsetDateTime,
    pub finalized_at: Option<OffsetDateTime>,
    pub participants: Vec<Participant>,
    pub items: Vec<Item>,
    pub fee_policy: Option<FeePolicy>,
    pub pending_fees: Option<FeeSuggestion>,
    pub exchange_rate: Option<Decimal>,
    pub state: BillState,
}

impl Bill {
    pub fn open(
        id: BillId,
        chat: ChatId,
        creator: MemberId,
        creator_name: impl Into<String>,
        currency: Currency,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            chat,
            creator,
            currency,
            created_at,
            finalized_at: None,
            participants: vec![Participant::member(creator, creator_name)],
            items: Vec::new(),
            next_item_id: 1,
            fee_policy: None,
            pending_fees: None,
            exchange_rate: None,
            state: BillState::Open,
        }
    }

    /// Rebuilds a bill from stored parts, checking every invariant the
    /// mutators would have enforced.
    pub fn restore(parts: BillParts) -> Result<Self, BillError> {
        let mut seen_claimants = FxHashSet::default();
        for participant in &parts.participants {
            if participant.display_name().trim().is_empty() {
                return Err(BillError::EmptyName);
            }
            if !seen_claimants.insert(participant.claimant().clone()) {
                return Err(BillError::AlreadyJoined(participant.display_name().to_string()));
            }
        }
        if !seen_claimants.contains(&Claimant::Member(parts.creator)) {
            return Err(BillError::UnknownParticipant(
                Claimant::Member(parts.creator).to_string(),
            ));
        }

        let mut seen_items = FxHashSet::default();
        for item in &parts.items {
            if !seen_items.insert(item.id()) {
                return Err(BillError::DuplicateItem(item.id()));
            }
            if item.gross().is_negative() {
                return Err(BillError::NonPositivePrice(item.gross()));
            }
            if let Some(unknown) = item
                .claimants()
                .iter()
                .find(|claimant| !seen_claimants.contains(*claimant))
            {
                return Err(BillError::UnknownParticipant(unknown.to_string()));
            }
        }

        if let Some(rate) = parts.exchange_rate {
            validate_exchange_rate(rate)?;
        }

        let next_item_id = parts
            .items
            .iter()
            .map(|item| item.id().0)
            .max()
            .map_or(Some(1), |max| max.checked_add(1))
            .ok_or(BillError::ItemIdsExhausted)?;

        Ok(Self {
            id: parts.id,
            chat: parts.chat,
            creator: parts.creator,
            currency: parts.currency,
            created_at: parts.created_at,
            finalized_at: parts.finalized_at,
            participants: parts.participants,
            items: parts.items,
            next_item_id,
            fee_policy: parts.fee_policy,
            pending_fees: parts.pending_fees,
            exchange_rate: parts.exchange_rate,
            state: parts.state,
        })
    }

    pub fn id(&self) -> BillId {
        self.id
    }

    pub fn chat(&self) -> ChatId {
        self.chat
    }

    pub fn creator(&self) -> MemberId {
        self.creator
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn finalized_at(&self) -> Option<OffsetDateTime> {
        self.finalized_at
    }

    pub fn state(&self) -> BillState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == BillState::Open
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant(&self, claimant: &Claimant) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| participant.claimant() == claimant)
    }

    pub fn is_participant(&self, claimant: &Claimant) -> bool {
        self.participant(claimant).is_some()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// The committed fee policy, if any.
    pub fn fee_policy(&self) -> Option<&FeePolicy> {
        self.fee_policy.as_ref()
    }

    /// The policy the engine applies: the committed one, or no fees.
    pub fn effective_fee_policy(&self) -> FeePolicy {
        self.fee_policy.unwrap_or_default()
    }

    pub fn pending_fees(&self) -> Option<&FeeSuggestion> {
        self.pending_fees.as_ref()
    }

    pub fn exchange_rate(&self) -> Option<Decimal> {
        self.exchange_rate
    }

    pub fn join(&mut self, member: MemberId, display_name: impl Into<String>) -> Result<(), BillError> {
        self.ensure_open()?;
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(BillError::EmptyName);
        }
        if self.is_participant(&Claimant::Member(member)) {
            return Err(BillError::AlreadyJoined(display_name));
        }
        self.participants.push(Participant::member(member, display_name));
        Ok(())
    }

    pub fn add_guest(&mut self, name: impl Into<String>) -> Result<Claimant, BillError> {
        self.ensure_open()?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BillError::EmptyName);
        }
        let guest = Participant::guest(name);
        if self.is_participant(guest.claimant()) {
            return Err(BillError::AlreadyJoined(guest.display_name().to_string()));
        }
        let claimant = guest.claimant().clone();
        self.participants.push(guest);
        Ok(claimant)
    }

    pub fn add_item(
        &mut self,
        name: impl Into<String>,
        gross: Money,
        discount: Option<Discount>,
    ) -> Result<ItemId, BillError> {
        self.ensure_open()?;
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BillError::EmptyName);
        }
        if !gross.is_positive() {
            return Err(BillError::NonPositivePrice(gross));
        }

        let id = ItemId(self.next_item_id);
        self.next_item_id = self
            .next_item_id
            .checked_add(1)
            .ok_or(BillError::ItemIdsExhausted)?;
        self.items.push(Item::new(id, name.trim(), gross, discount));
        Ok(id)
    }

    /// Adds `claimant` to the item and returns how many now share it.
    pub fn claim(&mut self, item: ItemId, claimant: Claimant) -> Result<usize, BillError> {
        self.ensure_open()?;
        self.ensure_participant(&claimant)?;
        let item = self.item_mut(item)?;
        if item.is_claimed_by(&claimant) {
            return Err(BillError::AlreadyClaimed {
                item: item.id(),
                claimant: claimant.to_string(),
            });
        }
        item.claimants_mut().insert(claimant);
        Ok(item.claimants().len())
    }

    /// Removes `claimant` from the item. Returns whether they had claimed it.
    pub fn unclaim(&mut self, item: ItemId, claimant: &Claimant) -> Result<bool, BillError> {
        self.ensure_open()?;
        let item = self.item_mut(item)?;
        Ok(item.claimants_mut().shift_remove(claimant))
    }

    /// Replaces the whole claimant set of an item. An empty set leaves the
    /// item unassigned.
    pub fn reassign<I>(&mut self, item: ItemId, claimants: I) -> Result<(), BillError>
    where
        I: IntoIterator<Item = Claimant>,
    {
        self.ensure_open()?;
        let claimants: Vec<Claimant> = claimants.into_iter().collect();
        for claimant in &claimants {
            self.ensure_participant(claimant)?;
        }
        let item = self.item_mut(item)?;
        let set = item.claimants_mut();
        set.clear();
        set.extend(claimants);
        Ok(())
    }

    pub fn unassign(&mut self, item: ItemId) -> Result<(), BillError> {
        self.reassign(item, std::iter::empty())
    }

    /// Drops every claim `claimant` holds. Returns how many were removed.
    pub fn reset_claims(&mut self, claimant: &Claimant) -> Result<usize, BillError> {
        self.ensure_open()?;
        let mut removed = 0;
        for item in &mut self.items {
            if item.claimants_mut().shift_remove(claimant) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    pub fn set_fee_policy(&mut self, policy: FeePolicy) -> Result<(), BillError> {
        self.ensure_open()?;
        if self.fee_policy.is_some() {
            return Err(BillError::FeePolicyAlreadySet);
        }
        self.fee_policy = Some(policy);
        self.pending_fees = None;
        Ok(())
    }

    /// Resolves and commits fees given as rates and a mode token.
    ///
    /// The token is resolved before anything else, so an unrecognized token
    /// leaves the current policy untouched.
    pub fn set_fees(
        &mut self,
        service_charge_rate: Decimal,
        vat_rate: Decimal,
        mode_token: Option<&str>,
    ) -> Result<FeePolicy, BillError> {
        let policy = FeePolicyResolver::policy(service_charge_rate, vat_rate, mode_token)?;
        self.set_fee_policy(policy)?;
        Ok(policy)
    }

    pub fn reset_fee_policy(&mut self) -> Result<Option<FeePolicy>, BillError> {
        self.ensure_open()?;
        Ok(self.fee_policy.take())
    }

    /// Stores fees detected on a receipt until someone confirms them.
    pub fn suggest_fees(&mut self, suggestion: FeeSuggestion) -> Result<(), BillError> {
        self.ensure_open()?;
        self.pending_fees = (!suggestion.is_empty()).then_some(suggestion);
        Ok(())
    }

    pub fn confirm_suggested_fees(&mut self) -> Result<FeePolicy, BillError> {
        self.ensure_open()?;
        let suggestion = self.pending_fees.as_ref().ok_or(BillError::NoPendingFees)?;
        let policy = FeePolicyResolver::confirm(suggestion)?;
        self.set_fee_policy(policy)?;
        Ok(policy)
    }

    pub fn discard_suggested_fees(&mut self) -> Result<Option<FeeSuggestion>, BillError> {
        self.ensure_open()?;
        Ok(self.pending_fees.take())
    }

    pub fn set_exchange_rate(&mut self, rate: Decimal) -> Result<(), BillError> {
        self.ensure_open()?;
        validate_exchange_rate(rate)?;
        self.exchange_rate = Some(rate);
        Ok(())
    }

    /// Computes the summary and moves the bill to finalized.
    ///
    /// On error the bill stays open and unchanged.
    pub fn finalize(
        &mut self,
        engine: &BillEngine,
        at: OffsetDateTime,
    ) -> Result<BillSummary, BillError> {
        self.ensure_open()?;
        if self.items.is_empty() {
            return Err(BillError::NoItems);
        }
        if self.pending_fees.is_some() {
            return Err(BillError::UnconfirmedFees);
        }

        let summary = engine.compute(self);
        self.state = BillState::Finalized;
        self.finalized_at = Some(at);
        tracing::info!(
            bill_id = self.id.0,
            chat_id = self.chat.0,
            grand_total = %summary.totals.grand_total,
            "Bill finalized"
        );
        Ok(summary)
    }

    pub fn archive(&mut self) -> Result<(), BillError> {
        if self.state != BillState::Finalized {
            return Err(BillError::NotFinalized { state: self.state });
        }
        self.state = BillState::Archived;
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), BillError> {
        if self.state != BillState::Open {
            return Err(BillError::NotOpen { state: self.state });
        }
        Ok(())
    }

    fn ensure_participant(&self, claimant: &Claimant) -> Result<(), BillError> {
        if !self.is_participant(claimant) {
            return Err(BillError::UnknownParticipant(claimant.to_string()));
        }
        Ok(())
    }

    fn item_mut(&mut self, id: ItemId) -> Result<&mut Item, BillError> {
        self.items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(BillError::UnknownItem(id))
    }
}

fn validate_exchange_rate(rate: Decimal) -> Result<(), BillError> {
    if rate <= Decimal::ZERO {
        return Err(BillError::InvalidExchangeRate(rate));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::FeePolicyError, model::FeeMode, summary::BillWarning};
    use rstest::{fixture, rstest};
    use std::str::FromStr;
    use time::macros::datetime;

    const ALICE: MemberId = MemberId(1);
    const BOB: MemberId = MemberId(2);

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).expect("valid decimal")
    }

    fn money(value: &str) -> Money {
        Money::from_decimal(dec(value))
    }

    #[fixture]
    fn bill() -> Bill {
        let mut bill = Bill::open(
            BillId(1),
            ChatId(-100),
            ALICE,
            "@alice",
            Currency::Thb,
            datetime!(2026-10-17 19:30 UTC),
        );
        bill.join(BOB, "@bob").expect("bob joins");
        bill
    }

    #[rstest]
    fn item_ids_are_sequential(mut bill: Bill) {
        let first = bill.add_item("Pad Thai", money("150"), None).expect("add");
        let second = bill.add_item("Som Tam", money("90"), None).expect("add");
        assert_eq!((first, second), (ItemId(1), ItemId(2)));
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-5")]
    fn rejects_non_positive_prices(mut bill: Bill, #[case] price: &str) {
        assert_eq!(
            bill.add_item("Water", money(price), None),
            Err(BillError::NonPositivePrice(money(price)))
        );
    }

    #[rstest]
    fn rejects_empty_item_names(mut bill: Bill) {
        assert_eq!(bill.add_item("  ", money("10"), None), Err(BillError::EmptyName));
    }

    #[rstest]
    fn claims_require_participants(mut bill: Bill) {
        let item = bill.add_item("Beer", money("120"), None).expect("add");
        let err = bill
            .claim(item, Claimant::Member(MemberId(99)))
            .expect_err("not a participant");
        assert!(matches!(err, BillError::UnknownParticipant(_)));
    }

    #[rstest]
    fn duplicate_claims_are_rejected(mut bill: Bill) {
        let item = bill.add_item("Beer", money("120"), None).expect("add");
        assert_eq!(bill.claim(item, Claimant::Member(ALICE)), Ok(1));
        assert_eq!(bill.claim(item, Claimant::Member(BOB)), Ok(2));
        assert!(matches!(
            bill.claim(item, Claimant::Member(ALICE)),
            Err(BillError::AlreadyClaimed { .. })
        ));
    }

    #[rstest]
    fn guests_are_unique_and_case_sensitive(mut bill: Bill) {
        let kenji = bill.add_guest("Kenji").expect("guest");
        assert!(kenji.is_guest());
        assert!(bill.add_guest("kenji").is_ok());
        assert!(matches!(bill.add_guest("Kenji"), Err(BillError::AlreadyJoined(_))));
    }

    #[rstest]
    fn joining_twice_is_rejected(mut bill: Bill) {
        assert!(matches!(bill.join(BOB, "@bob"), Err(BillError::AlreadyJoined(_))));
    }

    #[rstest]
    fn reset_claims_counts_removed(mut bill: Bill) {
        let a = bill.add_item("A", money("10"), None).expect("add");
        let b = bill.add_item("B", money("20"), None).expect("add");
        bill.claim(a, Claimant::Member(BOB)).expect("claim");
        bill.claim(b, Claimant::Member(BOB)).expect("claim");
        bill.claim(b, Claimant::Member(ALICE)).expect("claim");

        assert_eq!(bill.reset_claims(&Claimant::Member(BOB)), Ok(2));
        assert!(bill.item(a).is_some_and(Item::is_unassigned));
        assert_eq!(bill.item(b).map(|item| item.claimants().len()), Some(1));
    }

    #[rstest]
    fn unclaim_reports_whether_claim_existed(mut bill: Bill) {
        let item = bill.add_item("Tea", money("40"), None).expect("add");
        bill.claim(item, Claimant::Member(ALICE)).expect("claim");
        assert_eq!(bill.unclaim(item, &Claimant::Member(ALICE)), Ok(true));
        assert_eq!(bill.unclaim(item, &Claimant::Member(ALICE)), Ok(false));
        assert_eq!(
            bill.unclaim(ItemId(42), &Claimant::Member(ALICE)),
            Err(BillError::UnknownItem(ItemId(42)))
        );
    }

    #[rstest]
    fn reassigning_to_nobody_orphans_the_item(mut bill: Bill) {
        let kenji = bill.add_guest("Kenji").expect("guest");
        let shared = bill.add_item("Sashimi", money("600"), None).expect("add");
        let solo = bill.add_item("Ramen", money("200"), None).expect("add");
        bill.claim(shared, Claimant::Member(ALICE)).expect("claim");
        bill.claim(solo, Claimant::Member(ALICE)).expect("claim");
        bill.reassign(shared, [Claimant::Member(BOB), kenji])
            .expect("reassign");
        bill.unassign(shared).expect("unassign");

        let summary = BillEngine::default().compute(&bill);

        assert_eq!(summary.totals.item_subtotal, money("800"));
        for person in &summary.people {
            assert!(person.shares.iter().all(|line| line.item_id != shared));
        }
        assert_eq!(
            summary.person(&Claimant::Member(ALICE)).map(|p| p.item_subtotal),
            Some(money("200"))
        );
        assert!(summary.warnings.contains(&BillWarning::OrphanedItem {
            item_id: shared,
            name: "Sashimi".to_string(),
            net: money("600"),
        }));
    }

    #[rstest]
    fn invalid_mode_token_leaves_policy_unchanged(mut bill: Bill) {
        let committed = bill
            .set_fees(dec("10"), dec("7"), Some("both_exc"))
            .expect("valid fees");

        let err = bill
            .set_fees(dec("5"), dec("7"), Some("half_inclusive"))
            .expect_err("unknown token");

        assert_eq!(
            err,
            BillError::FeePolicy(FeePolicyError::InvalidMode {
                token: "half_inclusive".to_string()
            })
        );
        assert_eq!(bill.fee_policy(), Some(&committed));
    }

    #[rstest]
    fn fee_policy_is_immutable_until_reset(mut bill: Bill) {
        bill.set_fees(dec("10"), dec("7"), Some("both_inclusive"))
            .expect("valid fees");
        assert_eq!(
            bill.set_fees(dec("10"), dec("7"), Some("both_exclusive")),
            Err(BillError::FeePolicyAlreadySet)
        );

        bill.reset_fee_policy().expect("reset");
        let policy = bill
            .set_fees(dec("10"), dec("7"), Some("both_exclusive"))
            .expect("valid after reset");
        assert_eq!(policy.mode(), FeeMode::BothExclusive);
    }

    #[rstest]
    fn receipt_fees_need_confirmation_before_finalizing(mut bill: Bill) {
        bill.add_item("Noodles", money("100"), None).expect("add");
        bill.suggest_fees(FeeSuggestion {
            service_charge_rate: Some(dec("10")),
            vat_rate: Some(dec("7")),
            mode_hint: Some("both_exclusive".to_string()),
        })
        .expect("suggest");

        assert_eq!(
            bill.finalize(&BillEngine::default(), datetime!(2026-10-17 21:00 UTC)),
            Err(BillError::UnconfirmedFees)
        );
        assert!(bill.is_open());

        let policy = bill.confirm_suggested_fees().expect("confirm");
        assert_eq!(policy.mode(), FeeMode::BothExclusive);
        assert!(bill.pending_fees().is_none());
    }

    #[rstest]
    fn confirm_without_suggestion_fails(mut bill: Bill) {
        assert_eq!(bill.confirm_suggested_fees(), Err(BillError::NoPendingFees));
    }

    #[rstest]
    fn finalize_freezes_the_bill(mut bill: Bill) {
        let item = bill.add_item("Pad Thai", money("150"), None).expect("add");
        bill.claim(item, Claimant::Member(ALICE)).expect("claim");

        let summary = bill
            .finalize(&BillEngine::default(), datetime!(2026-10-17 21:00 UTC))
            .expect("finalize");

        assert_eq!(summary.total_payable(), money("150"));
        assert_eq!(bill.state(), BillState::Finalized);
        assert_eq!(bill.finalized_at(), Some(datetime!(2026-10-17 21:00 UTC)));
        assert_eq!(
            bill.add_item("Dessert", money("80"), None),
            Err(BillError::NotOpen {
                state: BillState::Finalized
            })
        );
        assert!(matches!(
            bill.claim(item, Claimant::Member(BOB)),
            Err(BillError::NotOpen { .. })
        ));
    }

    #[rstest]
    fn empty_bill_cannot_be_finalized(mut bill: Bill) {
        assert_eq!(
            bill.finalize(&BillEngine::default(), datetime!(2026-10-17 21:00 UTC)),
            Err(BillError::NoItems)
        );
        assert!(bill.is_open());
    }

    #[rstest]
    fn archive_requires_finalized(mut bill: Bill) {
        assert_eq!(
            bill.archive(),
            Err(BillError::NotFinalized {
                state: BillState::Open
            })
        );
        bill.add_item("Tea", money("40"), None).expect("add");
        bill.finalize(&BillEngine::default(), datetime!(2026-10-17 21:00 UTC))
            .expect("finalize");
        assert_eq!(bill.archive(), Ok(()));
        assert_eq!(bill.state(), BillState::Archived);
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-0.2")]
    fn rejects_non_positive_exchange_rates(mut bill: Bill, #[case] rate: &str) {
        assert_eq!(
            bill.set_exchange_rate(dec(rate)),
            Err(BillError::InvalidExchangeRate(dec(rate)))
        );
    }

    fn parts(items: Vec<Item>) -> BillParts {
        BillParts {
            id: BillId(9),
            chat: ChatId(1),
            creator: ALICE,
            currency: Currency::Jpy,
            created_at: datetime!(2026-10-01 12:00 UTC),
            finalized_at: None,
            participants: vec![Participant::member(ALICE, "@alice"), Participant::guest("Mai")],
            items,
            fee_policy: None,
            pending_fees: None,
            exchange_rate: None,
            state: BillState::Open,
        }
    }

    #[test]
    fn restore_continues_item_sequence() {
        let mut bill = Bill::restore(parts(vec![
            Item::with_net_price(ItemId(3), "Gyoza", money("450")),
            Item::with_net_price(ItemId(7), "Edamame", money("300"))
                .with_claimants([Claimant::guest("Mai")]),
        ]))
        .expect("valid parts");

        assert_eq!(bill.add_item("Highball", money("500"), None), Ok(ItemId(8)));
    }

    #[test]
    fn restore_rejects_claims_by_strangers() {
        let err = Bill::restore(parts(vec![
            Item::with_net_price(ItemId(1), "Gyoza", money("450"))
                .with_claimants([Claimant::guest("mai")]),
        ]))
        .expect_err("unknown guest");
        assert!(matches!(err, BillError::UnknownParticipant(_)));
    }

    #[test]
    fn restore_rejects_duplicate_item_ids() {
        let err = Bill::restore(parts(vec![
            Item::with_net_price(ItemId(1), "Gyoza", money("450")),
            Item::with_net_price(ItemId(1), "Edamame", money("300")),
        ]))
        .expect_err("duplicate id");
        assert_eq!(err, BillError::DuplicateItem(ItemId(1)));
    }

    #[test]
    fn restore_rejects_bills_without_free_item_ids() {
        let err = Bill::restore(parts(vec![Item::with_net_price(
            ItemId(u32::MAX),
            "Gyoza",
            money("450"),
        )]))
        .expect_err("id space used up");
        assert_eq!(err, BillError::ItemIdsExhausted);
    }

    #[test]
    fn add_item_stops_at_the_last_item_id() {
        let mut bill = Bill::restore(parts(vec![Item::with_net_price(
            ItemId(u32::MAX - 1),
            "Gyoza",
            money("450"),
        )]))
        .expect("valid parts");

        assert_eq!(
            bill.add_item("Highball", money("500"), None),
            Err(BillError::ItemIdsExhausted)
        );
        assert_eq!(bill.items().len(), 1);
    }
}
