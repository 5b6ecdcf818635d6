use std::str::FromStr;

use rstest::{fixture, rstest};
use rust_decimal::Decimal;
use tabsplit_application::{
    BillCommandError, BillService, Clock, ReceiptError, ReceiptExtractor, ReceiptImage,
    ReceiptSuggestion, SuggestedItem,
};
use tabsplit_domain::{
    BillError, ChatId, Claimant, Currency, FeeMode, FeePolicyError, FeeSuggestion, ItemId,
    MemberId, Money,
};
use tabsplit_infrastructure::{FixedExchangeRate, InMemoryBillRepository};
use time::{OffsetDateTime, macros::datetime};

struct FixedClock(OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

struct CannedReceipt(ReceiptSuggestion);

impl ReceiptExtractor for CannedReceipt {
    fn extract(&self, image: &ReceiptImage<'_>) -> Result<ReceiptSuggestion, ReceiptError> {
        image.mime_type().ok_or(ReceiptError::UnsupportedImage)?;
        Ok(self.0.clone())
    }
}

static CLOCK: FixedClock = FixedClock(datetime!(2026-10-17 20:00 UTC));
const CHAT: ChatId = ChatId(-500);
const HOST: MemberId = MemberId(1);
const GUEST_MEMBER: MemberId = MemberId(2);
const STRANGER: MemberId = MemberId(3);
const PNG: &[u8] = b"\x89PNG\r\n\x1a\n....";

fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal")
}

fn money(value: &str) -> Money {
    Money::from_decimal(dec(value))
}

fn receipt() -> CannedReceipt {
    CannedReceipt(ReceiptSuggestion {
        items: vec![
            SuggestedItem {
                name: "Green curry".to_string(),
                gross: money("220"),
                discount: None,
            },
            SuggestedItem {
                name: "Subtotal".to_string(),
                gross: money("0"),
                discount: None,
            },
            SuggestedItem {
                name: "Sticky rice".to_string(),
                gross: money("40"),
                discount: None,
            },
        ],
        fees: FeeSuggestion {
            service_charge_rate: Some(dec("10")),
            vat_rate: Some(dec("7")),
            mode_hint: Some("both_exclusive".to_string()),
        },
    })
}

#[fixture]
fn repo() -> InMemoryBillRepository {
    InMemoryBillRepository::new()
}

fn open_bill(service: &BillService<'_>) {
    service
        .new_bill(CHAT, HOST, "@host", Currency::Thb)
        .expect("bill opens");
    service
        .join(CHAT, GUEST_MEMBER, "@friend")
        .expect("friend joins");
}

#[rstest]
fn only_one_open_bill_per_chat(repo: InMemoryBillRepository) {
    let service = BillService::new(&repo, &CLOCK);
    open_bill(&service);

    assert_eq!(
        service.new_bill(CHAT, GUEST_MEMBER, "@friend", Currency::Jpy),
        Err(BillCommandError::BillAlreadyOpen)
    );
    assert!(service.new_bill(ChatId(1), GUEST_MEMBER, "@friend", Currency::Jpy).is_ok());
}

#[rstest]
fn commands_need_an_open_bill(repo: InMemoryBillRepository) {
    let service = BillService::new(&repo, &CLOCK);
    assert_eq!(
        service.claim(CHAT, HOST, ItemId(1)),
        Err(BillCommandError::NoActiveBill)
    );
}

#[rstest]
fn full_flow_splits_shared_items(repo: InMemoryBillRepository) {
    let service = BillService::new(&repo, &CLOCK);
    open_bill(&service);

    let noodles = service
        .add_item(CHAT, HOST, "Pad See Ew", money("180"), None)
        .expect("item");
    let platter = service
        .add_item(CHAT, GUEST_MEMBER, "Seafood platter", money("600"), None)
        .expect("item");
    service.claim(CHAT, HOST, noodles).expect("claim");
    service.claim(CHAT, HOST, platter).expect("claim");
    assert_eq!(service.claim(CHAT, GUEST_MEMBER, platter), Ok(2));
    service
        .set_fees(CHAT, HOST, dec("10"), dec("7"), Some("both_exc"))
        .expect("fees");

    let summary = service.finalize(CHAT, HOST).expect("finalize");

    let host = summary.person(&Claimant::Member(HOST)).expect("host summary");
    assert_eq!(host.item_subtotal, money("480"));
    assert_eq!(host.payable, money("564.96"));
    let friend = summary
        .person(&Claimant::Member(GUEST_MEMBER))
        .expect("friend summary");
    assert_eq!(friend.payable, money("353.10"));
    assert_eq!(summary.totals.grand_total, money("918.06"));
    assert!(!summary.has_warnings());

    assert_eq!(
        service.active_bill(CHAT),
        Err(BillCommandError::NoActiveBill)
    );
    let history = service.history(CHAT, 5).expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].grand_total, money("918.06"));
    assert_eq!(history[0].item_count, 2);
    assert_eq!(history[0].participant_count, 2);
    assert_eq!(history[0].finalized_at, Some(CLOCK.0));
}

#[rstest]
fn strangers_cannot_claim(repo: InMemoryBillRepository) {
    let service = BillService::new(&repo, &CLOCK);
    open_bill(&service);
    let item = service
        .add_item(CHAT, HOST, "Som Tam", money("90"), None)
        .expect("item");

    assert_eq!(
        service.claim(CHAT, STRANGER, item),
        Err(BillCommandError::NotJoined(STRANGER))
    );
}

#[rstest]
fn only_the_creator_assigns_and_cancels(repo: InMemoryBillRepository) {
    let service = BillService::new(&repo, &CLOCK);
    open_bill(&service);
    let guest = service.add_guest(CHAT, GUEST_MEMBER, "Noi").expect("guest");
    let item = service
        .add_item(CHAT, HOST, "Larb", money("120"), None)
        .expect("item");

    assert_eq!(
        service.assign(CHAT, GUEST_MEMBER, item, guest.clone()),
        Err(BillCommandError::NotCreator)
    );
    assert_eq!(service.assign(CHAT, HOST, item, guest), Ok(1));
    assert_eq!(
        service.assign(CHAT, HOST, item, Claimant::Member(STRANGER)),
        Err(BillCommandError::NotJoined(STRANGER))
    );

    assert_eq!(
        service.cancel(CHAT, GUEST_MEMBER),
        Err(BillCommandError::NotCreator)
    );
    service.cancel(CHAT, HOST).expect("cancel");
    assert_eq!(
        service.active_bill(CHAT),
        Err(BillCommandError::NoActiveBill)
    );
}

#[rstest]
fn invalid_fee_token_keeps_previous_policy(repo: InMemoryBillRepository) {
    let service = BillService::new(&repo, &CLOCK);
    open_bill(&service);
    service
        .set_fees(CHAT, HOST, dec("10"), dec("7"), Some("inc"))
        .expect("fees");
    service.reset_fees(CHAT, HOST).expect("reset");
    service
        .set_fees(CHAT, HOST, dec("10"), dec("7"), Some("sc_exc"))
        .expect("fees");

    let err = service
        .set_fees(CHAT, HOST, dec("5"), dec("7"), Some("bogus"))
        .expect_err("invalid token");

    assert_eq!(
        err,
        BillCommandError::Bill(BillError::FeePolicy(FeePolicyError::InvalidMode {
            token: "bogus".to_string()
        }))
    );
    let bill = service.active_bill(CHAT).expect("bill");
    assert_eq!(
        bill.fee_policy().map(|policy| policy.mode()),
        Some(FeeMode::ScExclusiveVatInclusive)
    );
}

#[rstest]
fn receipt_items_are_vetted_and_fees_wait_for_confirmation(repo: InMemoryBillRepository) {
    let extractor = receipt();
    let service = BillService::new(&repo, &CLOCK).with_receipt_extractor(&extractor);
    open_bill(&service);

    let import = service
        .import_receipt(CHAT, HOST, &ReceiptImage::new(PNG))
        .expect("import");

    assert_eq!(import.added, vec![ItemId(1), ItemId(2)]);
    assert_eq!(import.rejected, 1);
    assert!(import.pending_fees.is_some());

    assert_eq!(
        service.finalize(CHAT, HOST),
        Err(BillCommandError::Bill(BillError::UnconfirmedFees))
    );
    assert!(service.active_bill(CHAT).is_ok());

    let policy = service.confirm_fees(CHAT, GUEST_MEMBER).expect("confirm");
    assert_eq!(policy.mode(), FeeMode::BothExclusive);
    assert!(service.finalize(CHAT, HOST).is_ok());
}

#[rstest]
fn rejected_receipt_fees_leave_the_policy_unset(repo: InMemoryBillRepository) {
    let extractor = receipt();
    let service = BillService::new(&repo, &CLOCK).with_receipt_extractor(&extractor);
    open_bill(&service);
    service
        .import_receipt(CHAT, HOST, &ReceiptImage::new(PNG))
        .expect("import");

    service.reject_fees(CHAT, GUEST_MEMBER).expect("reject");

    let bill = service.active_bill(CHAT).expect("bill");
    assert!(bill.pending_fees().is_none());
    assert!(bill.fee_policy().is_none());
    assert_eq!(
        service.reject_fees(CHAT, HOST),
        Err(BillCommandError::Bill(BillError::NoPendingFees))
    );
    assert!(service.finalize(CHAT, HOST).is_ok());
}

#[rstest]
fn unsupported_receipt_images_are_rejected(repo: InMemoryBillRepository) {
    let extractor = receipt();
    let service = BillService::new(&repo, &CLOCK).with_receipt_extractor(&extractor);
    open_bill(&service);

    assert_eq!(
        service.import_receipt(CHAT, HOST, &ReceiptImage::new(b"GIF89a")),
        Err(BillCommandError::Receipt(ReceiptError::UnsupportedImage))
    );
}

#[rstest]
fn receipts_need_an_extractor(repo: InMemoryBillRepository) {
    let service = BillService::new(&repo, &CLOCK);
    open_bill(&service);
    assert_eq!(
        service.import_receipt(CHAT, HOST, &ReceiptImage::new(PNG)),
        Err(BillCommandError::ReceiptsUnavailable)
    );
}

#[rstest]
fn jpy_bills_carry_converted_totals(repo: InMemoryBillRepository) {
    let rates = FixedExchangeRate::new(dec("0.24"));
    let service = BillService::new(&repo, &CLOCK).with_exchange_rates(&rates);
    service
        .new_bill(CHAT, HOST, "@host", Currency::Jpy)
        .expect("bill opens");
    let item = service
        .add_item(CHAT, HOST, "Okonomiyaki", money("1500"), None)
        .expect("item");
    service.claim(CHAT, HOST, item).expect("claim");

    assert_eq!(service.refresh_exchange_rate(CHAT), Ok(dec("0.24")));
    let summary = service.preview(CHAT).expect("preview");

    assert_eq!(summary.totals.converted_grand_total, Some(money("360")));
    assert_eq!(
        summary
            .person(&Claimant::Member(HOST))
            .and_then(|person| person.converted_payable),
        Some(money("360"))
    );
}

#[rstest]
fn thb_bills_reject_exchange_rates(repo: InMemoryBillRepository) {
    let rates = FixedExchangeRate::new(dec("0.24"));
    let service = BillService::new(&repo, &CLOCK).with_exchange_rates(&rates);
    open_bill(&service);
    assert_eq!(
        service.refresh_exchange_rate(CHAT),
        Err(BillCommandError::ExchangeRateNotApplicable(Currency::Thb))
    );
}

#[rstest]
fn reset_claims_reports_removed_count(repo: InMemoryBillRepository) {
    let service = BillService::new(&repo, &CLOCK);
    open_bill(&service);
    for name in ["Satay", "Spring rolls"] {
        let item = service
            .add_item(CHAT, HOST, name, money("100"), None)
            .expect("item");
        service.claim(CHAT, GUEST_MEMBER, item).expect("claim");
    }

    assert_eq!(service.reset_claims(CHAT, GUEST_MEMBER), Ok(2));
    let summary = service.preview(CHAT).expect("preview");
    assert_eq!(summary.unassigned.len(), 2);
}
