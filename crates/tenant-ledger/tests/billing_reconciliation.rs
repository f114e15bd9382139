use rust_decimal::Decimal;
use serde_json::json;
use tenant_ledger::workflows::billing::{corrected_balance, reconcile, BalanceSource, BillingSnapshot};

fn snapshot(value: serde_json::Value) -> BillingSnapshot {
    serde_json::from_value(value).expect("billing payload deserializes")
}

#[test]
fn unposted_deposit_is_credited_up_to_one_month() {
    let billing = snapshot(json!({
        "outstandingBalance": 1000,
        "deposit": 500,
        "monthlyRent": 250,
        "utilities": 50,
        "totalMonthlyCost": 300,
        "billingCycles": [
            { "month": "2025-04", "depositApplied": 0, "finalBalance": 700 },
            { "month": "2025-05", "depositApplied": "0.00", "finalBalance": 1000 }
        ]
    }));

    let outcome = reconcile(Some(&billing));

    assert_eq!(outcome.corrected, Decimal::from(700));
    assert_eq!(outcome.deposit_credit, Decimal::from(300));
    assert_eq!(outcome.source, BalanceSource::DepositCredit);
}

#[test]
fn posted_deposit_leaves_balance_untouched() {
    let billing = snapshot(json!({
        "outstandingBalance": "1000",
        "deposit": 500,
        "totalMonthlyCost": 300,
        "billingCycles": [{ "month": "2025-03", "depositApplied": 300 }]
    }));

    assert_eq!(corrected_balance(Some(&billing)), Decimal::from(1000));
}

#[test]
fn ledger_payload_with_string_numbers_and_nulls() {
    let billing = snapshot(json!({
        "outstandingBalance": "640.25",
        "deposit": "200",
        "monthlyRent": "550",
        "utilities": null,
        "totalMonthlyCost": "0",
        "billingCycles": null
    }));

    // Total falls back to rent; the whole deposit fits inside one month.
    let outcome = reconcile(Some(&billing));
    assert_eq!(outcome.deposit_credit, Decimal::from(200));
    assert_eq!(outcome.corrected, Decimal::new(44025, 2));
}

#[test]
fn ledger_corrected_balance_wins_when_in_range() {
    let billing = snapshot(json!({
        "outstandingBalance": 1000,
        "deposit": 500,
        "totalMonthlyCost": 300,
        "correctedOutstandingBalance": 820
    }));

    let outcome = reconcile(Some(&billing));
    assert_eq!(outcome.source, BalanceSource::Upstream);
    assert_eq!(outcome.corrected, Decimal::from(820));
    assert!(!outcome.upstream_clamped());
}

#[test]
fn corrected_balance_never_leaves_bounds() {
    let payloads = [
        json!({ "outstandingBalance": 50, "deposit": 5000, "totalMonthlyCost": 4000 }),
        json!({ "outstandingBalance": -20, "deposit": 100, "totalMonthlyCost": 100 }),
        json!({ "outstandingBalance": 400, "correctedOutstandingBalance": 900 }),
        json!({ "outstandingBalance": 400, "correctedOutstandingBalance": -1 }),
        json!({ "outstandingBalance": "NaN", "deposit": "x" }),
        json!({}),
    ];

    for payload in payloads {
        let billing = snapshot(payload.clone());
        let corrected = corrected_balance(Some(&billing));
        let outstanding = billing.outstanding_balance.max(Decimal::ZERO);
        assert!(
            corrected >= Decimal::ZERO && corrected <= outstanding,
            "corrected {corrected} outside [0, {outstanding}] for {payload}"
        );
    }
}

#[test]
fn missing_snapshot_displays_zero() {
    assert_eq!(corrected_balance(None), Decimal::ZERO);
    assert_eq!(reconcile(None).source, BalanceSource::NoSnapshot);
}
