use fixedasset_macrs::{
    collaborators::UnavailableAiClassifier,
    entities::{
        AssetClass, BatchSession, Convention, DepreciationMethod, Election, IssueKind, Severity,
        StrategyMode, TaxYearConfig, TransactionType, ValidationReport,
    },
    errors::EngineError,
    logic::{config_for_year, DisposalResolver},
    util::FixedAssetTaxUtil,
};

fn engine() -> FixedAssetTaxUtil<UnavailableAiClassifier> {
    FixedAssetTaxUtil::new(UnavailableAiClassifier).unwrap()
}

fn config() -> TaxYearConfig {
    config_for_year(2024, 1, false, StrategyMode::Aggressive).unwrap()
}

async fn process(csv: &str) -> (BatchSession, ValidationReport) {
    let (session, report, _) = engine().from_string(csv, config()).await.unwrap();
    (session, report)
}

#[tokio::test]
async fn scenario_a_laptop_addition() {
    let csv = "\
unique_id,description,cost,in_service_date\n\
u1,Dell Laptop,1500,3/15/2024\n";
    let (session, _) = process(csv).await;
    let record = session.record("u1").unwrap();

    assert_eq!(
        record.transaction_type,
        Some(TransactionType::CurrentYearAddition)
    );
    let category = record.category.unwrap();
    assert_eq!(category.class, AssetClass::ComputerEquipment);
    assert_eq!(category.life_years, 5.0);
    assert!(record.confidence > 0.8);
    // Under the 2,500 de minimis threshold: fully expensed.
    assert_eq!(record.election, Election::ExpenseSafeHarbor);
}

#[tokio::test]
async fn scenario_b_building_forced_to_regular_straight_line() {
    let csv = "\
unique_id,description,cost,in_service_date\n\
u1,Office building purchase,500000,2/1/2024\n";
    let (session, _) = process(csv).await;
    let record = session.record("u1").unwrap();

    let category = record.category.unwrap();
    assert_eq!(category.life_years, 39.0);
    assert_eq!(category.method, DepreciationMethod::StraightLine);
    assert_eq!(record.election, Election::RegularSchedule);
    assert_eq!(record.section179_taken, 0.0);
    assert_eq!(record.bonus_taken, 0.0);
    assert_eq!(record.convention, Some(Convention::MidMonth));
}

#[tokio::test]
async fn scenario_c_disposal_loss_has_no_recapture() {
    let csv = "\
unique_id,description,cost,in_service_date,disposal_date,proceeds,accumulated_depreciation\n\
u1,Delivery truck,10000,6/1/2020,8/20/2024,3000,6000\n";
    let (session, _) = process(csv).await;
    let record = session.record("u1").unwrap();
    assert_eq!(
        record.transaction_type,
        Some(TransactionType::CurrentYearDisposal)
    );

    let outcome = &session.disposal_outcomes[0];
    assert_eq!(outcome.unique_id, "u1");
    assert_eq!(outcome.net_book_value, 4000.0);
    assert_eq!(outcome.gain_loss, -1000.0);
    assert_eq!(outcome.recapture, 0.0);

    // Resolving directly gives the same answer.
    let direct = DisposalResolver::for_config(&config()).unwrap().resolve(record);
    assert_eq!(&direct, outcome);
}

#[tokio::test]
async fn scenario_d_q4_heavy_year_goes_mid_quarter() {
    // Q4 additions are 45% of the year's addition cost.
    let csv = "\
unique_id,description,cost,in_service_date\n\
u1,Milling machine,55000,3/1/2024\n\
u2,Packaging machine,45000,11/5/2024\n";
    let (session, _) = process(csv).await;
    assert_eq!(
        session.record("u1").unwrap().convention,
        Some(Convention::MidQuarter)
    );
    assert_eq!(
        session.record("u2").unwrap().convention,
        Some(Convention::MidQuarter)
    );
}

#[tokio::test]
async fn scenario_e_duplicate_ids_block_export_despite_approval() {
    let csv = "\
unique_id,description,cost,in_service_date\n\
dup,Desk,900,3/1/2024\n\
dup,Chair,300,4/1/2024\n";
    let (session, report) = process(csv).await;
    assert!(report
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::DuplicateUniqueId && i.severity == Severity::Critical));
    assert!(!report.export_ready);

    // Approval is no override for Critical issues.
    session.ledger.approve("dup", Some("reviewer"));
    let engine = engine();
    let mut session = session;
    let (report, _) = engine.reprocess(&mut session).await.unwrap();
    assert!(!report.export_ready);
}

#[tokio::test]
async fn safe_harbor_boundary_is_exact() {
    let csv = "\
unique_id,description,cost,in_service_date\n\
u1,Label printer,2500.00,3/1/2024\n\
u2,Label printer,2500.01,3/1/2024\n";
    let (session, _) = process(csv).await;
    assert_eq!(
        session.record("u1").unwrap().election,
        Election::ExpenseSafeHarbor
    );
    assert_ne!(
        session.record("u2").unwrap().election,
        Election::ExpenseSafeHarbor
    );
}

#[tokio::test]
async fn section179_total_never_exceeds_the_effective_cap() {
    let mut csv = String::from("unique_id,description,cost,in_service_date\n");
    for i in 0..20 {
        csv.push_str(&format!("u{i:02},CNC machine,100000,3/1/2024\n"));
    }
    let (session, _) = process(&csv).await;
    let config = config();
    let total_179: f64 = session.records.iter().map(|r| r.section179_taken).sum();
    assert!(total_179 <= config.section179_cap + 1e-6);
    for record in &session.records {
        assert!(record.section179_taken + record.bonus_taken <= record.cost + 1e-6);
    }
}

#[tokio::test]
async fn reclassification_is_deterministic() {
    let csv = "\
unique_id,description,cost,in_service_date\n\
u1,Dell Laptop,1500,3/15/2024\n\
u2,Forklift,38000,11/2/2024\n\
u3,Office building purchase,500000,2/1/2024\n\
u4,zq-unknowable gadget,7000,5/1/2024\n";
    let (first, _) = process(csv).await;
    let (second, _) = process(csv).await;
    for (a, b) in first.records.iter().zip(second.records.iter()) {
        assert_eq!(a.transaction_type, b.transaction_type);
        assert_eq!(a.category, b.category);
        assert_eq!(a.convention, b.convention);
        assert_eq!(a.election, b.election);
        assert_eq!(a.section179_taken, b.section179_taken);
        assert_eq!(a.bonus_taken, b.bonus_taken);
    }
}

#[tokio::test]
async fn low_confidence_gates_export_until_approved() {
    // Unclassifiable description with the AI collaborator unavailable:
    // degrades to low confidence and waits on human review.
    let csv = "\
unique_id,description,cost,in_service_date\n\
u1,zq-unknowable gadget,7000,5/1/2024\n";
    let engine = engine();
    let (mut session, report, printed) = engine.from_string(csv, config()).await.unwrap();
    assert!(!report.export_ready);
    assert_eq!(report.pending_review, vec!["u1".to_string()]);
    assert!(printed.contains("EXPORT BLOCKED"));

    session.ledger.approve("u1", Some("reviewer"));
    let (report, printed) = engine.reprocess(&mut session).await.unwrap();
    assert!(report.export_ready);
    assert!(printed.contains("EXPORT READY"));
}

#[tokio::test]
async fn human_category_edit_feeds_session_memory() {
    let csv = "\
unique_id,description,cost,in_service_date\n\
u1,zq-unknowable gadget,7000,5/1/2024\n\
u2,zq-unknowable gadget,7000,6/1/2024\n";
    let engine = engine();
    let (mut session, _, _) = engine.from_string(csv, config()).await.unwrap();

    let category = fixedasset_macrs::entities::DepreciationCategory::standard(
        AssetClass::MachineryEquipment,
    );
    assert!(session.apply_human_category("u1", category, Some("reviewer")));

    // Reprocessing recalls the override for both records sharing the
    // description, at full confidence.
    let (report, _) = engine.reprocess(&mut session).await.unwrap();
    let u2 = session.record("u2").unwrap();
    assert_eq!(u2.category.unwrap().class, AssetClass::MachineryEquipment);
    assert_eq!(u2.confidence, 1.0);
    assert!(report.export_ready);
}

#[tokio::test]
async fn reconfigure_swaps_the_batch_atomically() {
    let csv = "\
unique_id,description,cost,in_service_date\n\
u1,Forklift,38000,11/2/2023\n";
    let engine = engine();
    let (session, _, _) = engine.from_string(csv, config()).await.unwrap();
    assert_eq!(
        session.record("u1").unwrap().transaction_type,
        Some(TransactionType::ExistingAsset)
    );
    session.ledger.approve("u1", Some("reviewer"));

    let config_2023 = config_for_year(2023, 1, false, StrategyMode::Aggressive).unwrap();
    let (session, _, _) = engine.reconfigure(session, config_2023).await.unwrap();
    // Same records, reclassified under the new year; approvals invalidated.
    assert_eq!(
        session.record("u1").unwrap().transaction_type,
        Some(TransactionType::CurrentYearAddition)
    );
    assert!(!session.ledger.is_approved("u1"));
}

#[tokio::test]
async fn unknown_tax_year_rejects_the_whole_batch() {
    assert!(matches!(
        config_for_year(1999, 1, false, StrategyMode::Aggressive),
        Err(EngineError::UnsupportedTaxYear { year: 1999 })
    ));
}

#[tokio::test]
async fn low_confidence_disposal_blocks_export_until_approved() {
    let csv = "\
unique_id,description,cost,in_service_date,disposal_date,proceeds,accumulated_depreciation\n\
u1,zq-unknowable gadget,10000,6/1/2020,8/20/2024,3000,6000\n";
    let engine = engine();
    let (mut session, report, _) = engine.from_string(csv, config()).await.unwrap();
    assert_eq!(
        session.record("u1").unwrap().transaction_type,
        Some(TransactionType::CurrentYearDisposal)
    );
    // A misclassified disposal is as actionable as a misclassified
    // addition: the gate fails closed.
    assert!(!report.export_ready);
    assert_eq!(report.pending_review, vec!["u1".to_string()]);

    session.ledger.approve("u1", Some("reviewer"));
    let (report, _) = engine.reprocess(&mut session).await.unwrap();
    assert!(report.export_ready);
}

#[tokio::test]
async fn dated_transfer_carries_no_disposal_warnings() {
    let csv = "\
unique_id,description,cost,in_service_date,transfer_date,accumulated_depreciation\n\
u1,Delivery truck,10000,6/1/2020,8/20/2024,6000\n";
    let (session, report) = process(csv).await;
    assert_eq!(
        session.record("u1").unwrap().transaction_type,
        Some(TransactionType::CurrentYearTransfer)
    );
    assert!(!report.issues.iter().any(|i| {
        i.kind == IssueKind::DisposalMissingDate || i.kind == IssueKind::DisposalMissingProceeds
    }));

    // Carryover basis: the outcome realizes nothing.
    let outcome = &session.disposal_outcomes[0];
    assert_eq!(outcome.gain_loss, 0.0);
    assert_eq!(outcome.recapture, 0.0);
    assert_eq!(outcome.net_book_value, 4000.0);
}

#[tokio::test]
async fn flagged_disposal_without_date_is_surfaced_not_dropped() {
    let csv = "\
unique_id,description,cost,in_service_date,disposed\n\
u1,Old copier,4000,6/1/2019,yes\n";
    let (session, report) = process(csv).await;
    assert_eq!(
        session.record("u1").unwrap().transaction_type,
        Some(TransactionType::DisposalNeedsDate)
    );
    assert!(report
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::DisposalMissingDate));
    assert!(!report.export_ready);
}
