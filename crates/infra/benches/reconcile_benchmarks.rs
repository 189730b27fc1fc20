use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use toolcrib_core::{PartId, Quantity};
use toolcrib_infra::{InMemoryRecordStore, Warehouse};
use toolcrib_inventory::{
    DemandForecaster, InboundRecord, IssueStock, MovementDetails, MovementRecord, ReceiveStock,
    reconcile,
};

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
}

fn part(i: usize) -> PartId {
    format!("P{i:05}").parse().unwrap()
}

/// Synthetic ledger: `parts` inbound entries, `issues_per_part` outbound
/// movements each, spread over the last 60 days.
fn ledger(parts: usize, issues_per_part: usize) -> (Vec<MovementRecord>, Vec<MovementRecord>) {
    let mut inbound = Vec::with_capacity(parts);
    let mut outbound = Vec::with_capacity(parts * issues_per_part);

    for i in 0..parts {
        let receive = ReceiveStock {
            part_id: part(i),
            quantity: Quantity::new(1_000).unwrap(),
            details: MovementDetails::named(format!("tool {i}")),
            occurred_on: as_of() - Duration::days(90),
        };
        let entry = InboundRecord::open(&receive).unwrap();

        for j in 0..issues_per_part {
            let issue = IssueStock {
                part_id: part(i),
                quantity: Quantity::new(1 + (j % 5) as u64).unwrap(),
                details: MovementDetails::named(format!("tool {i}")),
                occurred_on: as_of() - Duration::days((j % 60) as i64),
            };
            let (record, _) = entry.issue(&issue).unwrap();
            outbound.push(record);
        }
        inbound.push(entry.movement);
    }

    (inbound, outbound)
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for parts in [100usize, 1_000, 10_000].iter() {
        let (inbound, outbound) = ledger(*parts, 10);
        group.throughput(Throughput::Elements((inbound.len() + outbound.len()) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(parts), parts, |b, _| {
            b.iter(|| {
                let rows = reconcile(black_box(&inbound), black_box(&outbound), &HashMap::new());
                black_box(rows);
            });
        });
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast");
    let forecaster = DemandForecaster::default();

    for parts in [100usize, 1_000, 10_000].iter() {
        let (inbound, outbound) = ledger(*parts, 10);
        let rows = reconcile(&inbound, &outbound, &HashMap::new());
        group.throughput(Throughput::Elements(outbound.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(parts), parts, |b, _| {
            b.iter(|| {
                let refined = forecaster.forecast(rows.clone(), black_box(&outbound), 30, as_of());
                black_box(refined);
            });
        });
    }

    group.finish();
}

/// End-to-end cost of one outbound movement, including the reconcile pass
/// and commit that follow it.
fn bench_record_outbound(c: &mut Criterion) {
    let mut group = c.benchmark_group("record_outbound");
    group.sample_size(50);

    for parts in [10usize, 100, 1_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(parts), parts, |b, &parts| {
            let mut wh = Warehouse::new(InMemoryRecordStore::new());
            for i in 0..parts {
                wh.upsert_inbound(ReceiveStock {
                    part_id: part(i),
                    quantity: Quantity::new(1_000_000_000).unwrap(),
                    details: MovementDetails::named(format!("tool {i}")),
                    occurred_on: as_of(),
                })
                .unwrap();
            }

            b.iter(|| {
                let record = wh
                    .record_outbound(IssueStock {
                        part_id: part(0),
                        quantity: Quantity::new(1).unwrap(),
                        details: MovementDetails::named("tool 0"),
                        occurred_on: as_of(),
                    })
                    .unwrap();
                black_box(record);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile, bench_forecast, bench_record_outbound);
criterion_main!(benches);
