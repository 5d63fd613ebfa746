//! Benchmarks for full evaluation passes

use cellcalc::prelude::*;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// A sheet of `rows` inputs in column A with running totals in column B
fn running_totals(rows: u32) -> Sheet {
    let mut sheet = Sheet::new();
    for row in 0..rows {
        sheet.set_cell(CellAddress::new(row, 0), format!("{}.5", row));
        let formula = if row == 0 {
            "A1*1".to_string()
        } else {
            format!("B{} + A{} * 2 - (A{} / 4)", row, row + 1, row + 1)
        };
        sheet.set_cell(CellAddress::new(row, 1), formula);
    }
    sheet
}

fn bench_calculate(c: &mut Criterion) {
    let sheet = running_totals(10_000);

    c.bench_function("calculate_single_threaded", |b| {
        b.iter(|| black_box(&sheet).calculate())
    });

    let options = CalculationOptions {
        mode: RecalcMode::MultiThreaded,
    };
    c.bench_function("calculate_multi_threaded", |b| {
        b.iter(|| black_box(&sheet).calculate_with_options(&options))
    });
}

criterion_group!(benches, bench_calculate);
criterion_main!(benches);
