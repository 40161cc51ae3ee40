#![allow(unused)]
extern crate toolres;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use std::hint::black_box;
use toolres::prelude::*;

/// Build a file with `windows` windows of 20 labelled gadgets each, plus a menu.
fn build_file(windows: usize) -> Vec<u8> {
    let mut editor = ResEditor::new();

    let mut menu = ResMenu::new("Main");
    for id in 0..20 {
        menu.add(&ResMenuItem::with_text(id, &format!("Item {id}")).unwrap())
            .unwrap();
    }
    editor.add(menu).unwrap();

    for index in 0..windows {
        let mut window = ResWindow::new(&format!("Win{index}"));
        for id in 0..20 {
            let mut label = Label::new();
            label.set_component_id(id).unwrap();
            label.set_label(Some(&format!("Label {id}"))).unwrap();
            window.add_gadget(&label).unwrap();
        }
        editor.add(window).unwrap();
    }

    editor.save_to_vec().unwrap()
}

/// Benchmark loading the same file zero-copy and as owned, editable copies
fn bench_load(c: &mut Criterion) {
    let data = build_file(50);
    let config = ResourceConfig::default();

    let mut group = c.benchmark_group("load");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("resfile", |b| {
        b.iter_batched(
            || data.clone(),
            |data| black_box(ResFile::from_mem(data, &config).unwrap()),
            BatchSize::SmallInput,
        );
    });
    group.bench_function("editor", |b| {
        b.iter(|| black_box(ResEditor::load_from_mem(black_box(&data), &config).unwrap()));
    });
    group.finish();
}

/// Benchmark structural edits in the middle of a gadget list
fn bench_gadgets(c: &mut Criterion) {
    let data = build_file(1);
    let editor = ResEditor::load_from_mem(&data, &ResourceConfig::default()).unwrap();
    let window = ResWindow::try_from(editor.object("Win0").unwrap().clone()).unwrap();

    let mut extra = Label::new();
    extra.set_component_id(100).unwrap();
    extra.set_label(Some("Inserted")).unwrap();

    c.bench_function("insert_erase_gadget", |b| {
        b.iter_batched(
            || window.clone(),
            |mut window| {
                window.insert_gadget(10, &extra).unwrap();
                window.erase_gadget(5).unwrap();
                black_box(window)
            },
            BatchSize::SmallInput,
        );
    });

    c.bench_function("grow_title", |b| {
        b.iter_batched(
            || window.clone(),
            |mut window| {
                window
                    .set_title_text(Some("A considerably longer window title"))
                    .unwrap();
                black_box(window)
            },
            BatchSize::SmallInput,
        );
    });
}

/// Benchmark saving an edited file
fn bench_save(c: &mut Criterion) {
    let data = build_file(50);
    let editor = ResEditor::load_from_mem(&data, &ResourceConfig::default()).unwrap();

    let mut group = c.benchmark_group("save");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("save_to_vec", |b| {
        b.iter(|| black_box(editor.save_to_vec().unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_load, bench_gadgets, bench_save);
criterion_main!(benches);
