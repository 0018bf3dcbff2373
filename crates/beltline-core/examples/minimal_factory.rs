//! Minimal factory example: a source feeding a sink through an inserter
//! and a short belt run.
//!
//! Builds a straight line on a 1x6 grid, runs 200 ticks, and prints the
//! state every 20 ticks.
//!
//! Run with: `cargo run -p beltline-core --example minimal_factory`

use beltline_core::belt::Belt;
use beltline_core::building::BuildingKind;
use beltline_core::catalog::Catalog;
use beltline_core::endpoint::{Sink, Source};
use beltline_core::engine::Engine;
use beltline_core::fixed::{Fixed64, fixed64_to_f64};
use beltline_core::grid::{Direction, GridPosition};
use beltline_core::id::ItemId;
use beltline_core::inserter::Inserter;

fn main() {
    let catalog = Catalog::empty();
    let mut engine = Engine::new(1, 6);

    // --- Build the line, bottom to top ---
    //
    //   (0,0) Source      item 0, one spawn per second
    //   (0,1) Inserter    picks from the source, drops on the belt
    //   (0,2) Belt        carries north
    //   (0,3) Belt
    //   (0,4) Inserter    picks from the belt, drops in the sink
    //   (0,5) Sink

    let north = Direction::North;
    let mut place = |kind: BuildingKind, y: i32| {
        engine
            .grid
            .place(kind, GridPosition::new(0, y), north)
            .expect("empty grid cell")
    };

    place(
        BuildingKind::Source(Source::new(ItemId(0), Fixed64::ONE)),
        0,
    );
    place(BuildingKind::Inserter(Inserter::new(2)), 1);
    let belt_a = place(BuildingKind::Belt(Belt::new(Fixed64::ONE)), 2);
    let belt_b = place(BuildingKind::Belt(Belt::new(Fixed64::ONE)), 3);
    place(BuildingKind::Inserter(Inserter::new(2)), 4);
    let sink = place(BuildingKind::Sink(Sink::new()), 5);

    // --- Run ---

    println!("Running 200 ticks of minimal factory...\n");

    for tick in 1..=200u32 {
        engine.step(&catalog);
        if tick % 20 != 0 {
            continue;
        }

        println!("=== Tick {tick} ===");
        for (label, id) in [("belt a", belt_a), ("belt b", belt_b)] {
            let belt = engine
                .grid
                .get(id)
                .and_then(|b| b.as_belt())
                .expect("belt still placed");
            let positions: Vec<String> = belt
                .items()
                .iter()
                .map(|i| format!("{:?}@{:.2}", i.item, fixed64_to_f64(i.progress)))
                .collect();
            println!("  {label}: [{}]", positions.join(", "));
        }
        let sink = engine
            .grid
            .get(sink)
            .and_then(|b| b.as_sink())
            .expect("sink still placed");
        println!("  sink: {} items received\n", sink.total_received());
    }
}
