//! Demonstration of polygon clipping and region edits

use env_logger::Env;
use glam::Vec2;
use region_atlas::*;

fn describe(label: &str, polygon: &Polygon) {
    println!("{}: {} contour(s), area {:.3}", label, polygon.contours().len(), polygon.area());
    for contour in polygon.contours() {
        let points: Vec<String> = contour
            .points()
            .iter()
            .map(|p| format!("({:.2}, {:.2})", p.x, p.y))
            .collect();
        println!("  {}", points.join(" "));
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let a = Polygon::from(Contour::rectangle(Vec2::new(0.0, 0.0), Vec2::new(2.0, 2.0)));
    let b = Polygon::from(Contour::rectangle(Vec2::new(1.0, 1.0), Vec2::new(3.0, 3.0)));

    describe("union", &clip(&a, &b, ClipOperation::Union));
    describe("intersection", &clip(&a, &b, ClipOperation::Intersection));
    describe("difference", &clip(&a, &b, ClipOperation::Difference));

    // A self-intersecting input still clips, with a diagnostic
    let bowtie = Polygon::from(Contour::new(vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(2.0, 2.0),
        Vec2::new(2.0, 0.0),
        Vec2::new(0.0, 1.0),
    ]));
    let outcome = clip_with_diagnostics(&bowtie, &a, ClipOperation::Intersection);
    for diagnostic in &outcome.diagnostics {
        println!("diagnostic: {:?}", diagnostic);
    }

    // Region edits: merge two neighbours, then carve a lake out of the result
    let mut map = RegionMap::new();
    let north = map.add_entity("North", EntityKind::Country)?;
    let south = map.add_entity("South", EntityKind::Country)?;
    map.add_region(north, &Contour::rectangle(Vec2::new(0.0, 1.0), Vec2::new(2.0, 2.0)).into())?;
    map.add_region(south, &Contour::rectangle(Vec2::new(0.0, 0.0), Vec2::new(2.0, 1.0)).into())?;
    map.build_neighbours();
    println!("North neighbours: {:?}", map.neighbours(0));

    let merged = map.merge_regions(0, 1)?;
    println!("Merged into {:?}, area {:.3}", merged, map.region(merged[0]).map_or(0.0, |r| r.area()));

    let lake = Polygon::from(Contour::rectangle(Vec2::new(0.5, 0.5), Vec2::new(1.5, 1.5)));
    let remaining = map.subtract_from_region(merged[0], &lake)?;
    for id in remaining {
        if let Some(region) = map.region(id) {
            println!(
                "Region {} of entity {}: area {:.3}, {} hole(s)",
                id,
                region.entity(),
                region.area(),
                region.holes().len()
            );
        }
    }

    Ok(())
}
