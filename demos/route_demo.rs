//! Demonstration of grid and region routing

use env_logger::Env;
use glam::Vec2;
use region_atlas::*;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("debug")).init();

    let config = WorldConfigBuilder::new()
        .grid_size(24, 24)?
        .connectivity(Connectivity::Eight)
        .terrain_seed(42)
        .build()?;
    let mut world = World::generate(config)?;

    let water = world.grid().cells().iter().filter(|c| c.terrain.is_water()).count();
    println!(
        "Generated {} cells ({} water, {} ground)",
        world.grid().cell_count(),
        water,
        world.grid().cell_count() - water
    );

    let start = Vec2::new(-0.45, -0.45);
    let goal = Vec2::new(0.45, 0.45);

    for capability in [
        TerrainCapability::OnlyAir,
        TerrainCapability::OnlyGround,
        TerrainCapability::OnlyWater,
    ] {
        let query = RouteQuery::new(capability);
        match world.find_route(start, goal, &query)? {
            Some(route) => println!("{:?}: {} steps, cost {}", capability, route.steps(), route.cost),
            None => println!("{:?}: no route", capability),
        }
    }

    // Wall off the middle column except for one gap
    let gap = world.config().rows / 2;
    for row in 0..world.config().rows {
        if row != gap {
            if let Some(cell) = world.grid().cell_index(row, world.config().columns / 2) {
                world.set_cost_override(cell, IMPASSABLE)?;
            }
        }
    }
    if let Some(route) = world.find_route(start, goal, &RouteQuery::new(TerrainCapability::OnlyAir))? {
        println!("Through the gap: {} steps, cost {}", route.steps(), route.cost);
        for waypoint in &route.waypoints {
            println!("  ({:.3}, {:.3})", waypoint.x, waypoint.y);
        }
    }
    world.reset_cost_overrides();

    // Three provinces in a row and a route across them
    let map = world.regions_mut();
    let realm = map.add_entity("Realm", EntityKind::Country)?;
    for (i, name) in ["Westmarch", "Midlands", "Eastreach"].iter().enumerate() {
        let province = map.add_entity(*name, EntityKind::Province { country: realm })?;
        let x = -0.45 + i as f32 * 0.3;
        let outline = Contour::rectangle(Vec2::new(x, -0.2), Vec2::new(x + 0.3, 0.2));
        map.add_region(province, &outline.into())?;
    }
    map.build_neighbours();

    let costs = CostMatrix::for_graph(world.regions());
    if let Some(route) =
        world.find_region_route(Vec2::new(-0.4, 0.0), Vec2::new(0.4, 0.0), &RouteQuery::default(), &costs)?
    {
        let names: Vec<&str> = route
            .nodes
            .iter()
            .filter_map(|&id| world.regions().region(id))
            .filter_map(|r| world.regions().entity(r.entity()))
            .map(|e| e.name.as_str())
            .collect();
        println!("Region route: {}", names.join(" -> "));
    }

    Ok(())
}
