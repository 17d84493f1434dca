use annals::{
    allocation::{AllocationTable, Pool, TileInputs},
    allocator::ProductionAllocator,
    brain::Brain,
    config::{AllocatorConfig, MarketConfig, RaidConfig, SimulationConfig},
    hierarchy::{audit, make_vassal, release, suzerain_chain},
    market::{LinkId, TradeLink, TradeMarket},
    polity::PolityId,
    product::{Product, ProductMap},
    raid::{RaidParty, RaidResolver, Relationship},
    terrain::{Terrain, TerrainFractions},
    tile::{Culture, Religion, TileId},
    war::win_probability,
    world::{TileSeed, World},
};
use proptest::prelude::*;

fn terrain() -> impl Strategy<Value = TerrainFractions> {
    (0.0f64..0.5, 0.0f64..0.5, 0.0f64..1.0).prop_map(|(a, f, g)| TerrainFractions {
        alluvium: a,
        farmland: f,
        grassland: g.min(1.0 - a - f),
    })
}

fn basket() -> impl Strategy<Value = ProductMap> {
    (0.0f64..2000.0, 0.0f64..2000.0, 0.0f64..200.0).prop_map(|(g, h, c)| {
        ProductMap::from_fn(|p| match p {
            Product::Grain => g,
            Product::Herds => h,
            Product::Construction => c,
        })
    })
}

fn culture() -> impl Strategy<Value = Culture> {
    (0.5f64..2.0, 0.5f64..2.0, 0.0f64..2.0).prop_map(|(intensity, mobility, capture)| Culture {
        raid_intensity: intensity,
        mobility,
        capture,
        productivity: 1.0,
    })
}

fn religion() -> impl Strategy<Value = Religion> {
    (any::<bool>(), any::<bool>()).prop_map(|(peace, war)| Religion {
        peace,
        war,
        productivity: 1.0,
    })
}

fn relationship() -> impl Strategy<Value = Relationship> {
    prop_oneof![
        Just(Relationship::Overlord),
        Just(Relationship::SamePolity),
        Just(Relationship::Foreign),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn raid_outcomes_respect_signs(
        raider_pop in 0u64..100_000,
        victim_pop in 0u64..100_000,
        raider_culture in culture(),
        victim_culture in culture(),
        raider_religion in religion(),
        victim_religion in religion(),
        relation in relationship(),
        multiplier in 0.75f64..=1.25,
    ) {
        let config = RaidConfig::default();
        let resolver = RaidResolver::new(&config);
        let raider = RaidParty {
            tile: TileId(0),
            population: raider_pop,
            culture: raider_culture,
            religion: raider_religion,
        };
        let victim = RaidParty {
            tile: TileId(1),
            population: victim_pop,
            culture: victim_culture,
            religion: victim_religion,
        };
        if let Some(outcome) = resolver.resolve(&raider, &victim, relation, multiplier) {
            prop_assert!(outcome.victim_pop_loss() <= 0);
            prop_assert!(outcome.raider_pop_gain() >= 0);
            prop_assert!(outcome.raider_pop_loss() <= 0);
            prop_assert!(outcome.victim_pop_loss().unsigned_abs() <= victim_pop);
            prop_assert!((0.0..=config.max_loot_fraction).contains(&outcome.loot_fraction()));
        }
    }

    #[test]
    fn trade_never_leaves_negative_goods(a in basket(), b in basket(), river in any::<bool>()) {
        let config = MarketConfig::default();
        let market = TradeMarket::new(&config);
        let link = TradeLink::new(LinkId(0), TileId(0), TileId(1), river, &config);
        let (mut left, mut right) = (a, b);
        let report = market.clear(&link, &mut left, &mut right);
        prop_assert!(!left.has_negative());
        prop_assert!(!right.has_negative());
        prop_assert!(report.iterations <= config.max_iterations);
        prop_assert!(left.total() + right.total() <= a.total() + b.total() + 1e-6);
    }

    #[test]
    fn allocation_pools_never_overflow(terrain in terrain(), workers in 0u64..5000) {
        let config = AllocatorConfig { max_iterations: 60, ..AllocatorConfig::default() };
        let inputs = TileInputs { terrain, area_acres: 10_000.0, workers, modifier: 1.0 };
        let boosts = ProductMap::from_fn(|_| 1.0);
        let result = ProductionAllocator::new(&config)
            .optimize(TileId(0), &inputs, &boosts)
            .unwrap();
        prop_assert!(result.table.pool_total(Pool::Labor) <= 1.0 + 1e-9);
        for t in Terrain::ALL {
            prop_assert!(result.table.pool_total(Pool::Land(t)) <= 1.0 + 1e-9);
            if terrain.get(t) == 0.0 {
                prop_assert_eq!(result.table.members(Pool::Land(t)).count(), 0);
            }
        }
    }

    #[test]
    fn single_steps_are_monotone(terrain in terrain(), workers in 1u64..5000, steps in 1usize..30) {
        let config = AllocatorConfig::default();
        let allocator = ProductionAllocator::new(&config);
        let inputs = TileInputs { terrain, area_acres: 10_000.0, workers, modifier: 1.0 };
        let mut table = AllocationTable::even_split(&terrain, &ProductMap::from_fn(|_| 1.0));
        let mut last = ProductionAllocator::utility(&table, &inputs);
        for _ in 0..steps {
            if allocator.improve_once(TileId(0), &mut table, &inputs).unwrap().is_none() {
                break;
            }
            let now = ProductionAllocator::utility(&table, &inputs);
            prop_assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn win_probability_is_symmetric(ap in 1e-6f64..1e6, dp in 1e-6f64..1e6) {
        let sum = win_probability(ap, dp) + win_probability(dp, ap);
        prop_assert!((sum - 1.0).abs() < 1e-9);
        prop_assert!((0.0..=1.0).contains(&win_probability(ap, dp)));
    }

    #[test]
    fn random_vassalage_stays_a_forest(
        ops in prop::collection::vec((0u32..6, 0u32..6, any::<bool>()), 1..40),
    ) {
        let mut world = World::new("forest", 6, 1, SimulationConfig::default());
        for i in 0..6 {
            let id = world.add_polity(format!("P{i}"), "#123456", Brain::Passive);
            world.add_tile(TileSeed {
                terrain: TerrainFractions::new(0.0, 0.5, 0.0).unwrap(),
                area_acres: 1000.0,
                river: false,
                population: 100,
                construction: 0,
                culture: Culture::default(),
                religion: Religion::default(),
                controller: id,
            }).unwrap();
        }
        for (v, s, bind) in ops {
            if bind {
                let _ = make_vassal(&mut world, PolityId(v), PolityId(s));
            } else {
                release(&mut world, PolityId(v)).unwrap();
            }
            prop_assert!(audit(&world).is_ok());
            for id in world.polity_ids() {
                let chain = suzerain_chain(&world, id).unwrap();
                prop_assert!(!chain.contains(&id));
            }
        }
    }
}
