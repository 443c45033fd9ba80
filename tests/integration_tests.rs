use geocollection::{
    CollectionBuilder, GeoCollection, LEVEL_COUNT, MAX_CELL_LEVEL, S2Geometry,
    SearchCoveringParameters, SphericalGeometry, earth_distance_meters, point_from_lat_lng,
};

// downtown Chicago
const CHICAGO: (f64, f64) = (41.87963549397698, -87.63028184499035);
// midtown Manhattan
const MANHATTAN: (f64, f64) = (40.75306726395187, -73.98119781456353);

fn two_city_collection() -> GeoCollection<u32, &'static str> {
    let collection = GeoCollection::new();
    collection.set(0, "1", CHICAGO.0, CHICAGO.1);
    collection.set(1, "2", MANHATTAN.0, MANHATTAN.1);
    collection
}

fn assert_same_items(mut actual: Vec<&'static str>, mut expected: Vec<&'static str>) {
    actual.sort_unstable();
    expected.sort_unstable();
    assert_eq!(actual, expected);
}

#[test]
fn test_set_indexes_item_at_every_level() {
    let collection: GeoCollection<u32, &str> = GeoCollection::new();
    collection.set(0, "0", CHICAGO.0, CHICAGO.1);

    let geometry = S2Geometry::new();
    let leaf = geometry.leaf_cell_of(CHICAGO.0, CHICAGO.1);

    let stats = collection.stats();
    assert_eq!(stats.item_count, 1);
    assert_eq!(stats.occupied_cells.len(), LEVEL_COUNT);
    assert_eq!(stats.cell_entries, LEVEL_COUNT);

    // every level can be searched down to the item's own cell
    for level in 0..=MAX_CELL_LEVEL {
        let params = SearchCoveringParameters::at_level(level, 8);
        let (found, covering) = collection.items_within_distance(CHICAGO.0, CHICAGO.1, 0.0, &params);
        assert_eq!(found, vec!["0"], "level {}", level);

        let ancestor = geometry.ancestor_at(leaf, level);
        assert!(covering.iter().any(|cell| cell.cell == ancestor));
    }
}

#[test]
fn test_replace_coordinates_leaves_no_residue() {
    let collection: GeoCollection<u32, &str> = GeoCollection::new();
    collection.set(0, "0", CHICAGO.0, CHICAGO.1);
    collection.set(0, "0", MANHATTAN.0, MANHATTAN.1);

    assert_eq!(collection.len(), 1);
    assert_eq!(collection.stats().cell_entries, LEVEL_COUNT);

    let params = SearchCoveringParameters::at_level(5, 5);
    let (found, _) = collection.items_within_distance(CHICAGO.0, CHICAGO.1, 1000.0, &params);
    assert!(found.is_empty());

    let (found, _) = collection.items_within_distance(MANHATTAN.0, MANHATTAN.1, 1000.0, &params);
    assert_eq!(found, vec!["0"]);
}

#[test]
fn test_replace_contents_only() {
    let collection: GeoCollection<u32, &str> = GeoCollection::new();
    collection.set(0, "0", CHICAGO.0, CHICAGO.1);
    let stats_before = collection.stats();

    collection.set(0, "1", CHICAGO.0, CHICAGO.1);

    assert_eq!(collection.item_by_key(&0), Some("1"));
    assert_eq!(collection.stats(), stats_before);
}

#[test]
fn test_delete_then_lookup() {
    let collection: GeoCollection<u32, &str> = GeoCollection::new();
    collection.set(5, "x", CHICAGO.0, CHICAGO.1);
    collection.delete(&5);

    assert_eq!(collection.item_by_key(&5), None);
    assert_eq!(collection.location_of(&5), None);

    let stats = collection.stats();
    assert_eq!(stats.cell_entries, 0);
    assert!(stats.occupied_cells.iter().all(|&count| count == 0));
}

#[test]
fn test_delete_missing_key_keeps_others() {
    let collection: GeoCollection<u32, &str> = GeoCollection::new();
    collection.set(0, "0", CHICAGO.0, CHICAGO.1);
    let stats_before = collection.stats();

    assert!(collection.delete(&1).is_none());

    assert_eq!(collection.stats(), stats_before);
    assert_eq!(collection.item_by_key(&0), Some("0"));
}

#[test]
fn test_search_returns_relevant_results() {
    let collection = two_city_collection();
    let params = SearchCoveringParameters::at_level(5, 5);

    let (found, covering) =
        collection.items_within_distance(CHICAGO.0 - 0.001, CHICAGO.1 - 0.001, 1000.0, &params);
    assert_same_items(found, vec!["1"]);
    assert!(!covering.is_empty());
}

#[test]
fn test_search_with_fast_covering() {
    let collection = two_city_collection();
    let params = SearchCoveringParameters::at_level(5, 5).with_fast_covering(true);

    let (found, _) =
        collection.items_within_distance(CHICAGO.0 - 0.001, CHICAGO.1 - 0.001, 1000.0, &params);
    assert_same_items(found, vec!["1"]);
}

#[test]
fn test_search_returns_multiple_results() {
    let collection = two_city_collection();
    let params = SearchCoveringParameters::at_level(5, 5);

    let (found, _) = collection.items_within_distance(CHICAGO.0, CHICAGO.1, 4_000_000.0, &params);
    assert_same_items(found, vec!["1", "2"]);
}

#[test]
fn test_search_returns_nothing_far_away() {
    let collection = two_city_collection();
    let params = SearchCoveringParameters::at_level(5, 5);

    let (found, _) = collection.items_within_distance(0.0, 0.0, 1.0, &params);
    assert!(found.is_empty());
}

#[test]
fn test_search_never_misses_items_in_radius() {
    let collection: GeoCollection<usize, usize> = GeoCollection::new();
    let mut points = Vec::new();
    for i in 0..400 {
        let lat = CHICAGO.0 + ((i % 20) as f64 - 10.0) * 0.01;
        let lon = CHICAGO.1 + ((i / 20) as f64 - 10.0) * 0.01;
        collection.set(i, i, lat, lon);
        points.push(point_from_lat_lng(lat, lon));
    }

    let center = point_from_lat_lng(CHICAGO.0, CHICAGO.1);
    let parameter_sets = [
        SearchCoveringParameters::default(),
        SearchCoveringParameters::default().with_fast_covering(true),
        SearchCoveringParameters::default().with_levels(8, 14).with_max_cells(4),
        SearchCoveringParameters::default().with_levels(6, 20).with_level_mod(2),
    ];

    for radius in [500.0, 2_500.0, 7_000.0] {
        for params in &parameter_sets {
            let (found, _) = collection.items_within_distance(CHICAGO.0, CHICAGO.1, radius, params);

            for (i, point) in points.iter().enumerate() {
                if earth_distance_meters(&center, point) <= radius {
                    assert!(
                        found.contains(&i),
                        "item {} within {}m missing with {:?}",
                        i,
                        radius,
                        params
                    );
                }
            }

            let mut unique = found.clone();
            unique.sort_unstable();
            unique.dedup();
            assert_eq!(unique.len(), found.len(), "duplicate results");
        }
    }
}

#[test]
fn test_covering_geometry_is_returned() {
    let collection = two_city_collection();
    let params = SearchCoveringParameters::at_level(8, 6);

    let (_, covering) = collection.items_within_distance(CHICAGO.0, CHICAGO.1, 5_000.0, &params);
    assert!(!covering.is_empty());
    for boundary in covering.boundaries() {
        assert_eq!(boundary.len(), 5);
        assert_eq!(boundary.first(), boundary.last());
    }

    let geojson = covering.to_geojson();
    assert_eq!(geojson.features.len(), covering.len());
}

#[test]
fn test_item_by_key() {
    let collection: GeoCollection<u32, &str> = GeoCollection::new();
    collection.set(1, "1", 0.0, 0.0);

    assert_eq!(collection.item_by_key(&1), Some("1"));
    assert_eq!(collection.item_by_key(&2), None);
}

#[test]
fn test_get_items_pagination() {
    let collection = two_city_collection();

    assert_eq!(collection.get_items(10, 0), vec!["1", "2"]);
    assert_eq!(collection.get_items(10, 1), vec!["2"]);
    assert!(collection.get_items(10, 2).is_empty());
    assert_eq!(collection.get_items(1, 0), vec!["1"]);
    assert_eq!(collection.get_items(1, 1), vec!["2"]);
}

#[test]
fn test_get_items_pages_cover_everything_once() {
    let collection: GeoCollection<u32, u32> = GeoCollection::new();
    for i in 0..57 {
        collection.set(i, i, f64::from(i) * 0.5, f64::from(i) * -0.5);
    }

    let page_size = 10;
    let mut seen = Vec::new();
    let mut start = 0;
    loop {
        let page = collection.get_items(page_size, start);
        assert!(page.len() <= page_size);
        if page.is_empty() {
            break;
        }
        seen.extend(page);
        start += page_size;
    }

    assert_eq!(seen, (0..57).collect::<Vec<_>>());
    assert_eq!(collection.get_items(page_size, 0), collection.get_items(page_size, 0));
}

#[test]
fn test_builder_default_covering() {
    let collection: GeoCollection<u32, &str> = CollectionBuilder::new()
        .default_covering(SearchCoveringParameters::at_level(5, 5))
        .build()
        .unwrap();
    collection.set(0, "1", CHICAGO.0, CHICAGO.1);
    collection.set(1, "2", MANHATTAN.0, MANHATTAN.1);

    let (found, covering) = collection.items_within(CHICAGO.0, CHICAGO.1, 1000.0);
    assert_eq!(found, vec!["1"]);
    assert!(covering.iter().all(|cell| cell.level == 5));
}
