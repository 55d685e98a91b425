use std::collections::{HashMap, HashSet};

use crux_ranks::ShardPath;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_domains(count: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut domains = HashSet::with_capacity(count);
    while domains.len() < count {
        let label: String = (&mut rng)
            .sample_iter(Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();
        domains.insert(format!("{}.com", label.to_lowercase()));
    }
    domains.into_iter().collect()
}

#[test]
fn buckets_are_bounded_to_the_fixed_fanout() {
    let domains = random_domains(10_000, 7);

    let mut level1 = HashSet::new();
    let mut pairs = HashSet::new();
    for domain in &domains {
        let shard = ShardPath::resolve(domain);
        level1.insert(shard.level1().to_string());
        pairs.insert((shard.level1().to_string(), shard.level2().to_string()));
    }

    assert!(level1.len() <= 256);
    assert!(pairs.len() <= 256 * 256);
}

#[test]
fn uniform_input_spreads_evenly_across_first_level() {
    let domains = random_domains(10_000, 11);

    let mut counts: HashMap<String, usize> = HashMap::new();
    for domain in &domains {
        let shard = ShardPath::resolve(domain);
        *counts.entry(shard.level1().to_string()).or_default() += 1;
    }

    // ~39 expected per bucket; loose statistical bounds, not exact.
    assert!(counts.len() >= 250, "only {} buckets hit", counts.len());
    let max = counts.values().max().copied().unwrap_or(0);
    assert!(max < 100, "hottest bucket got {max} of 10000 domains");
}

#[test]
fn distinct_domains_get_distinct_shard_paths() {
    let domains = random_domains(10_000, 13);
    let mut stems = HashSet::new();
    for domain in &domains {
        let shard = ShardPath::resolve(domain);
        stems.insert(format!(
            "{}/{}/{}",
            shard.level1(),
            shard.level2(),
            shard.stem()
        ));
    }
    assert_eq!(stems.len(), domains.len());
}
