// Criterion benchmarks for match enrichment

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use styleswipe_matches::core::{enrich_matches, MatchEnricher};
use styleswipe_matches::models::{Match, UserPreferences, UserProfile};
use styleswipe_matches::services::InMemoryStore;

fn create_match(id: usize) -> Match {
    Match {
        id: format!("match-{}", id),
        user_id: format!("client-{:08}", id),
        stylist_id: "stylist-1".to_string(),
        matched_at: Utc::now() - Duration::minutes(id as i64),
    }
}

fn create_profile(id: usize) -> UserProfile {
    UserProfile {
        user_id: format!("client-{:08}", id),
        full_name: if id % 4 == 0 { None } else { Some(format!("Client {}", id)) },
        role: None,
    }
}

fn create_preferences(id: usize) -> UserPreferences {
    UserPreferences {
        user_id: format!("client-{:08}", id),
        gender: Some("female".to_string()),
        clothing_preferences: vec!["dresses".to_string(), "denim".to_string()],
        preferred_occasions: vec!["work".to_string()],
        style_preference: Some("streetwear".to_string()),
        budget_range: Some("$$".to_string()),
        is_completed: id % 2 == 0,
    }
}

fn bench_enrich_join(c: &mut Criterion) {
    let mut group = c.benchmark_group("enrich_join");

    for size in [10, 100, 1000].iter() {
        let matches: Vec<Match> = (0..*size).map(create_match).collect();
        let profiles: Vec<UserProfile> = (0..*size).map(create_profile).collect();
        let preferences: Vec<UserPreferences> = (0..*size).step_by(2).map(create_preferences).collect();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                enrich_matches(
                    black_box(matches.clone()),
                    black_box(&profiles),
                    black_box(&preferences),
                )
            })
        });
    }

    group.finish();
}

fn bench_enrich_pipeline(c: &mut Criterion) {
    let store = InMemoryStore::new();
    let now = Utc::now();
    for id in 0..500 {
        store.insert_match(&format!("client-{:08}", id), "stylist-1", now - Duration::seconds(id as i64));
        store.insert_profile(create_profile(id));
        store.insert_preferences(create_preferences(id));
    }
    let enricher = MatchEnricher::new(Arc::new(store));

    c.bench_function("enrich_for_stylist_500", |b| {
        b.iter(|| tokio_test::block_on(enricher.enrich_for_stylist(black_box("stylist-1"))))
    });
}

criterion_group!(benches, bench_enrich_join, bench_enrich_pipeline);
criterion_main!(benches);
