//! Property-based tests for the aggregation invariants.

use proptest::prelude::*;
use pulse_core::SortKey;
use pulse_data::aggregate::{platform_breakdown, summary_metrics, top_posts, Partition};
use pulse_data::change::percent_change;
use pulse_data::loader::{performance_records, RawTable};
use pulse_data::record::{MetricTotals, PerformanceRecord, TopPost, Week};

const PLATFORMS: [&str; 4] = ["facebook", "x", "tiktok", "instagram"];

fn arb_week() -> impl Strategy<Value = Week> {
    prop_oneof![
        1 => Just(Week::AllTime),
        4 => (0u32..20).prop_map(|offset| {
            let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
            Week::Date(base + chrono::Duration::weeks(offset as i64))
        }),
    ]
}

fn arb_record() -> impl Strategy<Value = PerformanceRecord> {
    (
        arb_week(),
        0usize..PLATFORMS.len(),
        0i64..1_000_000,
        0i64..100_000,
        -10_000i64..10_000,
    )
        .prop_map(|(week, p, views, likes, follower_growth)| PerformanceRecord {
            week,
            platform: PLATFORMS[p].to_string(),
            views,
            likes,
            follower_growth,
        })
}

fn arb_post() -> impl Strategy<Value = TopPost> {
    (prop::option::of(arb_week()), 0i64..1_000_000, 0i64..100_000).prop_map(
        |(week, views, engagement)| TopPost {
            rank: 1,
            week,
            post_type: "Reel".into(),
            link: "https://example.com".into(),
            views,
            engagement,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_breakdown_sums_to_weekly_total(records in prop::collection::vec(arb_record(), 0..60)) {
        let mut sum = MetricTotals::default();
        for platform in platform_breakdown(&records) {
            sum += platform.totals;
        }
        prop_assert_eq!(sum, summary_metrics(&records, Partition::Weekly));
    }

    #[test]
    fn prop_partitions_cover_every_row(records in prop::collection::vec(arb_record(), 0..60)) {
        let mut both = summary_metrics(&records, Partition::AllTime);
        both += summary_metrics(&records, Partition::Weekly);
        let all: i64 = records.iter().map(|r| r.views).sum();
        prop_assert_eq!(both.views, all);
    }

    #[test]
    fn prop_top_posts_bounded_and_sorted(
        posts in prop::collection::vec(arb_post(), 0..40),
        n in 0usize..10,
        by_engagement in any::<bool>(),
    ) {
        let key = if by_engagement { SortKey::Engagement } else { SortKey::Views };
        let top = top_posts(&posts, n, key);
        prop_assert!(top.len() <= n);
        for pair in top.windows(2) {
            prop_assert!(pair[0].metric(key) >= pair[1].metric(key));
        }
    }

    #[test]
    fn prop_percent_change_matches_formula(current in -1_000_000i64..1_000_000, previous in 1i64..1_000_000) {
        let expected = (current - previous) as f64 / previous as f64 * 100.0;
        let actual = percent_change(current, previous).value();
        prop_assert!((actual - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_non_numeric_cells_coerce_to_zero(cell in "[a-zA-Z][a-zA-Z ]{0,10}") {
        let csv = format!("week,platform,views,likes,follower_growth\nalltime,x,{cell},1,2\n");
        let table = RawTable::from_reader(csv.as_bytes(), b',', "prop.csv").unwrap();
        let rows = performance_records(&table).unwrap();
        prop_assert_eq!(rows[0].views, 0);
        prop_assert_eq!(rows[0].likes, 1);
    }
}
