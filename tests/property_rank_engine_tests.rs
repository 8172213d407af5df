use bump_chart::core::{
    Observation, RankDirection, TieMethod, TimeKey, rank_observations, rank_period,
};
use proptest::prelude::*;

fn direction_strategy() -> impl Strategy<Value = RankDirection> {
    prop_oneof![Just(RankDirection::Ascending), Just(RankDirection::Descending)]
}

fn method_strategy() -> impl Strategy<Value = TieMethod> {
    prop::sample::select(TieMethod::ALL.to_vec())
}

/// Small value range so ties and absent values show up often.
fn values_strategy() -> impl Strategy<Value = Vec<Option<f64>>> {
    prop::collection::vec(
        prop::option::weighted(0.8, (-5i32..5).prop_map(f64::from)),
        1..30,
    )
}

fn strictly_better(a: f64, b: f64, direction: RankDirection) -> bool {
    match direction {
        RankDirection::Ascending => a < b,
        RankDirection::Descending => a > b,
    }
}

proptest! {
    #[test]
    fn strictly_better_value_gets_strictly_smaller_rank(
        values in values_strategy(),
        direction in direction_strategy(),
        method in method_strategy()
    ) {
        let ranks = rank_period(&values, direction, method);
        prop_assert_eq!(ranks.len(), values.len());

        for (i, a) in values.iter().enumerate() {
            for (j, b) in values.iter().enumerate() {
                if let (Some(a), Some(b)) = (a, b) {
                    if strictly_better(*a, *b, direction) {
                        prop_assert!(ranks[i] < ranks[j], "{} vs {}", ranks[i], ranks[j]);
                    }
                }
            }
        }
    }

    #[test]
    fn absent_values_rank_after_every_present_value(
        values in values_strategy(),
        direction in direction_strategy(),
        method in method_strategy()
    ) {
        let ranks = rank_period(&values, direction, method);
        let worst_present = values
            .iter()
            .zip(&ranks)
            .filter(|(value, _)| value.is_some())
            .map(|(_, rank)| *rank)
            .fold(f64::NEG_INFINITY, f64::max);

        for (value, rank) in values.iter().zip(&ranks) {
            if value.is_none() {
                prop_assert!(*rank > worst_present);
            }
        }
    }

    #[test]
    fn ranks_stay_within_one_and_row_count(
        values in values_strategy(),
        direction in direction_strategy(),
        method in method_strategy()
    ) {
        let ranks = rank_period(&values, direction, method);
        let n = values.len() as f64;
        prop_assert!(ranks.iter().all(|rank| (1.0..=n).contains(rank)));
    }

    #[test]
    fn tie_methods_agree_on_distinct_values(
        order in Just((0..20).collect::<Vec<i32>>()).prop_shuffle(),
        len in 1usize..20,
        direction in direction_strategy()
    ) {
        let values: Vec<Option<f64>> =
            order.iter().take(len).map(|value| Some(f64::from(*value))).collect();
        let reference = rank_period(&values, direction, TieMethod::First);

        for method in TieMethod::ALL {
            prop_assert_eq!(&rank_period(&values, direction, method), &reference);
        }
    }

    #[test]
    fn dense_ranks_are_contiguous(
        values in values_strategy(),
        direction in direction_strategy()
    ) {
        let ranks = rank_period(&values, direction, TieMethod::Dense);
        let mut distinct: Vec<u32> = ranks.iter().map(|rank| *rank as u32).collect();
        distinct.sort_unstable();
        distinct.dedup();

        let expected: Vec<u32> = (1..=distinct.len() as u32).collect();
        prop_assert_eq!(distinct, expected);
    }

    #[test]
    fn average_is_midpoint_of_min_and_max(
        values in values_strategy(),
        direction in direction_strategy()
    ) {
        let average = rank_period(&values, direction, TieMethod::Average);
        let min = rank_period(&values, direction, TieMethod::Min);
        let max = rank_period(&values, direction, TieMethod::Max);

        for index in 0..values.len() {
            prop_assert!((average[index] - 0.5 * (min[index] + max[index])).abs() <= 1e-12);
        }
    }

    #[test]
    fn first_ranks_form_a_permutation(
        values in values_strategy(),
        direction in direction_strategy()
    ) {
        let mut ranks: Vec<u32> = rank_period(&values, direction, TieMethod::First)
            .into_iter()
            .map(|rank| rank as u32)
            .collect();
        ranks.sort_unstable();
        let expected: Vec<u32> = (1..=values.len() as u32).collect();
        prop_assert_eq!(ranks, expected);
    }

    #[test]
    fn periods_rank_independently_and_keep_row_order(
        first in values_strategy(),
        second in values_strategy(),
        direction in direction_strategy(),
        method in method_strategy()
    ) {
        prop_assume!(first.iter().chain(&second).any(Option::is_some));

        // Interleave the two periods so grouping cannot rely on adjacency.
        let mut observations = Vec::new();
        let longest = first.len().max(second.len());
        for index in 0..longest {
            if let Some(value) = first.get(index) {
                observations.push(Observation::new(1, format!("e{index}"), *value));
            }
            if let Some(value) = second.get(index) {
                observations.push(Observation::new(2, format!("e{index}"), *value));
            }
        }

        let ranked = rank_observations(&observations, direction, method).expect("rank");
        prop_assert_eq!(ranked.len(), observations.len());

        let expected_first = rank_period(&first, direction, method);
        let expected_second = rank_period(&second, direction, method);
        let (mut i, mut j) = (0, 0);
        for (observation, row) in observations.iter().zip(&ranked) {
            prop_assert_eq!(&row.time, &observation.time);
            prop_assert_eq!(&row.entity, &observation.entity);
            let expected = if observation.time == TimeKey::Int(1) {
                i += 1;
                expected_first[i - 1]
            } else {
                j += 1;
                expected_second[j - 1]
            };
            prop_assert_eq!(row.rank, Some(expected));
        }
    }
}
